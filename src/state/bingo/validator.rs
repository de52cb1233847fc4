use crate::state::bingo::card::{BingoCard, NUMBERS_PER_CARD, NUMBERS_PER_ROW, ROWS};

/// A card cell whose number has been drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMatch {
    /// Row index (0–2).
    pub row: usize,
    /// Column index (0–8).
    pub col: usize,
    /// Number printed in the cell.
    pub number: u8,
}

/// Match status of a card against the drawn balls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardValidation {
    /// Drawn cells in row-major order.
    pub matches: Vec<CellMatch>,
    /// Matched cells per row.
    pub row_matches: [usize; ROWS],
    /// Rows whose five numbers have all been drawn.
    pub lines: Vec<usize>,
    /// All fifteen numbers drawn.
    pub has_bingo: bool,
}

impl CardValidation {
    /// Whether every row in `claimed` is a completed line. Empty claims never verify.
    pub fn confirms_lines(&self, claimed: &[usize]) -> bool {
        !claimed.is_empty() && claimed.iter().all(|row| self.lines.contains(row))
    }
}

/// Compute matches, lines, and bingo for `card` given the drawn sequence.
pub fn validate_card(card: &BingoCard, drawn: &[u8]) -> CardValidation {
    let mut validation = CardValidation::default();

    for (row, col, number) in card.cells() {
        if drawn.contains(&number) {
            validation.matches.push(CellMatch { row, col, number });
            validation.row_matches[row] += 1;
        }
    }

    validation.lines = (0..ROWS)
        .filter(|&row| validation.row_matches[row] == NUMBERS_PER_ROW)
        .collect();
    validation.has_bingo = validation.matches.len() == NUMBERS_PER_CARD;

    validation
}
