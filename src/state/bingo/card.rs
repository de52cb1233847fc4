//! Spanish-style 90-ball bingo cards: 3 rows × 9 columns, 15 numbers.

use std::collections::BTreeSet;

use crate::state::rng::RandomSource;

/// Number of rows on a card.
pub const ROWS: usize = 3;
/// Number of columns on a card.
pub const COLUMNS: usize = 9;
/// Filled cells per row.
pub const NUMBERS_PER_ROW: usize = 5;
/// Filled cells per card.
pub const NUMBERS_PER_CARD: usize = ROWS * NUMBERS_PER_ROW;

/// Inclusive value range of each column. Sizes are 9, 10 × 7, then 11.
pub const COLUMN_RANGES: [(u8, u8); COLUMNS] = [
    (1, 9),
    (10, 19),
    (20, 29),
    (30, 39),
    (40, 49),
    (50, 59),
    (60, 69),
    (70, 79),
    (80, 90),
];

/// Grid of optional numbers, indexed `[row][column]`.
pub type Matrix = [[Option<u8>; COLUMNS]; ROWS];

/// A bingo card handed to a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BingoCard {
    /// Player-facing 4-digit identifier used for recovery and validation.
    pub serial_number: String,
    /// Number layout, immutable once generated.
    pub matrix: Matrix,
    /// The 15 numbers on the card.
    pub numbers: BTreeSet<u8>,
    /// Display name of the player holding the card.
    pub player_name: String,
}

impl BingoCard {
    /// Iterate over filled cells as `(row, column, number)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.matrix.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.map(|number| (row, col, number)))
        })
    }
}

/// Random 4-digit serial in `1000..=9999`.
pub fn random_serial(rng: &mut RandomSource) -> String {
    rng.between(1000, 9999).to_string()
}

/// Generate a valid card for `player_name`.
///
/// The serial number is random and may collide with cards already issued in
/// the session; callers that need uniqueness re-roll it.
pub fn generate_card(rng: &mut RandomSource, player_name: impl Into<String>) -> BingoCard {
    let mut matrix: Matrix = [[None; COLUMNS]; ROWS];

    for row in matrix.iter_mut() {
        for col in rng.sample_indices(COLUMNS, NUMBERS_PER_ROW) {
            row[col] = Some(0);
        }
    }

    repair_empty_columns(&mut matrix, rng);

    for col in 0..COLUMNS {
        let filled: Vec<usize> = (0..ROWS).filter(|&row| matrix[row][col].is_some()).collect();
        let mut values = distinct_values_in_column(col, filled.len(), rng);
        values.sort_unstable();
        for (row, value) in filled.into_iter().zip(values) {
            matrix[row][col] = Some(value);
        }
    }

    let numbers = matrix.iter().flatten().flatten().copied().collect();

    BingoCard {
        serial_number: random_serial(rng),
        matrix,
        numbers,
        player_name: player_name.into(),
    }
}

/// Move cells so every column holds at least one number while each row keeps
/// exactly five. A cell is taken from a column that holds two or more.
fn repair_empty_columns(matrix: &mut Matrix, rng: &mut RandomSource) {
    for empty_col in 0..COLUMNS {
        if column_count(matrix, empty_col) > 0 {
            continue;
        }

        let donors: Vec<(usize, usize)> = (0..ROWS)
            .flat_map(|row| (0..COLUMNS).map(move |col| (row, col)))
            .filter(|&(row, col)| matrix[row][col].is_some() && column_count(matrix, col) > 1)
            .collect();

        // 15 cells over 9 columns with one empty leaves at least one donor.
        if donors.is_empty() {
            continue;
        }
        let (row, col) = donors[rng.index(donors.len())];
        matrix[row][col] = None;
        matrix[row][empty_col] = Some(0);
    }
}

fn column_count(matrix: &Matrix, col: usize) -> usize {
    (0..ROWS).filter(|&row| matrix[row][col].is_some()).count()
}

fn distinct_values_in_column(col: usize, amount: usize, rng: &mut RandomSource) -> Vec<u8> {
    let (low, high) = COLUMN_RANGES[col];
    let span = usize::from(high - low) + 1;
    rng.sample_indices(span, amount)
        .into_iter()
        .map(|offset| low + offset as u8)
        .collect()
}
