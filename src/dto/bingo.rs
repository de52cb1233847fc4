use serde::Serialize;
use utoipa::ToSchema;

use crate::state::bingo::{
    card::BingoCard,
    session::{BingoSession, ValidatedCard},
    validator::CellMatch,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// A bingo card as shown to players and the moderator.
pub struct BingoCardView {
    /// 4-digit serial.
    pub serial_number: String,
    /// 3 rows of 9 cells; `null` marks an empty cell.
    pub matrix: Vec<Vec<Option<u8>>>,
    /// The 15 numbers, ascending.
    pub numbers: Vec<u8>,
    /// Owner's display name.
    pub player_name: String,
}

impl From<&BingoCard> for BingoCardView {
    fn from(card: &BingoCard) -> Self {
        Self {
            serial_number: card.serial_number.clone(),
            matrix: card.matrix.iter().map(|row| row.to_vec()).collect(),
            numbers: card.numbers.iter().copied().collect(),
            player_name: card.player_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Payload of `card-assigned`.
pub struct CardAssignedPayload {
    pub game_id: String,
    pub card: BingoCardView,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Payload of `ball-drawn`.
pub struct BallDrawnPayload {
    pub ball: u8,
    pub drawn_balls: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Payload of `game-reset`.
pub struct GameResetPayload {
    pub game_id: String,
    pub qr_code_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// A drawn number found on a card.
pub struct CellMatchView {
    pub row: usize,
    pub col: usize,
    pub number: u8,
}

impl From<&CellMatch> for CellMatchView {
    fn from(cell: &CellMatch) -> Self {
        Self {
            row: cell.row,
            col: cell.col,
            number: cell.number,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Match status of a card against the drawn balls.
pub struct ValidationView {
    pub serial_number: String,
    pub player_name: String,
    pub matrix: Vec<Vec<Option<u8>>>,
    pub matches: Vec<CellMatchView>,
    /// Rows with all five numbers drawn.
    pub lines: Vec<usize>,
    pub has_bingo: bool,
}

impl From<&ValidatedCard> for ValidationView {
    fn from(validated: &ValidatedCard) -> Self {
        let card = BingoCardView::from(&validated.card);
        Self {
            serial_number: card.serial_number,
            player_name: card.player_name,
            matrix: card.matrix,
            matches: validated
                .validation
                .matches
                .iter()
                .map(CellMatchView::from)
                .collect(),
            lines: validated.validation.lines.clone(),
            has_bingo: validated.validation.has_bingo,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Payload of `card-validated`.
pub struct CardValidatedPayload {
    pub validation: ValidationView,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Payload of `line-announced`.
pub struct LineAnnouncedPayload {
    pub player_name: String,
    pub serial_number: String,
    pub lines: Vec<usize>,
    /// Every claimed row is complete on the stored card.
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Payload of `bingo-announced`.
pub struct BingoAnnouncedPayload {
    pub player_name: String,
    pub serial_number: String,
    /// All 15 numbers on the stored card have been drawn.
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Payload of `game-state`.
pub struct GameStatePayload {
    pub game_id: String,
    pub drawn_balls: Vec<u8>,
    pub qr_code_url: Option<String>,
    pub active_cards: usize,
}

impl From<&BingoSession> for GameStatePayload {
    fn from(session: &BingoSession) -> Self {
        Self {
            game_id: session.game_id().to_string(),
            drawn_balls: session.drawn_balls().to_vec(),
            qr_code_url: session.qr_code_url().map(str::to_string),
            active_cards: session.active_cards(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Payload of `player-joined`.
pub struct PlayerJoinedPayload {
    pub active_cards: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::rng::RandomSource;
    use crate::state::bingo::card::generate_card;

    #[test]
    fn card_view_keeps_empty_cells_as_null() {
        let mut rng = RandomSource::seeded(3);
        let card = generate_card(&mut rng, "Rosa");
        let value = serde_json::to_value(BingoCardView::from(&card)).unwrap();

        let matrix = value["matrix"].as_array().unwrap();
        assert_eq!(matrix.len(), 3);
        for row in matrix {
            let row = row.as_array().unwrap();
            assert_eq!(row.len(), 9);
            assert_eq!(row.iter().filter(|cell| cell.is_null()).count(), 4);
        }
        assert_eq!(value["numbers"].as_array().unwrap().len(), 15);
        assert_eq!(value["playerName"], "Rosa");
        assert_eq!(value["serialNumber"], card.serial_number);
    }
}
