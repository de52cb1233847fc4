use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::state::uno::phase::InvalidTransition;

/// Errors produced while applying a client command to one of the game stores.
///
/// Every variant is raised before the store is mutated, so a rejected command
/// never leaves partial state behind. The hub reports them to the originating
/// connection only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Action attempted by a player whose turn it is not (or who is not seated).
    #[error("it is not your turn")]
    OutOfTurn,
    /// Card play or follow-up action that breaks the matching/stacking rules.
    #[error("illegal move: {0}")]
    IllegalMove(String),
    /// Lookup of an unknown card, serial number, player, or hand slot.
    #[error("not found: {0}")]
    NotFound(String),
    /// A finite resource ran out (balls in the drum, card serial numbers).
    #[error("exhausted: {0}")]
    Exhausted(String),
    /// A round needs at least two players.
    #[error("at least 2 players are required")]
    InsufficientPlayers,
    /// Command not allowed in the current round status.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Payload failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<InvalidTransition> for GameError {
    fn from(err: InvalidTransition) -> Self {
        GameError::InvalidState(err.to_string())
    }
}

impl From<ValidationErrors> for GameError {
    fn from(err: ValidationErrors) -> Self {
        GameError::InvalidInput(format!("validation failed: {err}"))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Service unavailable (dispatcher stopped).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
