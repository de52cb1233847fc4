use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Round status of the card game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    /// Roster is open, no cards dealt.
    Waiting,
    /// A round is being played.
    Playing,
    /// The round finished, either with a winner or forcibly.
    Ended,
}

/// Why a round ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// A player emptied their hand.
    Winner(String),
    /// Kicks or timeouts left fewer than two players.
    NotEnoughPlayers,
}

impl EndReason {
    /// Human-readable reason sent alongside `uno-game-over`, if any.
    pub fn describe(&self) -> Option<&'static str> {
        match self {
            EndReason::Winner(_) => None,
            EndReason::NotEnoughPlayers => Some("not enough players"),
        }
    }
}

/// Events that move the round status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEvent {
    /// Cards are dealt and play begins.
    Start,
    /// The round stops.
    Finish(EndReason),
    /// Back to the lobby.
    Reset,
}

/// Error returned when an event does not apply to the current status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{event:?} cannot be applied while the round is {from:?}")]
pub struct InvalidTransition {
    /// Status the round was in.
    pub from: RoundStatus,
    /// Rejected event.
    pub event: RoundEvent,
}

/// Compute the status reached by applying `event` in `from`.
///
/// `Start` is accepted after a finished round as an implicit reset that keeps
/// the roster.
pub fn next_status(from: RoundStatus, event: RoundEvent) -> Result<RoundStatus, InvalidTransition> {
    let next = match (from, &event) {
        (RoundStatus::Waiting | RoundStatus::Ended, RoundEvent::Start) => RoundStatus::Playing,
        (RoundStatus::Playing, RoundEvent::Finish(_)) => RoundStatus::Ended,
        (_, RoundEvent::Reset) => RoundStatus::Waiting,
        _ => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}
