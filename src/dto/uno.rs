use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::format_timestamp,
    state::uno::{
        card::{Card, Color},
        chat::ChatMessage,
        phase::RoundStatus,
        player::Player,
        session::UnoSession,
    },
};

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Payload of `uno-your-hand`. Only sent to the hand's owner.
pub struct HandPayload {
    pub hand: Vec<Card>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Payload of `uno-session-created`.
pub struct SessionCreatedPayload {
    pub session_token: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Payload of `uno-reconnected`.
pub struct ReconnectedPayload {
    pub session_token: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Payload of `uno-game-started`.
pub struct GameStartedPayload {
    pub top_card: Card,
    /// Name of the player who moves first.
    pub current_player: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Payload of `uno-game-over`.
pub struct GameOverPayload {
    /// Winner's name; `null` when the round was cut short.
    pub winner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Payload of `uno-kicked`.
pub struct KickedPayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Public view of a seated player. Hands and tokens stay private.
pub struct PlayerView {
    pub id: Uuid,
    pub name: String,
    pub card_count: usize,
    pub connected: bool,
    /// RFC 3339.
    pub last_seen: String,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            card_count: player.hand.len(),
            connected: player.connected,
            last_seen: format_timestamp(player.last_seen),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// A chat line; also the payload of `uno-chat-update`.
pub struct ChatView {
    pub player_name: String,
    pub text: String,
    /// RFC 3339.
    pub timestamp: String,
}

impl From<&ChatMessage> for ChatView {
    fn from(message: &ChatMessage) -> Self {
        Self {
            player_name: message.player_name.clone(),
            text: message.text.clone(),
            timestamp: format_timestamp(message.timestamp),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Payload of `uno-state-update`, broadcast after every table change.
pub struct UnoStatePayload {
    pub players: Vec<PlayerView>,
    pub status: RoundStatus,
    /// Name of the player whose turn it is.
    pub current_player: Option<String>,
    pub top_card: Option<Card>,
    pub wild_color: Option<Color>,
    /// A wild card is waiting for its color.
    pub awaiting_color: bool,
    pub qr_code_url: Option<String>,
    pub chat_messages: Vec<ChatView>,
    pub draw_stack: u32,
}

impl UnoStatePayload {
    /// Snapshot the table, carrying the last `chat_messages` chat lines.
    pub fn snapshot(session: &UnoSession, chat_messages: usize) -> Self {
        let engine = session.engine();
        Self {
            players: session.roster().iter().map(PlayerView::from).collect(),
            status: session.status(),
            current_player: session.current_player().map(|player| player.name.clone()),
            top_card: session.top_card().copied(),
            wild_color: engine.wild_color(),
            awaiting_color: engine.awaiting_color(),
            qr_code_url: session.qr_code_url().map(str::to_string),
            chat_messages: session
                .recent_chat(chat_messages)
                .map(ChatView::from)
                .collect(),
            draw_stack: engine.draw_stack(),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::state::{rng::RandomSource, uno::session::UnoSettings};

    #[test]
    fn snapshot_hides_hands_and_tokens() {
        let mut session = UnoSession::new(UnoSettings::default(), RandomSource::seeded(5));
        let now = OffsetDateTime::UNIX_EPOCH;
        session.join(Uuid::new_v4(), Some("Ana"), None, now);
        session.join(Uuid::new_v4(), Some("Ben"), None, now);
        session.start().unwrap();

        let value = serde_json::to_value(UnoStatePayload::snapshot(&session, 15)).unwrap();
        assert_eq!(value["status"], "playing");
        assert_eq!(value["currentPlayer"], "Ana");
        assert_eq!(value["players"][0]["cardCount"], 7);
        assert_eq!(value["players"][0]["lastSeen"], "1970-01-01T00:00:00Z");
        assert_eq!(value["awaitingColor"], false);
        assert!(value["players"][0].get("hand").is_none());
        assert!(value["players"][0].get("sessionToken").is_none());
    }
}
