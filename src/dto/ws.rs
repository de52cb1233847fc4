use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        bingo::{
            BallDrawnPayload, BingoAnnouncedPayload, CardAssignedPayload, CardValidatedPayload,
            GameResetPayload, GameStatePayload, LineAnnouncedPayload, PlayerJoinedPayload,
        },
        uno::{
            ChatView, GameOverPayload, GameStartedPayload, HandPayload, KickedPayload,
            ReconnectedPayload, SessionCreatedPayload, UnoStatePayload,
        },
        validation::{validate_line_rows, validate_serial_number},
    },
    error::GameError,
    state::uno::card::Color,
};

#[derive(Debug, Deserialize)]
/// Raw `{ "event": ..., "data": ... }` frame before the payload is typed.
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Commands accepted from browser clients over `/ws`.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// `request-card`
    RequestCard(RequestCardPayload),
    /// `draw-ball`
    DrawBall,
    /// `reset-game`
    ResetGame,
    /// `validate-card`
    ValidateCard(ValidateCardPayload),
    /// `announce-line`
    AnnounceLine(AnnounceLinePayload),
    /// `announce-bingo`
    AnnounceBingo(AnnounceBingoPayload),
    /// `request-game-state`
    RequestGameState,
    /// `uno-join`
    UnoJoin(UnoJoinPayload),
    /// `uno-start`
    UnoStart,
    /// `uno-play-card`
    UnoPlayCard(PlayCardPayload),
    /// `uno-draw-card`
    UnoDrawCard,
    /// `uno-wild-color`
    UnoWildColor(WildColorPayload),
    /// `uno-chat-message`
    UnoChatMessage(ChatPayload),
    /// `uno-kick-player`
    UnoKickPlayer(KickPayload),
    /// `uno-state-request`
    UnoStateRequest,
    /// `uno-reset`
    UnoReset(UnoResetPayload),
}

impl ClientMessage {
    /// Parse and validate a text frame.
    pub fn from_json_str(text: &str) -> Result<Self, GameError> {
        let Envelope { event, data } = serde_json::from_str(text)
            .map_err(|err| GameError::InvalidInput(format!("malformed frame: {err}")))?;

        let message = match event.as_str() {
            "request-card" => Self::RequestCard(payload(data)?),
            "draw-ball" => Self::DrawBall,
            "reset-game" => Self::ResetGame,
            "validate-card" => Self::ValidateCard(payload(data)?),
            "announce-line" => Self::AnnounceLine(payload(data)?),
            "announce-bingo" => Self::AnnounceBingo(payload(data)?),
            "request-game-state" => Self::RequestGameState,
            "uno-join" => Self::UnoJoin(payload(data)?),
            "uno-start" => Self::UnoStart,
            "uno-play-card" => Self::UnoPlayCard(payload(data)?),
            "uno-draw-card" => Self::UnoDrawCard,
            "uno-wild-color" => Self::UnoWildColor(payload(data)?),
            "uno-chat-message" => Self::UnoChatMessage(payload(data)?),
            "uno-kick-player" => Self::UnoKickPlayer(payload(data)?),
            "uno-state-request" => Self::UnoStateRequest,
            "uno-reset" => Self::UnoReset(payload(data)?),
            other => {
                return Err(GameError::InvalidInput(format!("unknown event `{other}`")));
            }
        };

        Ok(message)
    }

    /// Wire name of the event, for logs.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::RequestCard(_) => "request-card",
            Self::DrawBall => "draw-ball",
            Self::ResetGame => "reset-game",
            Self::ValidateCard(_) => "validate-card",
            Self::AnnounceLine(_) => "announce-line",
            Self::AnnounceBingo(_) => "announce-bingo",
            Self::RequestGameState => "request-game-state",
            Self::UnoJoin(_) => "uno-join",
            Self::UnoStart => "uno-start",
            Self::UnoPlayCard(_) => "uno-play-card",
            Self::UnoDrawCard => "uno-draw-card",
            Self::UnoWildColor(_) => "uno-wild-color",
            Self::UnoChatMessage(_) => "uno-chat-message",
            Self::UnoKickPlayer(_) => "uno-kick-player",
            Self::UnoStateRequest => "uno-state-request",
            Self::UnoReset(_) => "uno-reset",
        }
    }
}

/// Deserialize and validate an event payload. A missing `data` reads as `{}`.
fn payload<T>(data: Value) -> Result<T, GameError>
where
    T: DeserializeOwned + Validate,
{
    let data = match data {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    let parsed: T = serde_json::from_value(data)
        .map_err(|err| GameError::InvalidInput(format!("invalid payload: {err}")))?;
    parsed.validate()?;
    Ok(parsed)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
/// Payload of `request-card`.
pub struct RequestCardPayload {
    /// Display name printed on the card.
    #[validate(length(max = 40))]
    pub player_name: Option<String>,
    /// Serial of a card cached client-side.
    pub serial_number: Option<String>,
    /// Game the cached card belongs to.
    pub game_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Payload of `validate-card`.
pub struct ValidateCardPayload {
    /// Card to check.
    pub serial_number: String,
}

impl Validate for ValidateCardPayload {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_serial_number(&self.serial_number) {
            errors.add("serial_number", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Payload of `announce-line`.
pub struct AnnounceLinePayload {
    /// Announcing player.
    pub player_name: String,
    /// Card the line is on.
    pub serial_number: String,
    /// Claimed rows (0 to 2).
    pub lines: Vec<usize>,
}

impl Validate for AnnounceLinePayload {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_serial_number(&self.serial_number) {
            errors.add("serial_number", e);
        }
        if let Err(e) = validate_line_rows(&self.lines) {
            errors.add("lines", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Payload of `announce-bingo`.
pub struct AnnounceBingoPayload {
    /// Announcing player.
    pub player_name: String,
    /// Card claimed complete.
    pub serial_number: String,
}

impl Validate for AnnounceBingoPayload {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_serial_number(&self.serial_number) {
            errors.add("serial_number", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
/// Payload of `uno-join`.
pub struct UnoJoinPayload {
    /// Display name at the table.
    #[validate(length(max = 40))]
    pub player_name: Option<String>,
    /// Token from an earlier `uno-session-created`.
    pub session_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
/// Payload of `uno-play-card`.
pub struct PlayCardPayload {
    /// Position of the card in the player's hand.
    pub card_index: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema, Validate)]
/// Payload of `uno-wild-color`.
pub struct WildColorPayload {
    /// Declared color.
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema, Validate)]
/// Payload of `uno-chat-message`.
pub struct ChatPayload {
    /// Message body. The length limit applies after trimming, at the table.
    #[validate(length(min = 1))]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
/// Payload of `uno-kick-player`.
pub struct KickPayload {
    /// Player to remove.
    pub player_id: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
/// Payload of `uno-reset`.
pub struct UnoResetPayload {
    /// Keep the roster (with empty hands) instead of clearing it.
    pub keep_players: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
/// Events pushed to browser clients over `/ws`.
pub enum ServerMessage {
    CardAssigned(CardAssignedPayload),
    BallDrawn(BallDrawnPayload),
    GameReset(GameResetPayload),
    CardValidated(CardValidatedPayload),
    LineAnnounced(LineAnnouncedPayload),
    BingoAnnounced(BingoAnnouncedPayload),
    GameState(GameStatePayload),
    PlayerJoined(PlayerJoinedPayload),
    UnoYourHand(HandPayload),
    UnoSessionCreated(SessionCreatedPayload),
    UnoReconnected(ReconnectedPayload),
    UnoGameStarted(GameStartedPayload),
    UnoGameOver(GameOverPayload),
    UnoStateUpdate(Box<UnoStatePayload>),
    UnoChatUpdate(ChatView),
    UnoKicked(KickedPayload),
    Error(ErrorPayload),
}

impl ServerMessage {
    /// `error{message}` for a rejected command.
    pub fn error(err: &GameError) -> Self {
        Self::Error(ErrorPayload {
            message: err.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
/// Payload of `error`.
pub struct ErrorPayload {
    /// Human-readable reason.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn payload_less_events_accept_missing_or_empty_data() {
        assert_eq!(
            ClientMessage::from_json_str(r#"{"event":"draw-ball"}"#).unwrap(),
            ClientMessage::DrawBall
        );
        assert_eq!(
            ClientMessage::from_json_str(r#"{"event":"uno-start","data":{}}"#).unwrap(),
            ClientMessage::UnoStart
        );
        assert_eq!(
            ClientMessage::from_json_str(r#"{"event":"uno-reset"}"#).unwrap(),
            ClientMessage::UnoReset(UnoResetPayload {
                keep_players: false
            })
        );
        assert_eq!(
            ClientMessage::from_json_str(r#"{"event":"request-card"}"#).unwrap(),
            ClientMessage::RequestCard(RequestCardPayload::default())
        );
    }

    #[test]
    fn camel_case_payloads_are_parsed() {
        let message = ClientMessage::from_json_str(
            r#"{"event":"request-card","data":{"playerName":"Lola","serialNumber":"1234","gameId":"GAME-1-abc"}}"#,
        )
        .unwrap();
        assert_eq!(
            message,
            ClientMessage::RequestCard(RequestCardPayload {
                player_name: Some("Lola".into()),
                serial_number: Some("1234".into()),
                game_id: Some("GAME-1-abc".into()),
            })
        );

        let message = ClientMessage::from_json_str(
            r#"{"event":"uno-wild-color","data":{"color":"green"}}"#,
        )
        .unwrap();
        assert_eq!(
            message,
            ClientMessage::UnoWildColor(WildColorPayload {
                color: Color::Green
            })
        );
    }

    #[test]
    fn invalid_payloads_are_rejected() {
        let cases = [
            r#"{"event":"validate-card","data":{"serialNumber":"12"}}"#,
            r#"{"event":"announce-line","data":{"playerName":"A","serialNumber":"1234","lines":[3]}}"#,
            r#"{"event":"uno-chat-message","data":{"text":""}}"#,
            r#"{"event":"uno-play-card","data":{"cardIndex":-1}}"#,
            r#"{"event":"uno-kick-player","data":{"playerId":"nope"}}"#,
            r#"{"event":"uno-wild-color","data":{"color":"purple"}}"#,
        ];
        for case in cases {
            assert!(
                matches!(
                    ClientMessage::from_json_str(case),
                    Err(GameError::InvalidInput(_))
                ),
                "{case} should be rejected"
            );
        }
    }

    #[test]
    fn chat_length_is_left_to_the_table() {
        let padded = format!("  {}", "x".repeat(279));
        let frame = json!({ "event": "uno-chat-message", "data": { "text": padded } });
        let ClientMessage::UnoChatMessage(payload) =
            ClientMessage::from_json_str(&frame.to_string()).unwrap()
        else {
            panic!("expected uno-chat-message");
        };
        assert_eq!(payload.text.trim().chars().count(), 279);
    }

    #[test]
    fn unknown_and_malformed_frames_are_invalid_input() {
        assert!(matches!(
            ClientMessage::from_json_str(r#"{"event":"buzz"}"#),
            Err(GameError::InvalidInput(msg)) if msg.contains("buzz")
        ));
        assert!(matches!(
            ClientMessage::from_json_str("not json"),
            Err(GameError::InvalidInput(_))
        ));
    }

    #[test]
    fn server_messages_use_event_envelope() {
        let value = serde_json::to_value(ServerMessage::error(&GameError::OutOfTurn)).unwrap();
        assert_eq!(
            value,
            json!({ "event": "error", "data": { "message": "it is not your turn" } })
        );

        let value = serde_json::to_value(ServerMessage::UnoKicked(KickedPayload {
            message: "bye".into(),
        }))
        .unwrap();
        assert_eq!(value["event"], "uno-kicked");
    }
}
