//! Drives the dispatcher end to end with parsed frames, without sockets.

use std::time::Duration;

use party_games_back::{
    dto::ws::{ClientMessage, ServerMessage},
    services::hub::{Hub, HubCommand, Outbound, QrTarget, Recipient},
    state::{ConnectionId, uno::session::UnoSettings},
};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

struct Harness {
    hub: Hub,
    now: OffsetDateTime,
}

impl Harness {
    fn new() -> Self {
        let settings = UnoSettings {
            disconnect_timeout: Duration::from_secs(60),
            chat_history: 50,
        };
        Self {
            hub: Hub::seeded(2024, settings, 15),
            now: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn connect(&mut self) -> (ConnectionId, Vec<Outbound>) {
        let connection = Uuid::new_v4();
        let outbound = self
            .hub
            .handle(HubCommand::Connected { connection }, self.now);
        (connection, outbound)
    }

    fn send(&mut self, connection: ConnectionId, frame: &str) -> Vec<Outbound> {
        let message = ClientMessage::from_json_str(frame).expect("valid frame");
        self.hub.handle(
            HubCommand::Inbound {
                connection,
                message,
            },
            self.now,
        )
    }

    fn disconnect(&mut self, connection: ConnectionId) -> Vec<Outbound> {
        self.hub
            .handle(HubCommand::Disconnected { connection }, self.now)
    }
}

fn json(outbound: &Outbound) -> Value {
    serde_json::to_value(&outbound.message).unwrap()
}

fn find<'a>(outbound: &'a [Outbound], event: &str) -> Option<&'a Outbound> {
    outbound.iter().find(|o| json(o)["event"] == event)
}

#[test]
fn new_connections_receive_the_bingo_snapshot() {
    let mut harness = Harness::new();
    let (connection, outbound) = harness.connect();

    assert_eq!(outbound.len(), 1);
    assert_eq!(outbound[0].recipient, Recipient::Connection(connection));
    let value = json(&outbound[0]);
    assert_eq!(value["event"], "game-state");
    assert_eq!(value["data"]["activeCards"], 0);
    assert!(value["data"]["gameId"].as_str().unwrap().starts_with("GAME-"));
}

#[test]
fn bingo_round_trip() {
    let mut harness = Harness::new();
    let (moderator, _) = harness.connect();
    let (player, _) = harness.connect();

    let outbound = harness.send(
        player,
        r#"{"event":"request-card","data":{"playerName":"Lucía"}}"#,
    );
    let assigned = find(&outbound, "card-assigned").unwrap();
    assert_eq!(assigned.recipient, Recipient::Connection(player));
    let card = json(assigned)["data"]["card"].clone();
    let serial = card["serialNumber"].as_str().unwrap().to_string();
    let game_id = json(assigned)["data"]["gameId"].as_str().unwrap().to_string();
    let joined = find(&outbound, "player-joined").unwrap();
    assert_eq!(joined.recipient, Recipient::Everyone);

    // A refreshed page recovers the same card on a new connection.
    let (refreshed, _) = harness.connect();
    let outbound = harness.send(
        refreshed,
        &format!(
            r#"{{"event":"request-card","data":{{"serialNumber":"{serial}","gameId":"{game_id}"}}}}"#
        ),
    );
    assert_eq!(outbound.len(), 1);
    assert_eq!(json(&outbound[0])["data"]["card"]["serialNumber"], serial);
    assert_eq!(json(&outbound[0])["data"]["card"]["playerName"], "Lucía");

    let outbound = harness.send(moderator, r#"{"event":"draw-ball"}"#);
    let drawn = &outbound[0];
    assert_eq!(drawn.recipient, Recipient::Everyone);
    assert_eq!(json(drawn)["event"], "ball-drawn");
    assert_eq!(json(drawn)["data"]["drawnBalls"].as_array().unwrap().len(), 1);

    let outbound = harness.send(
        moderator,
        &format!(r#"{{"event":"validate-card","data":{{"serialNumber":"{serial}"}}}}"#),
    );
    assert_eq!(outbound[0].recipient, Recipient::Connection(moderator));
    let validation = &json(&outbound[0])["data"]["validation"];
    assert_eq!(validation["serialNumber"], serial);
    assert_eq!(validation["hasBingo"], false);

    let outbound = harness.send(moderator, r#"{"event":"reset-game"}"#);
    let value = json(&outbound[0]);
    assert_eq!(value["event"], "game-reset");
    assert_ne!(value["data"]["gameId"], game_id.as_str());
}

#[test]
fn exhausted_drum_answers_only_the_caller() {
    let mut harness = Harness::new();
    let (moderator, _) = harness.connect();
    for _ in 0..90 {
        harness.send(moderator, r#"{"event":"draw-ball"}"#);
    }
    let outbound = harness.send(moderator, r#"{"event":"draw-ball"}"#);
    assert_eq!(outbound.len(), 1);
    assert_eq!(outbound[0].recipient, Recipient::Connection(moderator));
    assert_eq!(json(&outbound[0])["event"], "error");
}

#[test]
fn card_game_round_with_reconnect_and_kick() {
    let mut harness = Harness::new();
    let (ana, _) = harness.connect();
    let (ben, _) = harness.connect();
    let (cy, _) = harness.connect();

    let outbound = harness.send(ana, r#"{"event":"uno-join","data":{"playerName":"Ana"}}"#);
    let created = find(&outbound, "uno-session-created").unwrap();
    assert_eq!(created.recipient, Recipient::Connection(ana));
    harness.send(ben, r#"{"event":"uno-join","data":{"playerName":"Ben"}}"#);
    let outbound = harness.send(cy, r#"{"event":"uno-join","data":{"playerName":"Cy"}}"#);
    let cy_token = json(find(&outbound, "uno-session-created").unwrap())["data"]["sessionToken"]
        .as_str()
        .unwrap()
        .to_string();

    let outbound = harness.send(ben, r#"{"event":"uno-start"}"#);
    let started = json(find(&outbound, "uno-game-started").unwrap());
    assert_eq!(started["data"]["currentPlayer"], "Ana");
    let hands = outbound
        .iter()
        .filter(|o| matches!(o.message, ServerMessage::UnoYourHand(_)))
        .count();
    assert_eq!(hands, 3);

    // Out-of-turn actions are rejected privately.
    let outbound = harness.send(ben, r#"{"event":"uno-draw-card"}"#);
    assert_eq!(outbound.len(), 1);
    assert_eq!(outbound[0].recipient, Recipient::Connection(ben));
    assert_eq!(json(&outbound[0])["data"]["message"], "it is not your turn");

    // Ana draws; the turn moves to Ben.
    let outbound = harness.send(ana, r#"{"event":"uno-draw-card"}"#);
    let hand = json(find(&outbound, "uno-your-hand").unwrap());
    assert_eq!(hand["data"]["hand"].as_array().unwrap().len(), 8);
    let state = json(find(&outbound, "uno-state-update").unwrap());
    assert_eq!(state["data"]["currentPlayer"], "Ben");

    // Cy drops and comes back on a new connection with the token.
    harness.disconnect(cy);
    assert_eq!(harness.hub.uno().roster().len(), 3);
    let (cy_again, _) = harness.connect();
    let outbound = harness.send(
        cy_again,
        &format!(r#"{{"event":"uno-join","data":{{"playerName":"Cy","sessionToken":"{cy_token}"}}}}"#),
    );
    let reconnected = find(&outbound, "uno-reconnected").unwrap();
    assert_eq!(reconnected.recipient, Recipient::Connection(cy_again));
    let hand = json(find(&outbound, "uno-your-hand").unwrap());
    assert_eq!(hand["data"]["hand"].as_array().unwrap().len(), 7);
    assert_eq!(harness.hub.uno().roster().len(), 3);

    // Kick Ben while it is his turn: the turn moves on to Cy.
    let ben_id = harness.hub.uno().player_for(ben).unwrap().id;
    let outbound = harness.send(
        ana,
        &format!(r#"{{"event":"uno-kick-player","data":{{"playerId":"{ben_id}"}}}}"#),
    );
    let kicked = find(&outbound, "uno-kicked").unwrap();
    assert_eq!(kicked.recipient, Recipient::Connection(ben));
    let state = json(find(&outbound, "uno-state-update").unwrap());
    assert_eq!(state["data"]["currentPlayer"], "Cy");
    assert_eq!(state["data"]["players"].as_array().unwrap().len(), 2);
    assert_eq!(harness.hub.uno().cards_in_play(), 108);
}

#[test]
fn sweep_ends_a_round_left_with_one_player() {
    let mut harness = Harness::new();
    let (ana, _) = harness.connect();
    let (ben, _) = harness.connect();
    harness.send(ana, r#"{"event":"uno-join","data":{"playerName":"Ana"}}"#);
    harness.send(ben, r#"{"event":"uno-join","data":{"playerName":"Ben"}}"#);
    harness.send(ana, r#"{"event":"uno-start"}"#);

    harness.disconnect(ben);
    harness.now += time::Duration::seconds(30);
    assert!(harness.hub.sweep(harness.now).is_empty());

    harness.now += time::Duration::seconds(31);
    let outbound = harness.hub.sweep(harness.now);
    let over = json(find(&outbound, "uno-game-over").unwrap());
    assert_eq!(over["data"]["winner"], Value::Null);
    assert_eq!(over["data"]["reason"], "not enough players");
    let state = json(find(&outbound, "uno-state-update").unwrap());
    assert_eq!(state["data"]["status"], "ended");
}

#[test]
fn chat_reaches_everyone_and_snapshots_carry_it() {
    let mut harness = Harness::new();
    let (ana, _) = harness.connect();
    let (stranger, _) = harness.connect();
    harness.send(ana, r#"{"event":"uno-join","data":{"playerName":"Ana"}}"#);

    let outbound = harness.send(ana, r#"{"event":"uno-chat-message","data":{"text":" hola "}}"#);
    assert_eq!(outbound[0].recipient, Recipient::Everyone);
    let update = json(&outbound[0]);
    assert_eq!(update["event"], "uno-chat-update");
    assert_eq!(update["data"]["text"], "hola");

    let outbound = harness.send(stranger, r#"{"event":"uno-chat-message","data":{"text":"hi"}}"#);
    assert_eq!(json(&outbound[0])["event"], "error");

    let outbound = harness.send(ana, r#"{"event":"uno-state-request"}"#);
    let state = json(find(&outbound, "uno-state-update").unwrap());
    assert_eq!(state["data"]["chatMessages"][0]["text"], "hola");
    assert_eq!(outbound[0].recipient, Recipient::Connection(ana));
}

#[test]
fn rendered_qr_codes_are_cached_and_announced() {
    let mut harness = Harness::new();
    let outbound = harness.hub.handle(
        HubCommand::QrReady {
            target: QrTarget::Uno,
            url: "data:image/svg+xml;base64,AAAA".into(),
        },
        harness.now,
    );
    let state = json(find(&outbound, "uno-state-update").unwrap());
    assert_eq!(state["data"]["qrCodeUrl"], "data:image/svg+xml;base64,AAAA");

    harness.hub.handle(
        HubCommand::QrReady {
            target: QrTarget::Bingo,
            url: "data:image/svg+xml;base64,BBBB".into(),
        },
        harness.now,
    );
    assert_eq!(
        harness.hub.bingo().qr_code_url(),
        Some("data:image/svg+xml;base64,BBBB")
    );
}
