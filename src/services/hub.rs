//! Single dispatcher task owning both game stores.
//!
//! Connection tasks, the QR renderer, and HTTP handlers talk to the hub through
//! [`HubHandle`]; the hub applies commands one at a time and fans the resulting
//! [`Outbound`] messages out through the connection registry.

use axum::extract::ws::Message;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::{
    sync::{mpsc, oneshot},
    time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    dto::{
        bingo::GameStatePayload,
        ws::{ClientMessage, ServerMessage},
    },
    error::GameError,
    services::{bingo_service, uno_service, websocket_service::serialize_message},
    state::{
        ConnectionId, SharedState,
        bingo::session::BingoSession,
        rng::RandomSource,
        uno::session::{UnoSession, UnoSettings},
    },
};

/// Who receives an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// A single connection.
    Connection(ConnectionId),
    /// Every open connection.
    Everyone,
}

/// A message produced by the hub, waiting to be delivered.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub recipient: Recipient,
    pub message: ServerMessage,
}

impl Outbound {
    /// Address `message` to `connection` only.
    pub fn to(connection: ConnectionId, message: ServerMessage) -> Self {
        Self {
            recipient: Recipient::Connection(connection),
            message,
        }
    }

    /// Address `message` to every connection.
    pub fn everyone(message: ServerMessage) -> Self {
        Self {
            recipient: Recipient::Everyone,
            message,
        }
    }
}

/// Which QR payload a render belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrTarget {
    /// Bingo player page.
    Bingo,
    /// Card-game player page.
    Uno,
}

/// Commands processed by the hub, strictly in arrival order.
#[derive(Debug)]
pub enum HubCommand {
    /// A socket opened.
    Connected { connection: ConnectionId },
    /// A parsed and validated client frame.
    Inbound {
        connection: ConnectionId,
        message: ClientMessage,
    },
    /// A socket closed.
    Disconnected { connection: ConnectionId },
    /// A QR payload finished rendering.
    QrReady { target: QrTarget, url: String },
    /// Read the cached bingo QR payload.
    BingoQr {
        reply: oneshot::Sender<Option<String>>,
    },
}

/// The hub task is gone.
#[derive(Debug, Error)]
#[error("game dispatcher is not running")]
pub struct HubClosed;

#[derive(Debug, Clone)]
/// Sending side of the hub's command channel.
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubCommand>,
}

impl HubHandle {
    /// Create the channel; the receiver goes to [`run`].
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<HubCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a command.
    pub fn send(&self, command: HubCommand) -> Result<(), HubClosed> {
        self.tx.send(command).map_err(|_| HubClosed)
    }

    /// Cached bingo QR payload, if rendered.
    pub async fn bingo_qr(&self) -> Result<Option<String>, HubClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::BingoQr { reply })?;
        rx.await.map_err(|_| HubClosed)
    }

    /// Whether the hub stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Owner of both game stores.
#[derive(Debug)]
pub struct Hub {
    bingo: BingoSession,
    uno: UnoSession,
    chat_snapshot: usize,
}

impl Hub {
    /// Hub with fresh stores drawing randomness from the OS.
    pub fn new(config: &AppConfig) -> Self {
        Self::with_stores(
            BingoSession::new(RandomSource::from_entropy()),
            UnoSession::new(config.uno_settings(), RandomSource::from_entropy()),
            config.chat_snapshot(),
        )
    }

    /// Hub with deterministic stores, for tests.
    pub fn seeded(seed: u64, settings: UnoSettings, chat_snapshot: usize) -> Self {
        Self::with_stores(
            BingoSession::new(RandomSource::seeded(seed)),
            UnoSession::new(settings, RandomSource::seeded(seed.wrapping_add(1))),
            chat_snapshot,
        )
    }

    fn with_stores(bingo: BingoSession, uno: UnoSession, chat_snapshot: usize) -> Self {
        Self {
            bingo,
            uno,
            chat_snapshot,
        }
    }

    /// Bingo store, read-only.
    pub fn bingo(&self) -> &BingoSession {
        &self.bingo
    }

    /// Card-game store, read-only.
    pub fn uno(&self) -> &UnoSession {
        &self.uno
    }

    /// Apply one command and return the messages it produced.
    pub fn handle(&mut self, command: HubCommand, now: OffsetDateTime) -> Vec<Outbound> {
        match command {
            HubCommand::Connected { connection } => {
                debug!(%connection, "sending initial game state");
                vec![Outbound::to(
                    connection,
                    ServerMessage::GameState(GameStatePayload::from(&self.bingo)),
                )]
            }
            HubCommand::Inbound {
                connection,
                message,
            } => {
                let event = message.event_name();
                debug!(%connection, event, "dispatching client event");
                match self.dispatch(connection, message, now) {
                    Ok(outbound) => outbound,
                    Err(err) => {
                        warn!(%connection, event, error = %err, "rejected client event");
                        vec![Outbound::to(connection, ServerMessage::error(&err))]
                    }
                }
            }
            HubCommand::Disconnected { connection } => {
                self.bingo.disconnect(connection);
                uno_service::disconnect(&mut self.uno, connection, now, self.chat_snapshot)
            }
            HubCommand::QrReady { target, url } => match target {
                QrTarget::Bingo => {
                    info!("bingo QR code ready");
                    self.bingo.set_qr_code_url(url);
                    vec![Outbound::everyone(ServerMessage::GameState(
                        GameStatePayload::from(&self.bingo),
                    ))]
                }
                QrTarget::Uno => {
                    info!("card game QR code ready");
                    self.uno.set_qr_code_url(url);
                    vec![uno_service::state_update(&self.uno, self.chat_snapshot)]
                }
            },
            HubCommand::BingoQr { reply } => {
                let _ = reply.send(self.bingo.qr_code_url().map(str::to_string));
                Vec::new()
            }
        }
    }

    /// Purge card-game players whose disconnect timed out.
    pub fn sweep(&mut self, now: OffsetDateTime) -> Vec<Outbound> {
        uno_service::sweep(&mut self.uno, now, self.chat_snapshot)
    }

    fn dispatch(
        &mut self,
        connection: ConnectionId,
        message: ClientMessage,
        now: OffsetDateTime,
    ) -> Result<Vec<Outbound>, GameError> {
        let bingo = &mut self.bingo;
        let uno = &mut self.uno;
        let snapshot = self.chat_snapshot;

        match message {
            ClientMessage::RequestCard(payload) => {
                bingo_service::request_card(bingo, connection, payload)
            }
            ClientMessage::DrawBall => bingo_service::draw_ball(bingo),
            ClientMessage::ResetGame => Ok(bingo_service::reset_game(bingo)),
            ClientMessage::ValidateCard(payload) => {
                bingo_service::validate_card(bingo, connection, payload)
            }
            ClientMessage::AnnounceLine(payload) => bingo_service::announce_line(bingo, payload),
            ClientMessage::AnnounceBingo(payload) => {
                bingo_service::announce_bingo(bingo, payload)
            }
            ClientMessage::RequestGameState => Ok(bingo_service::game_state(bingo, connection)),
            ClientMessage::UnoJoin(payload) => {
                Ok(uno_service::join(uno, connection, payload, now, snapshot))
            }
            ClientMessage::UnoStart => uno_service::start(uno, snapshot),
            ClientMessage::UnoPlayCard(payload) => {
                uno_service::play_card(uno, connection, payload.card_index, now, snapshot)
            }
            ClientMessage::UnoDrawCard => uno_service::draw_card(uno, connection, now, snapshot),
            ClientMessage::UnoWildColor(payload) => {
                uno_service::choose_color(uno, connection, payload.color, now, snapshot)
            }
            ClientMessage::UnoChatMessage(payload) => {
                uno_service::chat(uno, connection, &payload.text, now)
            }
            ClientMessage::UnoKickPlayer(payload) => {
                uno_service::kick(uno, payload.player_id, snapshot)
            }
            ClientMessage::UnoStateRequest => {
                Ok(uno_service::state_request(uno, connection, snapshot))
            }
            ClientMessage::UnoReset(payload) => {
                uno_service::reset(uno, payload.keep_players, snapshot)
            }
        }
    }
}

/// Drive the hub until every [`HubHandle`] is dropped.
pub async fn run(
    state: SharedState,
    mut hub: Hub,
    mut commands: mpsc::UnboundedReceiver<HubCommand>,
) {
    let mut sweep = tokio::time::interval(state.config().sweep_interval());
    sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!("game dispatcher started");

    loop {
        let outbound = tokio::select! {
            command = commands.recv() => match command {
                Some(command) => hub.handle(command, OffsetDateTime::now_utc()),
                None => break,
            },
            _ = sweep.tick() => hub.sweep(OffsetDateTime::now_utc()),
        };
        deliver(&state, outbound);
    }

    info!("game dispatcher stopped");
}

/// Push messages to their recipients, dropping connections whose writer is gone.
pub fn deliver(state: &SharedState, outbound: Vec<Outbound>) {
    for Outbound { recipient, message } in outbound {
        let Some(payload) = serialize_message(&message) else {
            continue;
        };

        let mut closed = Vec::new();
        match recipient {
            Recipient::Connection(connection) => {
                if let Some(client) = state.connections().get(&connection)
                    && client.tx.send(Message::Text(payload.into())).is_err()
                {
                    closed.push(connection);
                }
            }
            Recipient::Everyone => {
                for client in state.connections().iter() {
                    if client.tx.send(Message::Text(payload.clone().into())).is_err() {
                        closed.push(client.id);
                    }
                }
            }
        }

        for connection in closed {
            warn!(%connection, "send failed (writer closed), removing connection");
            state.connections().remove(&connection);
        }
    }
}
