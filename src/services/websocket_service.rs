use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{ClientMessage, ServerMessage},
    services::hub::HubCommand,
    state::{ClientConnection, SharedState},
};

/// Handle the full lifecycle for an individual browser WebSocket connection.
///
/// Frames are parsed here; every state change happens on the hub.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let connection = Uuid::new_v4();
    state.connections().insert(
        connection,
        ClientConnection {
            id: connection,
            tx: outbound_tx.clone(),
        },
    );
    info!(%connection, "client connected");

    if state
        .hub()
        .send(HubCommand::Connected { connection })
        .is_err()
    {
        warn!(%connection, "game dispatcher unavailable, closing connection");
        state.connections().remove(&connection);
        let _ = outbound_tx.send(Message::Close(None));
        finalize(writer_task, outbound_tx).await;
        return;
    }

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                debug!(%connection, payload = %text, "received client message");

                match ClientMessage::from_json_str(&text) {
                    Ok(message) => {
                        if state
                            .hub()
                            .send(HubCommand::Inbound {
                                connection,
                                message,
                            })
                            .is_err()
                        {
                            warn!(%connection, "game dispatcher unavailable, closing connection");
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(%connection, error = %err, "failed to parse or validate client message");
                        if let Some(payload) = serialize_message(&ServerMessage::error(&err))
                            && outbound_tx.send(Message::Text(payload.into())).is_err()
                        {
                            break;
                        }
                    }
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(%connection, "client closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(%connection, error = %err, "websocket error");
                break;
            }
        }
    }

    state.connections().remove(&connection);
    let _ = state.hub().send(HubCommand::Disconnected { connection });
    info!(%connection, "client disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Serialize an outbound message to its JSON text frame.
///
/// Serialization failure is a permanent error (bug in code); it is logged and
/// the message dropped.
pub fn serialize_message(message: &ServerMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(payload) => Some(payload),
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{message:?}` (permanent error, not retrying)");
            None
        }
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
