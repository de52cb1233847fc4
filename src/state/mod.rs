pub mod bingo;
pub mod rng;
pub mod uno;

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{config::AppConfig, services::hub::HubHandle};

/// Identifier assigned to each WebSocket connection when it opens.
pub type ConnectionId = Uuid;

pub type SharedState = Arc<AppState>;

#[derive(Clone)]
/// Handle used to push frames to a connected browser.
pub struct ClientConnection {
    pub id: ConnectionId,
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state: configuration, open sockets, and the handle to
/// the dispatcher that owns every game store.
pub struct AppState {
    config: Arc<AppConfig>,
    connections: DashMap<ConnectionId, ClientConnection>,
    hub: HubHandle,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, hub: HubHandle) -> SharedState {
        Arc::new(Self {
            config: Arc::new(config),
            connections: DashMap::new(),
            hub,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }

    /// Registry of open sockets keyed by connection id.
    pub fn connections(&self) -> &DashMap<ConnectionId, ClientConnection> {
        &self.connections
    }

    /// Command channel into the dispatcher.
    pub fn hub(&self) -> &HubHandle {
        &self.hub
    }
}
