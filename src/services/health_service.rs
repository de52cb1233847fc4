use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report dispatcher liveness and the number of open sockets.
pub fn health_status(state: &SharedState) -> HealthResponse {
    let connections = state.connections().len();

    if state.hub().is_closed() {
        warn!("game dispatcher stopped (degraded mode)");
        HealthResponse::degraded(connections)
    } else {
        HealthResponse::ok(connections)
    }
}
