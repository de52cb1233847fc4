use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Open WebSocket connections.
    pub connections: usize,
}

impl HealthResponse {
    /// The dispatcher is running.
    pub fn ok(connections: usize) -> Self {
        Self {
            status: "ok".to_string(),
            connections,
        }
    }

    /// The dispatcher has stopped; commands are no longer applied.
    pub fn degraded(connections: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            connections,
        }
    }
}
