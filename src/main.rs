//! Party Games Back binary entrypoint wiring the HTTP pages, the WebSocket
//! channel, and the game dispatcher.

use std::{env, net::SocketAddr};

use anyhow::Context;
use axum::Router;
use party_games_back::{
    config::{AppConfig, DEFAULT_PORT},
    routes,
    services::{
        hub::{self, Hub, HubHandle, QrTarget},
        qr_service,
    },
    state::{AppState, SharedState},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let mut config = AppConfig::load();
    if let Ok(base_url) = env::var("BASE_URL")
        && !base_url.trim().is_empty()
    {
        config = config.with_base_url(base_url);
    }
    let base_url = config.base_url(port);

    let hub = Hub::new(&config);
    let (hub_handle, commands) = HubHandle::channel();
    let app_state = AppState::new(config, hub_handle.clone());
    tokio::spawn(hub::run(app_state.clone(), hub, commands));

    qr_service::spawn_render(
        hub_handle.clone(),
        QrTarget::Bingo,
        format!("{base_url}/player"),
    );
    qr_service::spawn_render(hub_handle, QrTarget::Uno, format!("{base_url}/unoplayer"));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, %base_url, "starting server");
    info!("bingo players join at {base_url}/player, moderator panel at {base_url}/moderator");
    info!("card game players join at {base_url}/unoplayer, table display at {base_url}/unogame");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
