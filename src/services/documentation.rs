use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Party Games Back.
///
/// The WebSocket frames are `{ "event": ..., "data": ... }`; the listed
/// payload schemas are the `data` part of each event.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::pages::qr_code,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::ws::RequestCardPayload,
            crate::dto::ws::ValidateCardPayload,
            crate::dto::ws::AnnounceLinePayload,
            crate::dto::ws::AnnounceBingoPayload,
            crate::dto::ws::UnoJoinPayload,
            crate::dto::ws::PlayCardPayload,
            crate::dto::ws::WildColorPayload,
            crate::dto::ws::ChatPayload,
            crate::dto::ws::KickPayload,
            crate::dto::ws::UnoResetPayload,
            crate::dto::ws::ErrorPayload,
            crate::dto::bingo::CardAssignedPayload,
            crate::dto::bingo::BallDrawnPayload,
            crate::dto::bingo::GameResetPayload,
            crate::dto::bingo::CardValidatedPayload,
            crate::dto::bingo::LineAnnouncedPayload,
            crate::dto::bingo::BingoAnnouncedPayload,
            crate::dto::bingo::GameStatePayload,
            crate::dto::bingo::PlayerJoinedPayload,
            crate::dto::uno::HandPayload,
            crate::dto::uno::SessionCreatedPayload,
            crate::dto::uno::ReconnectedPayload,
            crate::dto::uno::GameStartedPayload,
            crate::dto::uno::GameOverPayload,
            crate::dto::uno::UnoStatePayload,
            crate::dto::uno::ChatView,
            crate::dto::uno::KickedPayload,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "pages", description = "Player-facing helpers"),
        (name = "games", description = "WebSocket channel for both games"),
    )
)]
pub struct ApiDoc;
