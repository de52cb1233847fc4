/// Bingo command handlers.
pub mod bingo_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Dispatcher owning the game stores.
pub mod hub;
/// QR code rendering.
pub mod qr_service;
/// Card-game command handlers.
pub mod uno_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
