//! QR codes pointing players at their join pages.

use base64::{Engine, engine::general_purpose::STANDARD};
use qrcode::{QrCode, render::svg};
use thiserror::Error;
use tracing::warn;

use crate::services::hub::{HubCommand, HubHandle, QrTarget};

const QR_SIZE: u32 = 256;

/// Errors raised while rendering a QR code.
#[derive(Debug, Error)]
pub enum QrError {
    /// The content does not fit in a QR code.
    #[error("failed to encode QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),
    /// The blocking render task panicked or was cancelled.
    #[error("QR render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Render `content` as an SVG QR code wrapped in a `data:` URL.
pub fn render_data_url(content: &str) -> Result<String, QrError> {
    let code = QrCode::new(content.as_bytes())?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .build();
    Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(image)))
}

/// Render the QR code for `url` off the async runtime and hand the result to
/// the hub.
pub fn spawn_render(hub: HubHandle, target: QrTarget, url: String) {
    tokio::spawn(async move {
        let rendered = tokio::task::spawn_blocking(move || render_data_url(&url))
            .await
            .map_err(QrError::from)
            .and_then(|result| result);

        match rendered {
            Ok(data_url) => {
                if hub
                    .send(HubCommand::QrReady {
                        target,
                        url: data_url,
                    })
                    .is_err()
                {
                    warn!(?target, "game dispatcher stopped before the QR code was stored");
                }
            }
            Err(err) => warn!(?target, error = %err, "failed to render QR code"),
        }
    });
}
