use std::path::Path;

use axum::{Router, extract::State, response::Html, routing::get};
use tower_http::services::{ServeDir, ServeFile};

use crate::{error::AppError, state::SharedState};

/// Fixed page routes and the file under the public directory each one serves.
const PAGES: [(&str, &str); 6] = [
    ("/", "index.html"),
    ("/moderator", "moderator.html"),
    ("/display", "display.html"),
    ("/player", "player.html"),
    ("/unogame", "uno/display.html"),
    ("/unoplayer", "uno/player.html"),
];

#[utoipa::path(
    get,
    path = "/qr",
    tag = "pages",
    responses(
        (status = 200, description = "Image tag embedding the bingo player QR code", content_type = "text/html"),
        (status = 404, description = "QR code not rendered yet"),
        (status = 503, description = "Game dispatcher unavailable"),
    )
)]
/// Return an `<img>` tag with the QR code pointing at the bingo player page.
pub async fn qr_code(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    let url = state
        .hub()
        .bingo_qr()
        .await
        .map_err(|err| AppError::ServiceUnavailable(err.to_string()))?
        .ok_or_else(|| AppError::NotFound("QR code not available".into()))?;

    Ok(Html(format!(r#"<img src="{url}" alt="QR Code" />"#)))
}

/// Configure the HTML pages, the QR helper, and the static file fallback.
pub fn router(public_dir: &Path) -> Router<SharedState> {
    let router = PAGES.into_iter().fold(
        Router::<SharedState>::new().route("/qr", get(qr_code)),
        |router, (route, file)| router.route_service(route, ServeFile::new(public_dir.join(file))),
    );

    router.fallback_service(ServeDir::new(public_dir))
}
