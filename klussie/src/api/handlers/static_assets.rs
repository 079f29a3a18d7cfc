//! HTTP handlers for static asset serving.

use axum::{
    body::Body,
    extract::Path,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use crate::static_assets;

/// Serve an embedded asset from `/static/{*path}`.
#[instrument]
pub async fn serve_embedded_asset(Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/');

    let Some(content) = static_assets::Assets::get(path) else {
        debug!("No embedded asset at {}", path);
        return StatusCode::NOT_FOUND.into_response();
    };

    let mime = mime_guess::from_path(path).first_or_octet_stream();

    // The stylesheet changes with releases; icons and robots rarely do
    let cache_control = if path.ends_with(".css") {
        "public, max-age=300"
    } else {
        "public, max-age=86400"
    };

    (
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, cache_control.to_string()),
        ],
        Body::from(content.data.into_owned()),
    )
        .into_response()
}

/// `/robots.txt` and `/favicon.ico` are requested at the root by crawlers and browsers.
#[instrument]
pub async fn robots() -> Response {
    serve_embedded_asset(Path("robots.txt".to_string())).await
}

#[instrument]
pub async fn favicon() -> Response {
    serve_embedded_asset(Path("favicon.svg".to_string())).await
}
