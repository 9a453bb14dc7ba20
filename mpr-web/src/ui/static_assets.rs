//! Static asset handlers
//!
//! Embeds and serves the stylesheet at compile time

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

const PORTAL_CSS: &str = include_str!("../../static/portal.css");

/// GET /static/portal.css
pub async fn serve_portal_css() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "text/css"),
            ("cache-control", "public, max-age=3600"),
        ],
        PORTAL_CSS,
    )
        .into_response()
}
