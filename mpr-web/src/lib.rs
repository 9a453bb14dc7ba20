//! mpr-web library - Missing persons registry portal
//!
//! Server-rendered pages and a JSON API over the public registry. The
//! portal owns no storage; every request is answered through
//! [`mpr_common::ApiService`].

use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::Router;
use mpr_common::validation::{MAX_PHOTOS, MAX_PHOTO_BYTES};
use mpr_common::ApiService;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod pagination;
pub mod params;
pub mod ui;

/// Request body limit: five full-size photos plus the text fields
pub const MAX_BODY_BYTES: usize = MAX_PHOTOS * MAX_PHOTO_BYTES + 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Upstream registry client
    pub api: Arc<ApiService>,
    /// Process start, for the uptime reported by `/api/health`
    pub started_at: Instant,
}

impl AppState {
    pub fn new(api: ApiService) -> Self {
        Self {
            api: Arc::new(api),
            started_at: Instant::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(ui::ui_routes())
        .merge(api::api_routes())
        .merge(api::health_routes())
        .fallback(ui::not_found_page)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
