//! Health check endpoints
//!
//! `/health` is a liveness check that never touches the registry.
//! `/api/health` probes the registry and answers 503 while it is down.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// Registry probe as reported by `/api/health`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamHealth {
    pub online: bool,
    pub response_time_ms: u64,
    pub last_checked: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealthResponse {
    /// "ok" or "degraded"
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub api: UpstreamHealth,
    pub environment: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "mpr-web".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/health
pub async fn api_health(State(state): State<AppState>) -> Response {
    let probe = state.api.check_status().await;

    let status = if probe.is_online {
        StatusCode::OK
    } else {
        warn!(error = ?probe.error, "Registry health probe failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = ApiHealthResponse {
        status: if probe.is_online { "ok" } else { "degraded" }.to_string(),
        timestamp: Utc::now(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        api: UpstreamHealth {
            online: probe.is_online,
            response_time_ms: probe.response_time_ms,
            last_checked: probe.last_checked,
            error: probe.error,
        },
        environment: environment().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (
        status,
        [
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        Json(body),
    )
        .into_response()
}

fn environment() -> &'static str {
    if cfg!(debug_assertions) {
        "development"
    } else {
        "production"
    }
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/health", get(api_health))
}
