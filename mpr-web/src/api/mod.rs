//! HTTP API handlers for mpr-web

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

pub mod buildinfo;
pub mod health;
pub mod people;
pub mod tip_form;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use people::{get_person, get_totals, list_people, submit_tip};

/// JSON routes under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/pessoas", get(list_people))
        .route("/api/pessoas/:id", get(get_person))
        .route("/api/totais", get(get_totals))
        .route("/api/ocorrencias/:oco_id/informacoes", post(submit_tip))
        .route("/api/buildinfo", get(get_build_info))
}
