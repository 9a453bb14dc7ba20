//! UI Routes - server-rendered HTML pages
//!
//! # Structure
//! - **Static Assets** (`static_assets`): stylesheet serving
//! - **Layout** (`layout`): page shell, escaping and date formatting
//! - **Listing** (`listing`): search, filters, statistics and pagination
//! - **Person** (`person`): case detail
//! - **Tip** (`tip`): tip form and submission
//! - **Help** (`help`): "como ajudar" guidance and the 404 page

use axum::{routing::get, Router};

use crate::AppState;

mod help;
mod layout;
mod listing;
mod person;
mod static_assets;
mod tip;

pub use help::not_found_page;

use help::como_ajudar_page;
use listing::listing_page;
use person::person_page;
use static_assets::serve_portal_css;
use tip::{tip_form_page, tip_form_submit};

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        // Page routes
        .route("/", get(listing_page))
        .route("/pessoa/:id", get(person_page))
        .route("/informar/:oco_id", get(tip_form_page).post(tip_form_submit))
        .route("/como-ajudar", get(como_ajudar_page))
        // Static assets
        .route("/static/portal.css", get(serve_portal_css))
}
