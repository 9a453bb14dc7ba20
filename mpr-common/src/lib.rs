//! # MPR Common Library
//!
//! Shared code for the missing-persons registry portal:
//! - Upstream wire models (Pessoa, Ocorrência, page envelopes)
//! - `ApiService`, the upstream REST client
//! - Local filter corrections and the offline mock dataset
//! - Tip form validation
//! - Configuration loading

pub mod api_service;
pub mod config;
pub mod error;
pub mod filters;
pub mod mock;
pub mod models;
pub mod validation;

pub use api_service::{ApiService, ClientConfig};
pub use error::{Error, Result};
