//! Registry JSON endpoints: listing, detail, totals and tip submission

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use mpr_common::models::{Person, PersonPage, Totals};
use mpr_common::validation::validate_tip;
use serde::Serialize;
use tracing::info;

use super::tip_form::{multipart_rejection, read_tip_form};
use crate::error::{ApiError, ApiResult};
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::params::ListingQuery;
use crate::AppState;

/// Largest page the JSON API will request from the registry
pub const MAX_API_PAGE_SIZE: i64 = 100;

/// Tip accepted response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TipAccepted {
    pub oco_id: i64,
    pub fotos: usize,
}

/// GET /api/pessoas
///
/// Unlike the HTML listing, malformed dates are rejected with 400.
pub async fn list_people(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> ApiResult<Json<PersonPage>> {
    let (filters, errors) = query.filters();
    if !errors.is_empty() {
        return Err(mpr_common::Error::Validation(errors).into());
    }

    let page = query.page_number().unwrap_or(0);
    let size = query
        .page_size()
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_API_PAGE_SIZE);

    let data = state.api.list_people(page, size, &filters).await?;
    Ok(Json(data))
}

/// GET /api/pessoas/:id
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Person>> {
    let id = parse_path_id(&id)?;
    state
        .api
        .person_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Pessoa {} não encontrada", id)))
}

/// GET /api/totais
pub async fn get_totals(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> ApiResult<Json<Totals>> {
    let (filters, errors) = query.filters();
    if !errors.is_empty() {
        return Err(mpr_common::Error::Validation(errors).into());
    }
    Ok(Json(state.api.totals(&filters).await?))
}

/// POST /api/ocorrencias/:oco_id/informacoes
pub async fn submit_tip(
    State(state): State<AppState>,
    Path(oco_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<TipAccepted>)> {
    let oco_id = parse_path_id(&oco_id)?;
    let multipart = multipart.map_err(multipart_rejection)?;
    let today = Local::now().date_naive();
    let form = read_tip_form(multipart, oco_id, today).await?;
    let tip = validate_tip(form.draft, today)?;

    state.api.submit_tip(&tip).await?;
    info!(oco_id, photos = tip.fotos.len(), "Tip forwarded via JSON API");

    Ok((
        StatusCode::CREATED,
        Json(TipAccepted {
            oco_id,
            fotos: tip.fotos.len(),
        }),
    ))
}

/// Numeric path segment; anything else is a 400 in the JSON envelope
fn parse_path_id(raw: &str) -> ApiResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Identificador inválido: {}", raw)))
}
