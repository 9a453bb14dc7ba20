//! Multipart tip form decoding, shared by the HTML form and the JSON API

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use chrono::NaiveDate;
use mpr_common::models::Photo;
use mpr_common::validation::TipDraft;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Decoded form: the tip itself plus the person it is about
#[derive(Debug, Clone, Default)]
pub struct TipForm {
    pub draft: TipDraft,
    pub pessoa_id: Option<i64>,
    pub pessoa_nome: String,
}

/// Read every part of a tip form.
///
/// Photos may arrive as `files` (registry naming) or `fotos`; empty file
/// inputs are skipped. A blank date defaults to `today`.
pub async fn read_tip_form(
    mut multipart: Multipart,
    oco_id: i64,
    today: NaiveDate,
) -> ApiResult<TipForm> {
    let mut form = TipForm {
        draft: TipDraft {
            oco_id,
            ..Default::default()
        },
        ..Default::default()
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "files" || name == "fotos" {
            let file_name = field.file_name().unwrap_or("foto").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            if bytes.is_empty() {
                continue;
            }
            form.draft.fotos.push(Photo {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "informacao" => form.draft.informacao = value,
            "descricao" => form.draft.descricao = value,
            "data" => form.draft.data = value,
            "localizacao" => form.draft.localizacao = value,
            "telefone" => form.draft.telefone = value,
            "pessoaId" => form.pessoa_id = value.trim().parse().ok(),
            "pessoaNome" => form.pessoa_nome = value.trim().to_string(),
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    if form.draft.data.trim().is_empty() {
        form.draft.data = today.format("%Y-%m-%d").to_string();
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

/// Map a failed `Multipart` extraction (wrong content type, bad boundary)
pub fn multipart_rejection(rejection: MultipartRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(rejection.body_text())
    }
}
