//! Tip form page handlers
//!
//! Validation failures re-render the form with the typed values and one
//! message per field. A registry failure keeps the values too, so the
//! citizen can retry without retyping.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{Local, Months, NaiveDate};
use mpr_common::validation::{validate_tip, FieldError, TipDraft, MAX_PHOTOS, MAX_TIP_CHARS};
use serde::Deserialize;
use tracing::{info, warn};

use super::layout::{error_page, escape, message_page, page};
use crate::api::tip_form::{multipart_rejection, read_tip_form, TipForm};
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipQuery {
    pub pessoa_id: Option<String>,
    pub pessoa_nome: Option<String>,
}

/// GET /informar/:oco_id
pub async fn tip_form_page(Path(oco_id): Path<String>, Query(query): Query<TipQuery>) -> Response {
    let Some(oco_id) = parse_id(&oco_id) else {
        return invalid_occurrence();
    };
    let today = Local::now().date_naive();

    let form = TipForm {
        draft: TipDraft {
            oco_id,
            data: today.format("%Y-%m-%d").to_string(),
            ..Default::default()
        },
        pessoa_id: query.pessoa_id.as_deref().and_then(parse_id),
        pessoa_nome: query.pessoa_nome.unwrap_or_default().trim().to_string(),
    };

    Html(render_form(&form, &[], None, today)).into_response()
}

/// POST /informar/:oco_id
pub async fn tip_form_submit(
    State(state): State<AppState>,
    Path(oco_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let Some(oco_id) = parse_id(&oco_id) else {
        return invalid_occurrence();
    };
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => return error_page(&multipart_rejection(rejection)),
    };
    let today = Local::now().date_naive();

    let form = match read_tip_form(multipart, oco_id, today).await {
        Ok(form) => form,
        Err(e) => return error_page(&e),
    };

    let tip = match validate_tip(form.draft.clone(), today) {
        Ok(tip) => tip,
        Err(e) => {
            let err = ApiError::from(e);
            let html = render_form(&form, err.field_errors(), None, today);
            return (StatusCode::BAD_REQUEST, Html(html)).into_response();
        }
    };

    match state.api.submit_tip(&tip).await {
        Ok(()) => {
            info!(oco_id, pessoa_id = ?form.pessoa_id, "Tip submitted from form");
            let target = match form.pessoa_id {
                Some(id) => format!("/pessoa/{}?enviado=1", id),
                None => "/?enviado=1".to_string(),
            };
            Redirect::to(&target).into_response()
        }
        Err(e) => {
            warn!(oco_id, error = %e, "Tip submission failed");
            let err = ApiError::from(e);
            let (status, _, message) = err.parts();
            let html = render_form(&form, &[], Some(&message), today);
            (status, Html(html)).into_response()
        }
    }
}

fn parse_id(value: &str) -> Option<i64> {
    value.trim().parse().ok().filter(|id: &i64| *id > 0)
}

fn invalid_occurrence() -> Response {
    message_page(
        StatusCode::NOT_FOUND,
        "Ocorrência inválida",
        "Ocorrência não encontrada",
    )
}

fn field_error_html(errors: &[FieldError], field: &str) -> String {
    errors
        .iter()
        .filter(|e| e.field == field)
        .map(|e| format!("<div class=\"field-error\">{}</div>", escape(&e.message)))
        .collect()
}

fn render_form(
    form: &TipForm,
    errors: &[FieldError],
    failure: Option<&str>,
    today: NaiveDate,
) -> String {
    let draft = &form.draft;
    let min_date = today.checked_sub_months(Months::new(12)).unwrap_or(today);

    let about = if form.pessoa_nome.is_empty() {
        String::new()
    } else {
        format!("<p>Sobre: <strong>{}</strong></p>", escape(&form.pessoa_nome))
    };
    let back = match form.pessoa_id {
        Some(id) => format!("/pessoa/{}", id),
        None => "/".to_string(),
    };
    let failure = failure
        .map(|m| format!("        <div class=\"alert alert-error\">{}</div>\n", escape(m)))
        .unwrap_or_default();
    let summary = if errors.is_empty() {
        String::new()
    } else {
        "        <div class=\"alert alert-error\">Corrija os campos destacados e envie novamente.</div>\n"
            .to_string()
    };

    let body = format!(
        r#"        <p><a href="{back}">&laquo; Voltar</a></p>
{failure}{summary}        <section class="panel">
            <h2>Enviar Informação</h2>
            {about}
            <form method="post" action="/informar/{oco_id}" enctype="multipart/form-data">
                <input type="hidden" name="pessoaId" value="{pessoa_id}">
                <input type="hidden" name="pessoaNome" value="{pessoa_nome}">
                <div class="field">
                    <label for="informacao">O que você viu? *</label>
                    <textarea id="informacao" name="informacao" rows="6" maxlength="{max_chars}" required>{informacao}</textarea>
                    <div class="hint">Descreva quando, onde e em que circunstâncias (até {max_chars} caracteres).</div>
                    {err_informacao}
                </div>
                <div class="field">
                    <label for="data">Data em que a pessoa foi vista *</label>
                    <input id="data" name="data" type="date" value="{data}" min="{min_date}" max="{today}" required>
                    {err_data}
                </div>
                <div class="field">
                    <label for="localizacao">Local onde a pessoa foi vista</label>
                    <input id="localizacao" name="localizacao" type="text" value="{localizacao}">
                </div>
                <div class="field">
                    <label for="telefone">Telefone para contato</label>
                    <input id="telefone" name="telefone" type="tel" value="{telefone}" placeholder="(65) 99999-9999">
                    {err_telefone}
                </div>
                <div class="field">
                    <label for="fotos">Fotos (até {max_photos}, JPG, PNG ou GIF, máximo 5MB cada)</label>
                    <input id="fotos" name="files" type="file" accept="image/jpeg,image/png,image/gif" multiple>
                    {err_fotos}
                </div>
                <div class="field">
                    <label for="descricao">Descrição das fotos</label>
                    <input id="descricao" name="descricao" type="text" value="{descricao}">
                </div>
                <button class="button" type="submit">Enviar Informação</button>
            </form>
        </section>
        <div class="alert alert-info">
            <strong>Importante:</strong> Em caso de urgência, ligue imediatamente para <strong>197</strong>.
        </div>
"#,
        back = back,
        failure = failure,
        summary = summary,
        about = about,
        oco_id = draft.oco_id,
        pessoa_id = form.pessoa_id.map(|id| id.to_string()).unwrap_or_default(),
        pessoa_nome = escape(&form.pessoa_nome),
        max_chars = MAX_TIP_CHARS,
        informacao = escape(&draft.informacao),
        err_informacao = field_error_html(errors, "informacao"),
        data = escape(&draft.data),
        min_date = min_date.format("%Y-%m-%d"),
        today = today.format("%Y-%m-%d"),
        err_data = field_error_html(errors, "data"),
        localizacao = escape(&draft.localizacao),
        telefone = escape(&draft.telefone),
        err_telefone = field_error_html(errors, "telefone"),
        max_photos = MAX_PHOTOS,
        err_fotos = field_error_html(errors, "fotos"),
        descricao = escape(&draft.descricao),
    );

    page("Enviar Informação", &body)
}
