//! Person detail page handler

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use mpr_common::models::Person;
use serde::Deserialize;
use tracing::warn;
use url::form_urlencoded;

use super::layout::{display_upstream_date, error_page, escape, message_page, page};
use super::listing::{age_label, photo_html};
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    pub enviado: Option<String>,
}

/// GET /pessoa/:id
pub async fn person_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Response {
    let Ok(id) = id.trim().parse::<i64>() else {
        return not_found();
    };

    match state.api.person_by_id(id).await {
        Ok(Some(person)) => {
            let submitted = query.enviado.as_deref() == Some("1");
            Html(page(&person.nome, &render_detail(&person, submitted))).into_response()
        }
        Ok(None) => not_found(),
        Err(e) => {
            warn!(id, error = %e, "Person lookup failed");
            error_page(&ApiError::from(e))
        }
    }
}

fn not_found() -> Response {
    message_page(StatusCode::NOT_FOUND, "Pessoa não encontrada", "Pessoa não encontrada")
}

/// Link to the tip form for this person's occurrence
pub fn tip_href(person: &Person) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("pessoaId", &person.id.to_string())
        .append_pair("pessoaNome", &person.nome)
        .finish();
    format!("/informar/{}?{}", person.ultima_ocorrencia.oco_id, query)
}

fn render_detail(person: &Person, submitted: bool) -> String {
    let occurrence = &person.ultima_ocorrencia;
    let located = occurrence.is_located();

    let notice = if submitted {
        r#"        <div class="alert alert-success">Informação enviada com sucesso! Obrigado por colaborar.</div>
"#
    } else {
        ""
    };

    let located_block = if located {
        format!(
            r#"                    <dt>Data da Localização</dt>
                    <dd>{}</dd>
                    <dt>Situação</dt>
                    <dd>{}</dd>
"#,
            display_upstream_date(occurrence.data_localizacao.as_deref().unwrap_or_default()),
            if occurrence.encontrado_vivo {
                "Encontrada viva"
            } else {
                "Encontrada sem vida"
            }
        )
    } else {
        String::new()
    };

    let interview = occurrence.ocorrencia_entrev_desap_dto.as_ref();
    let clothes = interview
        .map(|i| i.vestimentas_desaparecido.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or("Não informado");
    let extra_info = interview
        .and_then(|i| i.informacao.as_deref())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            format!(
                r#"            <section class="panel">
                <h2>Informações Adicionais</h2>
                <p>{}</p>
            </section>
"#,
                escape(v)
            )
        })
        .unwrap_or_default();

    format!(
        r#"{notice}        <p><a href="/">&laquo; Voltar para a listagem</a></p>
        <div class="detail">
            <aside class="panel">
                {photo}
                <p><span class="badge {badge_class}">{badge}</span></p>
                <h2>{nome}</h2>
                <p>{idade} &middot; {sexo}</p>
                <p><a class="button" href="{tip_href}">Enviar Informação</a></p>
                <p class="hint">Ajude com informações que possam ser úteis</p>
            </aside>
            <div>
            <section class="panel">
                <h2>Informações do Desaparecimento</h2>
                <dl>
                    <dt>Data do Desaparecimento</dt>
                    <dd>{data}</dd>
                    <dt>Local do Desaparecimento</dt>
                    <dd>{local}</dd>
{located_block}                    <dt>Vestimentas no Dia do Desaparecimento</dt>
                    <dd>{clothes}</dd>
                </dl>
            </section>
{extra_info}            <section class="panel">
                <h2>Dados da Ocorrência</h2>
                <dl>
                    <dt>Número da Ocorrência</dt>
                    <dd>{oco_id}</dd>
                    <dt>Status da Pessoa</dt>
                    <dd>{vivo}</dd>
                </dl>
            </section>
            <div class="alert alert-info">
                <strong>Importante:</strong> Se você possui informações sobre esta pessoa,
                entre em contato com a Polícia Civil do Estado de Mato Grosso através do
                telefone 197 ou utilize o botão "Enviar Informação".
            </div>
            </div>
        </div>
"#,
        notice = notice,
        photo = photo_html(person),
        badge_class = if located { "badge-located" } else { "badge-missing" },
        badge = if located {
            "PESSOA LOCALIZADA"
        } else {
            "PESSOA DESAPARECIDA"
        },
        nome = escape(&person.nome),
        idade = age_label(person),
        sexo = person.sexo.label(),
        tip_href = escape(&tip_href(person)),
        data = display_upstream_date(&occurrence.dt_desaparecimento),
        local = escape(&occurrence.local_desaparecimento_concat),
        located_block = located_block,
        clothes = escape(clothes),
        extra_info = extra_info,
        oco_id = occurrence.oco_id,
        vivo = if person.vivo { "Viva" } else { "Não confirmado" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpr_common::mock;

    #[test]
    fn test_tip_href_encodes_name() {
        let person = mock::find(2364).unwrap();
        assert_eq!(
            tip_href(&person),
            "/informar/1524?pessoaId=2364&pessoaNome=JOANA+DA+SILVA"
        );
    }

    #[test]
    fn test_detail_of_located_person() {
        let person = mock::find(2364).unwrap();
        let html = render_detail(&person, true);
        assert!(html.contains("PESSOA LOCALIZADA"));
        assert!(html.contains("Data da Localização"));
        assert!(html.contains("10/04/2025 às 10:00"));
        assert!(html.contains("Informações Adicionais"));
        assert!(html.contains("Informação enviada com sucesso"));
    }

    #[test]
    fn test_detail_of_missing_person() {
        let person = mock::find(2385).unwrap();
        let html = render_detail(&person, false);
        assert!(html.contains("PESSOA DESAPARECIDA"));
        assert!(!html.contains("Data da Localização"));
        assert!(!html.contains("Informações Adicionais"));
        assert!(html.contains("<dd>Não informado</dd>"));
    }
}
