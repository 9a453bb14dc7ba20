//! Listing page handler - search, filters, statistics and pagination

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use chrono::{Local, NaiveDateTime};
use mpr_common::models::{PageStatistics, Person, PersonPage, Sex, StatusFilter};
use mpr_common::validation::FieldError;
use tracing::warn;

use super::layout::{display_upstream_date, error_page, escape, page};
use crate::error::ApiError;
use crate::pagination::{page_window, PageSlot, PAGE_SIZES};
use crate::params::{ListingQuery, ListingState};
use crate::AppState;

/// GET /
pub async fn listing_page(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let (listing, date_errors) = ListingState::from_query(&query);

    match state
        .api
        .list_people(listing.page, listing.size, &listing.filters)
        .await
    {
        Ok(data) => {
            let now = Local::now().naive_local();
            let body = render_listing(&listing, &data, &date_errors, query.submitted(), now);
            Html(page("Início", &body)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Listing failed");
            error_page(&ApiError::from(e))
        }
    }
}

fn render_listing(
    listing: &ListingState,
    data: &PersonPage,
    date_errors: &[FieldError],
    submitted: bool,
    now: NaiveDateTime,
) -> String {
    let mut html = String::new();

    if submitted {
        html.push_str(
            r#"        <div class="alert alert-success">Informação enviada com sucesso! Obrigado por colaborar.</div>
"#,
        );
    }
    for err in date_errors {
        html.push_str(&format!(
            "        <div class=\"alert alert-error\">{}</div>\n",
            escape(&err.message)
        ));
    }

    html.push_str(&render_filter_form(listing));
    html.push_str(&render_statistics(&PageStatistics::from_page(data)));

    html.push_str(&format!(
        "        <p class=\"hint\">{} de {} registros</p>\n",
        data.content.len(),
        data.total_elements
    ));

    if data.content.is_empty() {
        html.push_str(&format!(
            r#"        <div class="panel">
            <h2>Nenhuma pessoa encontrada</h2>
            <p>Tente ajustar os filtros de busca.</p>
            <p><a class="button button-secondary" href="{}">Limpar filtros</a></p>
        </div>
"#,
            escape(&cleared(listing).href())
        ));
    } else {
        html.push_str("        <div class=\"cards\">\n");
        for person in &data.content {
            html.push_str(&render_card(person, now));
        }
        html.push_str("        </div>\n");
    }

    html.push_str(&render_pagination(listing, data.total_pages));
    html
}

/// Same page size, no filters
fn cleared(listing: &ListingState) -> ListingState {
    ListingState {
        page: 0,
        size: listing.size,
        filters: Default::default(),
    }
}

fn selected(is: bool) -> &'static str {
    if is {
        " selected"
    } else {
        ""
    }
}

fn render_filter_form(listing: &ListingState) -> String {
    let f = &listing.filters;
    let date = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };

    format!(
        r#"        <form class="filters" method="get" action="/">
            <div>
                <label for="nome">Nome</label>
                <input id="nome" name="nome" type="search" value="{nome}" placeholder="Buscar por nome">
            </div>
            <div>
                <label for="status">Status</label>
                <select id="status" name="status">
                    <option value="todos">Todos</option>
                    <option value="desaparecido"{st_missing}>Desaparecidas</option>
                    <option value="localizado"{st_located}>Localizadas</option>
                </select>
            </div>
            <div>
                <label for="sexo">Sexo</label>
                <select id="sexo" name="sexo">
                    <option value="todos">Todos</option>
                    <option value="MASCULINO"{sx_m}>Masculino</option>
                    <option value="FEMININO"{sx_f}>Feminino</option>
                </select>
            </div>
            <div>
                <label for="dataDe">Desaparecimento de</label>
                <input id="dataDe" name="dataDe" type="date" value="{data_de}">
            </div>
            <div>
                <label for="dataAte">Desaparecimento até</label>
                <input id="dataAte" name="dataAte" type="date" value="{data_ate}">
            </div>
            <input type="hidden" name="size" value="{size}">
            <div>
                <button class="button" type="submit">Buscar</button>
                <a class="button button-secondary" href="{clear}">Limpar</a>
            </div>
        </form>
"#,
        nome = escape(f.name().unwrap_or_default()),
        st_missing = selected(f.status == Some(StatusFilter::Desaparecido)),
        st_located = selected(f.status == Some(StatusFilter::Localizado)),
        sx_m = selected(f.sexo == Some(Sex::Masculino)),
        sx_f = selected(f.sexo == Some(Sex::Feminino)),
        data_de = date(f.data_desaparecimento_de),
        data_ate = date(f.data_desaparecimento_ate),
        size = listing.size,
        clear = escape(&cleared(listing).href()),
    )
}

fn render_statistics(stats: &PageStatistics) -> String {
    format!(
        r#"        <div class="stats">
            <div class="stat"><div>Total de registros</div><div class="stat-value">{total}</div></div>
            <div class="stat stat-missing"><div>Desaparecidas nesta página</div><div class="stat-value">{missing}</div></div>
            <div class="stat stat-located"><div>Localizadas nesta página</div><div class="stat-value">{located}</div></div>
        </div>
"#,
        total = stats.total,
        missing = stats.desaparecidas,
        located = stats.localizadas,
    )
}

/// Initials shown when a person has no photo
fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .take(2)
        .collect::<String>()
        .to_uppercase()
}

pub(super) fn photo_html(person: &Person) -> String {
    match person.url_foto.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => format!(
            r#"<img src="{}" alt="Foto de {}" loading="lazy">"#,
            escape(url),
            escape(&person.nome)
        ),
        None => format!(
            r#"<div class="photo-placeholder">{}</div>"#,
            escape(&initials(&person.nome))
        ),
    }
}

pub(super) fn age_label(person: &Person) -> String {
    if person.idade > 0 {
        format!("{} anos", person.idade)
    } else {
        "Idade não informada".to_string()
    }
}

fn render_card(person: &Person, now: NaiveDateTime) -> String {
    let occurrence = &person.ultima_ocorrencia;
    let (badge_class, badge) = if occurrence.is_located() {
        ("badge-located", "Localizada")
    } else {
        ("badge-missing", "Desaparecida")
    };

    let days = match person.days_missing(now) {
        _ if occurrence.is_located() => String::new(),
        Some(1) => "<div class=\"hint\">Há 1 dia</div>".to_string(),
        Some(d) => format!("<div class=\"hint\">Há {} dias</div>", d),
        None => String::new(),
    };

    let clothes = occurrence
        .ocorrencia_entrev_desap_dto
        .as_ref()
        .map(|i| i.vestimentas_desaparecido.trim())
        .filter(|v| !v.is_empty())
        .map(|v| format!("<div><strong>Vestimentas:</strong> {}</div>", escape(v)))
        .unwrap_or_default();

    format!(
        r#"            <a class="card" href="/pessoa/{id}">
                {photo}
                <div class="card-body">
                    <span class="badge {badge_class}">{badge}</span>
                    <h3>{nome}</h3>
                    <div>{idade} &middot; {sexo}</div>
                    {days}
                    <div><strong>Data do Desaparecimento:</strong> {data}</div>
                    <div><strong>Local:</strong> {local}</div>
                    {clothes}
                </div>
            </a>
"#,
        id = person.id,
        photo = photo_html(person),
        badge_class = badge_class,
        badge = badge,
        nome = escape(&person.nome),
        idade = age_label(person),
        sexo = person.sexo.label(),
        days = days,
        data = display_upstream_date(&occurrence.dt_desaparecimento),
        local = escape(&occurrence.local_desaparecimento_concat),
        clothes = clothes,
    )
}

fn render_pagination(listing: &ListingState, total_pages: i64) -> String {
    let mut html = String::from("        <nav class=\"pagination\">\n            <div>Itens por página: ");

    for size in PAGE_SIZES {
        if size == listing.size {
            html.push_str(&format!("<span class=\"current\">{}</span>", size));
        } else {
            html.push_str(&format!(
                "<a href=\"{}\">{}</a>",
                escape(&listing.with_size(size).href()),
                size
            ));
        }
    }
    html.push_str("</div>\n");

    if total_pages > 1 {
        html.push_str("            <div>");
        if listing.page > 0 {
            html.push_str(&format!(
                "<a href=\"{}\">&laquo; Anterior</a>",
                escape(&listing.with_page(listing.page - 1).href())
            ));
        } else {
            html.push_str("<span class=\"disabled\">&laquo; Anterior</span>");
        }

        for slot in page_window(listing.page, total_pages) {
            match slot {
                PageSlot::Ellipsis => html.push_str("<span>&hellip;</span>"),
                PageSlot::Page(p) if p == listing.page => {
                    html.push_str(&format!("<span class=\"current\">{}</span>", p + 1))
                }
                PageSlot::Page(p) => html.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    escape(&listing.with_page(p).href()),
                    p + 1
                )),
            }
        }

        let next = listing.page.saturating_add(1);
        if next < total_pages {
            html.push_str(&format!(
                "<a href=\"{}\">Próxima &raquo;</a>",
                escape(&listing.with_page(next).href())
            ));
        } else {
            html.push_str("<span class=\"disabled\">Próxima &raquo;</span>");
        }
        html.push_str("</div>\n");
    }

    html.push_str("        </nav>\n");
    html
}
