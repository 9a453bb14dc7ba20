//! Page shell and rendering helpers

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::NaiveDateTime;
use mpr_common::models::parse_upstream_datetime;

use crate::error::ApiError;

/// Escape text for HTML element content and quoted attributes
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `dd/mm/yyyy às HH:MM`
pub fn format_date_time(dt: NaiveDateTime) -> String {
    dt.format("%d/%m/%Y às %H:%M").to_string()
}

/// Format a registry datetime, or show it verbatim when unparseable
pub fn display_upstream_date(raw: &str) -> String {
    match parse_upstream_datetime(raw) {
        Some(dt) => format_date_time(dt),
        None if raw.trim().is_empty() => "Não informado".to_string(),
        None => escape(raw),
    }
}

/// Full HTML document around `body`
pub fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | Pessoas Desaparecidas</title>
    <link rel="stylesheet" href="/static/portal.css">
</head>
<body>
    <header>
        <div class="header-content">
            <div>
                <h1>Pessoas Desaparecidas</h1>
                <div class="subtitle">Polícia Judiciária Civil de Mato Grosso</div>
            </div>
            <nav>
                <a href="/">Início</a>
                <a href="/como-ajudar">Como ajudar</a>
            </nav>
        </div>
    </header>
    <main class="container">
{body}
    </main>
    <footer>
        Emergência: 197 &middot; mpr-web v{version} [{git_hash}]
    </footer>
</body>
</html>
"#,
        title = escape(title),
        body = body,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
    )
}

/// Error page for a failed request, with the user-facing message
pub fn error_page(err: &ApiError) -> Response {
    let (status, _, message) = err.parts();
    message_page(status, "Erro", &message)
}

pub fn message_page(status: StatusCode, title: &str, message: &str) -> Response {
    let body = format!(
        r#"        <div class="alert alert-error">{message}</div>
        <p><a class="button button-secondary" href="/">Voltar para a listagem</a></p>"#,
        message = escape(message),
    );
    (status, Html(page(title, &body))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape("JOANA DA SILVA"), "JOANA DA SILVA");
    }

    #[test]
    fn test_display_upstream_date() {
        assert_eq!(display_upstream_date("2025-04-02T22:22:00"), "02/04/2025 às 22:22");
        assert_eq!(display_upstream_date(""), "Não informado");
        assert_eq!(display_upstream_date("<ontem>"), "&lt;ontem&gt;");
    }
}
