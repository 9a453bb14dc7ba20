//! Listing URL state
//!
//! The listing is fully described by its query string: `page` (0-based),
//! `size`, `nome`, `status`, `sexo`, `dataDe` and `dataAte`. Canonical links
//! omit values equal to their defaults. The JSON API additionally accepts
//! the registry spellings (`pagina`, `porPagina`, `dataDesaparecimentoDe`,
//! `dataDesaparecimentoAte`).

use mpr_common::models::{SearchFilters, Sex, StatusFilter};
use mpr_common::validation::{parse_optional_date, FieldError};
use serde::Deserialize;
use url::form_urlencoded;

use crate::api::people::MAX_API_PAGE_SIZE;
use crate::pagination::{normalize_page_size, DEFAULT_PAGE_SIZE};

/// Highest page accepted; keeps `page * size` within range
pub const MAX_PAGE: i64 = i64::MAX / MAX_API_PAGE_SIZE;

/// Raw listing query. Everything is a string so malformed values can be
/// reported (or ignored) instead of rejecting the request outright.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub page: Option<String>,
    pub size: Option<String>,
    pub nome: Option<String>,
    pub status: Option<String>,
    pub sexo: Option<String>,
    pub data_de: Option<String>,
    pub data_ate: Option<String>,
    pub pagina: Option<String>,
    pub por_pagina: Option<String>,
    pub data_desaparecimento_de: Option<String>,
    pub data_desaparecimento_ate: Option<String>,
    /// Set after a successful tip submission
    pub enviado: Option<String>,
}

impl ListingQuery {
    pub fn page_number(&self) -> Option<i64> {
        parse_int(self.page.as_deref().or(self.pagina.as_deref()))
            .filter(|p| *p >= 0)
            .map(|p| p.min(MAX_PAGE))
    }

    pub fn page_size(&self) -> Option<i64> {
        parse_int(self.size.as_deref().or(self.por_pagina.as_deref()))
    }

    /// Filters plus whatever could not be parsed
    pub fn filters(&self) -> (SearchFilters, Vec<FieldError>) {
        let mut errors = Vec::new();

        let data_de = self.data_de.as_deref().or(self.data_desaparecimento_de.as_deref());
        let data_ate = self
            .data_ate
            .as_deref()
            .or(self.data_desaparecimento_ate.as_deref());

        let mut date = |field: &str, value: Option<&str>| match parse_optional_date(field, value) {
            Ok(d) => d,
            Err(e) => {
                errors.push(e);
                None
            }
        };
        let data_desaparecimento_de = date("dataDe", data_de);
        let data_desaparecimento_ate = date("dataAte", data_ate);

        let filters = SearchFilters {
            nome: self
                .nome
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            status: self.status.as_deref().and_then(StatusFilter::parse),
            sexo: self.sexo.as_deref().and_then(Sex::parse),
            data_desaparecimento_de,
            data_desaparecimento_ate,
        };

        (filters, errors)
    }

    pub fn submitted(&self) -> bool {
        self.enviado.as_deref() == Some("1")
    }
}

/// Normalized listing state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingState {
    pub page: i64,
    pub size: i64,
    pub filters: SearchFilters,
}

impl ListingState {
    /// Lenient parse used by the HTML listing: bad values fall back to
    /// defaults and bad dates are reported alongside
    pub fn from_query(query: &ListingQuery) -> (Self, Vec<FieldError>) {
        let (filters, errors) = query.filters();
        let state = Self {
            page: query.page_number().unwrap_or(0),
            size: normalize_page_size(query.page_size()),
            filters,
        };
        (state, errors)
    }

    pub fn with_page(&self, page: i64) -> Self {
        Self {
            page: page.max(0),
            ..self.clone()
        }
    }

    /// Changing the page size starts over from the first page
    pub fn with_size(&self, size: i64) -> Self {
        Self {
            page: 0,
            size: normalize_page_size(Some(size)),
            ..self.clone()
        }
    }

    /// Query string without defaults (may be empty)
    pub fn query_string(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        if self.page > 0 {
            out.append_pair("page", &self.page.to_string());
        }
        if self.size != DEFAULT_PAGE_SIZE {
            out.append_pair("size", &self.size.to_string());
        }
        for (key, value) in self.filter_pairs() {
            out.append_pair(key, &value);
        }
        out.finish()
    }

    /// Link to this state on the listing page
    pub fn href(&self) -> String {
        let query = self.query_string();
        if query.is_empty() {
            "/".to_string()
        } else {
            format!("/?{}", query)
        }
    }

    /// Non-empty filters as portal query pairs
    pub fn filter_pairs(&self) -> Vec<(&'static str, String)> {
        let f = &self.filters;
        let mut pairs = Vec::new();
        if let Some(nome) = f.name() {
            pairs.push(("nome", nome.to_string()));
        }
        if let Some(status) = f.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(sexo) = f.sexo {
            pairs.push(("sexo", sexo.as_str().to_string()));
        }
        if let Some(de) = f.data_desaparecimento_de {
            pairs.push(("dataDe", de.format("%Y-%m-%d").to_string()));
        }
        if let Some(ate) = f.data_desaparecimento_ate {
            pairs.push(("dataAte", ate.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

fn parse_int(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn query(pairs: &[(&str, &str)]) -> ListingQuery {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        parse_query(&encoded)
    }

    fn parse_query(s: &str) -> ListingQuery {
        let pairs: Vec<(String, String)> = form_urlencoded::parse(s.as_bytes()).into_owned().collect();
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    #[test]
    fn test_page_number_is_capped() {
        let q = query(&[("page", "9223372036854775807")]);
        assert_eq!(q.page_number(), Some(MAX_PAGE));
        assert_eq!(query(&[("page", "-1")]).page_number(), None);
        assert_eq!(query(&[("pagina", "4")]).page_number(), Some(4));
    }

    #[test]
    fn test_defaults_produce_bare_link() {
        let (state, errors) = ListingState::from_query(&ListingQuery::default());
        assert!(errors.is_empty());
        assert_eq!(state.page, 0);
        assert_eq!(state.size, DEFAULT_PAGE_SIZE);
        assert_eq!(state.href(), "/");
    }

    #[test]
    fn test_full_state_round_trips_through_link() {
        let q = query(&[
            ("page", "3"),
            ("size", "20"),
            ("nome", "Maria José"),
            ("status", "localizado"),
            ("sexo", "FEMININO"),
            ("dataDe", "2025-01-01"),
            ("dataAte", "2025-02-01"),
        ]);
        let (state, errors) = ListingState::from_query(&q);
        assert!(errors.is_empty());
        assert_eq!(state.page, 3);
        assert_eq!(state.size, 20);
        assert_eq!(state.filters.status, Some(StatusFilter::Localizado));
        assert_eq!(state.filters.sexo, Some(Sex::Feminino));
        assert_eq!(
            state.filters.data_desaparecimento_ate,
            NaiveDate::from_ymd_opt(2025, 2, 1)
        );

        let href = state.href();
        assert_eq!(
            href,
            "/?page=3&size=20&nome=Maria+Jos%C3%A9&status=localizado&sexo=FEMININO&dataDe=2025-01-01&dataAte=2025-02-01"
        );

        let reparsed = ListingState::from_query(&parse_query(&href[2..])).0;
        assert_eq!(reparsed, state);
    }

    #[test]
    fn test_todos_and_garbage_mean_no_filter() {
        let q = query(&[
            ("status", "todos"),
            ("sexo", "todos"),
            ("page", "-4"),
            ("size", "7"),
            ("nome", "   "),
        ]);
        let (state, errors) = ListingState::from_query(&q);
        assert!(errors.is_empty());
        assert!(state.filters.is_empty());
        assert_eq!(state.page, 0);
        assert_eq!(state.size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_bad_dates_reported_and_dropped() {
        let q = query(&[("dataDe", "01/02/2025"), ("dataAte", "2025-02-30")]);
        let (state, errors) = ListingState::from_query(&q);
        assert!(!state.filters.has_date_range());
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["dataDe", "dataAte"]);
    }

    #[test]
    fn test_registry_spellings_accepted() {
        let q = query(&[
            ("pagina", "2"),
            ("porPagina", "50"),
            ("dataDesaparecimentoDe", "2024-12-01"),
        ]);
        assert_eq!(q.page_number(), Some(2));
        assert_eq!(q.page_size(), Some(50));
        assert_eq!(
            q.filters().0.data_desaparecimento_de,
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
    }

    #[test]
    fn test_size_change_resets_page() {
        let state = ListingState {
            page: 4,
            size: 10,
            filters: SearchFilters::default(),
        };
        let resized = state.with_size(50);
        assert_eq!(resized.page, 0);
        assert_eq!(resized.href(), "/?size=50");
        assert_eq!(state.with_page(1).href(), "/?page=1");
    }
}
