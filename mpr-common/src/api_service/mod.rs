//! ApiService: client for the public missing-persons registry API
//!
//! Besides plain fetching, this layer compensates for registry
//! inconsistencies: listings filtered by `LOCALIZADO` or by date are
//! re-filtered locally and their totals recounted, and registry-wide totals
//! are aggregated by paging through located records. When the mock fallback
//! is enabled, listing and totals answer from the built-in dataset instead of
//! failing.

use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, USER_AGENT};
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_MS};
use crate::error::{Error, Result};
use crate::filters::{apply_local_filters, apply_mock_filters, needs_local_filtering};
use crate::mock;
use crate::models::{
    ApiStatus, Person, PersonPage, SearchFilters, StatusFilter, Totals, TipSubmission,
};
use crate::validation::FieldError;

mod http;

use http::{HttpBackend, Query};

const USER_AGENT_VALUE: &str = concat!("mpr/", env!("CARGO_PKG_VERSION"));

const PEOPLE_PATH: &str = "/v1/pessoas/aberto/filtro";
const TIP_PATH: &str = "/v1/ocorrencias/informacoes-desaparecido";

/// Page size used when paging located records for totals
const TOTALS_PAGE_SIZE: i64 = 50;
/// Batch scanned when the by-id endpoint fails
const LOOKUP_BATCH_SIZE: i64 = 50;

/// Upstream client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Listing, detail and totals requests
    pub timeout: Duration,
    pub submit_timeout: Duration,
    pub status_timeout: Duration,
    /// Answer from the mock dataset when the registry fails
    pub use_mock: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_API_TIMEOUT_MS),
            submit_timeout: Duration::from_secs(20),
            status_timeout: Duration::from_secs(5),
            use_mock: false,
        }
    }
}

impl ClientConfig {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_mock(mut self, use_mock: bool) -> Self {
        self.use_mock = use_mock;
        self
    }
}

/// Registry API client
#[derive(Debug, Clone)]
pub struct ApiService {
    http: HttpBackend,
    config: ClientConfig,
}

impl ApiService {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        default_headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            http: HttpBackend { client, base_url },
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.http.base_url
    }

    pub fn mock_enabled(&self) -> bool {
        self.config.use_mock
    }

    /// One page of the registry listing, corrected for filters the
    /// registry does not honour
    pub async fn list_people(
        &self,
        page: i64,
        size: i64,
        filters: &SearchFilters,
    ) -> Result<PersonPage> {
        let page = page.max(0);
        let size = size.max(1);

        match self.fetch_people(page, size, filters).await {
            Ok(data) => Ok(data),
            Err(e) if self.config.use_mock => {
                warn!(error = %e, "Registry listing failed, answering from mock");
                Ok(mock_page(page, size, filters))
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_people(
        &self,
        page: i64,
        size: i64,
        filters: &SearchFilters,
    ) -> Result<PersonPage> {
        let query = listing_query(page, size, filters, filters.status);
        let data: PersonPage = self
            .http
            .get_json(PEOPLE_PATH, &query, self.config.timeout)
            .await?;

        if !needs_local_filtering(filters) {
            return Ok(data);
        }

        let filtered = apply_local_filters(&data.content, filters);
        let total = match self.recount(size, filters, data.total_elements).await {
            Ok(count) => count,
            Err(e) => {
                let removed = (data.content.len() - filtered.len()) as i64;
                debug!(error = %e, removed, "Recount failed, adjusting from current page only");
                (data.total_elements - removed).max(0)
            }
        };

        debug!(
            upstream_total = data.total_elements,
            corrected_total = total,
            "Applied local filter correction"
        );

        Ok(PersonPage {
            total_elements: total,
            total_pages: pages_for(total, size),
            number_of_elements: filtered.len() as i64,
            content: filtered,
            ..data
        })
    }

    /// Fetch the whole filtered set in one request and count what survives
    /// the local correction
    async fn recount(&self, size: i64, filters: &SearchFilters, upstream_total: i64) -> Result<i64> {
        let query = listing_query(0, upstream_total.max(size), filters, filters.status);
        let all: PersonPage = self
            .http
            .get_json(PEOPLE_PATH, &query, self.config.timeout)
            .await?;
        Ok(apply_local_filters(&all.content, filters).len() as i64)
    }

    /// Registry-wide missing / located counters for the given filters.
    ///
    /// The status filter is ignored; both counters are always computed.
    pub async fn totals(&self, filters: &SearchFilters) -> Result<Totals> {
        match self.fetch_totals(filters).await {
            Ok(totals) => Ok(totals),
            Err(e) if self.config.use_mock => {
                warn!(error = %e, "Registry totals failed, answering from mock");
                Ok(mock_totals(filters))
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_totals(&self, filters: &SearchFilters) -> Result<Totals> {
        let timeout = self.config.timeout;

        let all: PersonPage = self
            .http
            .get_json(PEOPLE_PATH, &listing_query(0, 1, filters, None), timeout)
            .await?;

        let located_head: PersonPage = self
            .http
            .get_json(
                PEOPLE_PATH,
                &listing_query(0, 1, filters, Some(StatusFilter::Localizado)),
                timeout,
            )
            .await?;

        let pages = pages_for(located_head.total_elements, TOTALS_PAGE_SIZE);
        let mut located = 0i64;
        for page in 0..pages {
            let query = listing_query(page, TOTALS_PAGE_SIZE, filters, Some(StatusFilter::Localizado));
            let data: PersonPage = self.http.get_json(PEOPLE_PATH, &query, timeout).await?;
            located += data
                .content
                .iter()
                .filter(|p| p.ultima_ocorrencia.is_located())
                .count() as i64;
        }

        info!(
            total = all.total_elements,
            located_upstream = located_head.total_elements,
            located,
            pages,
            "Computed registry totals"
        );

        Ok(Totals {
            desaparecidas: (all.total_elements - located).max(0),
            localizadas: located,
        })
    }

    /// Look a person up by id.
    ///
    /// Tries the by-id endpoint, then scans the first listing batch, then
    /// (with the mock enabled) the mock dataset. Only timeouts abort the
    /// chain; every other failure moves on to the next source.
    pub async fn person_by_id(&self, id: i64) -> Result<Option<Person>> {
        let timeout = self.config.timeout;

        match self
            .http
            .get_json::<Person>(&format!("/v1/pessoas/{}", id), &[], timeout)
            .await
        {
            Ok(person) => return Ok(Some(person)),
            Err(Error::Timeout) => return Err(Error::Timeout),
            Err(e) => debug!(id, error = %e, "Direct lookup failed, scanning batch"),
        }

        let batch_query: Query = vec![
            ("pagina", "0".to_string()),
            ("porPagina", LOOKUP_BATCH_SIZE.to_string()),
        ];
        match self
            .http
            .get_json::<PersonPage>(PEOPLE_PATH, &batch_query, timeout)
            .await
        {
            Ok(page) => {
                if let Some(person) = page.content.into_iter().find(|p| p.id == id) {
                    return Ok(Some(person));
                }
            }
            Err(Error::Timeout) => return Err(Error::Timeout),
            Err(e) => debug!(id, error = %e, "Batch lookup failed"),
        }

        if self.config.use_mock {
            return Ok(mock::find(id));
        }
        Ok(None)
    }

    /// Send a tip to investigators.
    ///
    /// Text fields travel in the query string; the body is multipart with
    /// zero or more `files` parts (an empty multipart when there are none).
    pub async fn submit_tip(&self, tip: &TipSubmission) -> Result<()> {
        let submission_id = Uuid::new_v4();

        let query: Query = vec![
            ("informacao", tip.composed_text()),
            ("descricao", tip.descricao.clone()),
            ("data", tip.data.format("%Y-%m-%d").to_string()),
            ("ocoId", tip.oco_id.to_string()),
        ];

        let mut form = Form::new();
        for photo in &tip.fotos {
            let part = Part::bytes(photo.bytes.clone())
                .file_name(photo.file_name.clone())
                .mime_str(&photo.content_type)
                .map_err(|e| {
                    Error::Validation(vec![FieldError::new(
                        "fotos",
                        format!("Tipo de arquivo inválido em {}: {}", photo.file_name, e),
                    )])
                })?;
            form = form.part("files", part);
        }

        info!(
            submission_id = %submission_id,
            oco_id = tip.oco_id,
            photos = tip.fotos.len(),
            "Submitting tip"
        );

        match self
            .http
            .post_multipart(TIP_PATH, &query, form, self.config.submit_timeout)
            .await
        {
            Ok(()) => {
                info!(submission_id = %submission_id, "Tip accepted by registry");
                Ok(())
            }
            Err(e) => {
                warn!(submission_id = %submission_id, error = %e, "Tip submission failed");
                Err(e)
            }
        }
    }

    /// Probe the registry with the cheapest listing request. Never fails.
    pub async fn check_status(&self) -> ApiStatus {
        let started = Instant::now();
        let query: Query = vec![("pagina", "0".to_string()), ("porPagina", "1".to_string())];

        let outcome = self
            .http
            .get(PEOPLE_PATH, &query, self.config.status_timeout)
            .await;
        let response_time_ms = started.elapsed().as_millis() as u64;

        let error = match outcome {
            Ok(response) if response.status().is_success() => None,
            Ok(response) => Some(format!("HTTP {}", response.status().as_u16())),
            Err(Error::Timeout) => Some("Timeout".to_string()),
            Err(e) => Some(e.to_string()),
        };

        ApiStatus {
            is_online: error.is_none(),
            last_checked: Utc::now(),
            response_time_ms,
            error,
        }
    }
}

/// Listing query with empty values dropped; `status` is passed separately
/// because totals override it
fn listing_query(
    page: i64,
    size: i64,
    filters: &SearchFilters,
    status: Option<StatusFilter>,
) -> Query {
    let candidates: [(&'static str, Option<String>); 7] = [
        ("pagina", Some(page.to_string())),
        ("porPagina", Some(size.to_string())),
        ("nome", filters.name().map(str::to_string)),
        ("status", status.map(|s| s.upstream_value().to_string())),
        ("sexo", filters.sexo.map(|s| s.as_str().to_string())),
        (
            "dataDesaparecimentoDe",
            filters
                .data_desaparecimento_de
                .map(|d| d.format("%Y-%m-%d").to_string()),
        ),
        (
            "dataDesaparecimentoAte",
            filters
                .data_desaparecimento_ate
                .map(|d| d.format("%Y-%m-%d").to_string()),
        ),
    ];

    candidates
        .into_iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
        .collect()
}

/// Page count with a floor of one
fn pages_for(total: i64, size: i64) -> i64 {
    let size = size.max(1);
    (total.saturating_add(size - 1) / size).max(1)
}

fn mock_page(page: i64, size: i64, filters: &SearchFilters) -> PersonPage {
    let envelope = mock::page();
    let filtered = apply_mock_filters(&envelope.content, filters);
    let total = filtered.len() as i64;
    let total_pages = (total + size - 1) / size;
    let offset = page.saturating_mul(size);

    let content: Vec<Person> = filtered
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(size).unwrap_or(0))
        .collect();

    PersonPage {
        total_elements: total,
        total_pages,
        pageable: crate::models::Pageable {
            page_number: page,
            page_size: size,
            offset,
            ..envelope.pageable
        },
        number_of_elements: content.len() as i64,
        first: page == 0,
        last: page.saturating_add(1) >= total_pages,
        size,
        content,
    }
}

fn mock_totals(filters: &SearchFilters) -> Totals {
    let unfiltered_status = SearchFilters {
        status: None,
        ..filters.clone()
    };
    let people = apply_mock_filters(&mock::people(), &unfiltered_status);
    let localizadas = people
        .iter()
        .filter(|p| p.ultima_ocorrencia.is_located())
        .count() as i64;
    Totals {
        desaparecidas: people.len() as i64 - localizadas,
        localizadas,
    }
}
