//! Upstream wire models and derived values
//!
//! Field names follow the upstream JSON (camelCase Portuguese); Rust names
//! are English. A *Pessoa* is a [`Person`]; its *Ocorrência* is the
//! [`LastOccurrence`], identified by `ocoId`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Person sex as reported by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sex {
    Masculino,
    Feminino,
}

impl Sex {
    /// Upstream query value
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Masculino => "MASCULINO",
            Sex::Feminino => "FEMININO",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Masculino => "Masculino",
            Sex::Feminino => "Feminino",
        }
    }

    /// Parse a query value; "todos" and unknown values mean no filter
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MASCULINO" => Some(Sex::Masculino),
            "FEMININO" => Some(Sex::Feminino),
            _ => None,
        }
    }
}

/// Case status filter as chosen in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Desaparecido,
    Localizado,
}

impl StatusFilter {
    /// Value sent to the upstream `status` parameter
    pub fn upstream_value(&self) -> &'static str {
        match self {
            StatusFilter::Desaparecido => "DESAPARECIDO",
            StatusFilter::Localizado => "LOCALIZADO",
        }
    }

    /// Value used in portal URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::Desaparecido => "desaparecido",
            StatusFilter::Localizado => "localizado",
        }
    }

    /// Accepts both UI and upstream spellings; "todos" means no filter
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "desaparecido" => Some(StatusFilter::Desaparecido),
            "localizado" => Some(StatusFilter::Localizado),
            _ => None,
        }
    }
}

/// Interview data attached to an occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceInterview {
    pub informacao: Option<String>,
    #[serde(default)]
    pub vestimentas_desaparecido: String,
}

/// Latest occurrence (Ocorrência) of a person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastOccurrence {
    pub dt_desaparecimento: String,
    pub data_localizacao: Option<String>,
    #[serde(default)]
    pub encontrado_vivo: bool,
    #[serde(default)]
    pub local_desaparecimento_concat: String,
    #[serde(rename = "ocorrenciaEntrevDesapDTO")]
    pub ocorrencia_entrev_desap_dto: Option<OccurrenceInterview>,
    pub lista_cartaz: Option<Value>,
    pub oco_id: i64,
}

impl LastOccurrence {
    /// A record counts as located only when the location date is filled in.
    ///
    /// The upstream `LOCALIZADO` status alone is not trusted.
    pub fn is_located(&self) -> bool {
        self.data_localizacao
            .as_deref()
            .map(|d| !d.trim().is_empty())
            .unwrap_or(false)
    }

    /// Disappearance instant, if the upstream string parses
    pub fn disappeared_at(&self) -> Option<NaiveDateTime> {
        parse_upstream_datetime(&self.dt_desaparecimento)
    }

    pub fn located_at(&self) -> Option<NaiveDateTime> {
        self.data_localizacao
            .as_deref()
            .and_then(parse_upstream_datetime)
    }
}

/// Missing or located person (Pessoa)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub idade: i32,
    pub sexo: Sex,
    #[serde(default)]
    pub vivo: bool,
    pub url_foto: Option<String>,
    pub ultima_ocorrencia: LastOccurrence,
}

impl Person {
    /// Whole days since disappearance, rounded up, as shown on cards
    pub fn days_missing(&self, now: NaiveDateTime) -> Option<i64> {
        let since = self.ultima_ocorrencia.disappeared_at()?;
        let secs = (now - since).num_seconds().abs();
        Some((secs + 86_399) / 86_400)
    }
}

/// Spring-style sort metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    pub unsorted: bool,
    pub sorted: bool,
    pub empty: bool,
}

/// Spring-style page request metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pageable {
    pub page_number: i64,
    pub page_size: i64,
    #[serde(default)]
    pub sort: Sort,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub unpaged: bool,
    #[serde(default)]
    pub paged: bool,
}

/// Paginated listing envelope returned by `/v1/pessoas/aberto/filtro`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonPage {
    pub total_elements: i64,
    pub total_pages: i64,
    #[serde(default)]
    pub pageable: Pageable,
    pub number_of_elements: i64,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
    pub size: i64,
    pub content: Vec<Person>,
}

/// Listing filters. Absent fields mean "todos".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub nome: Option<String>,
    pub status: Option<StatusFilter>,
    pub sexo: Option<Sex>,
    pub data_desaparecimento_de: Option<NaiveDate>,
    pub data_desaparecimento_ate: Option<NaiveDate>,
}

impl SearchFilters {
    /// Trimmed, non-empty name filter
    pub fn name(&self) -> Option<&str> {
        self.nome
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    pub fn has_date_range(&self) -> bool {
        self.data_desaparecimento_de.is_some() || self.data_desaparecimento_ate.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.name().is_none()
            && self.status.is_none()
            && self.sexo.is_none()
            && !self.has_date_range()
    }
}

/// Photo attached to a tip
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Tip (NovaInformacao) sent to investigators
#[derive(Debug, Clone, PartialEq)]
pub struct TipSubmission {
    pub oco_id: i64,
    pub informacao: String,
    /// Caption for the attachments; may be empty
    pub descricao: String,
    pub data: NaiveDate,
    pub fotos: Vec<Photo>,
    pub localizacao: Option<String>,
    pub telefone: Option<String>,
}

impl TipSubmission {
    /// Text sent upstream. Location and phone have no upstream field, so
    /// they travel appended to the free text.
    pub fn composed_text(&self) -> String {
        let extras: Vec<String> = [
            ("Local onde a pessoa foi vista", self.localizacao.as_deref()),
            ("Telefone para contato", self.telefone.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}: {}", label, v))
        })
        .collect();

        let mut text = self.informacao.trim().to_string();
        if !extras.is_empty() {
            text.push_str("\n\n");
            text.push_str(&extras.join("\n"));
        }
        text
    }
}

/// Upstream reachability probe result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatus {
    pub is_online: bool,
    pub last_checked: DateTime<Utc>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Registry-wide counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub desaparecidas: i64,
    pub localizadas: i64,
}

/// Statistics cards shown above the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageStatistics {
    pub total: i64,
    pub desaparecidas: i64,
    pub localizadas: i64,
}

impl PageStatistics {
    /// `total` is registry-wide; the other two count the visible page only
    pub fn from_page(page: &PersonPage) -> Self {
        let localizadas = page
            .content
            .iter()
            .filter(|p| p.ultima_ocorrencia.is_located())
            .count() as i64;
        Self {
            total: page.total_elements,
            desaparecidas: page.content.len() as i64 - localizadas,
            localizadas,
        }
    }
}

/// Parse the datetime formats the registry emits
///
/// Seen in the wild: `2025-04-02T22:22:00`, with fractional seconds,
/// with a `Z`/offset suffix, and bare dates.
pub fn parse_upstream_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person_json(located: serde_json::Value) -> serde_json::Value {
        json!({
            "id": 2364,
            "nome": "JOANA DA SILVA",
            "idade": 40,
            "sexo": "FEMININO",
            "vivo": false,
            "urlFoto": null,
            "ultimaOcorrencia": {
                "dtDesaparecimento": "2025-03-27T14:00:00",
                "dataLocalizacao": located,
                "encontradoVivo": false,
                "localDesaparecimentoConcat": "CPAV - Cuiabá/MT",
                "ocorrenciaEntrevDesapDTO": {
                    "informacao": "asdas",
                    "vestimentasDesaparecido": "SHORT PRETO E CAMISA BRANCA"
                },
                "listaCartaz": null,
                "ocoId": 1524
            }
        })
    }

    #[test]
    fn test_person_deserializes_upstream_shape() {
        let p: Person = serde_json::from_value(person_json(json!("2025-04-10T10:00:00"))).unwrap();
        assert_eq!(p.id, 2364);
        assert_eq!(p.sexo, Sex::Feminino);
        assert_eq!(p.ultima_ocorrencia.oco_id, 1524);
        assert!(p.ultima_ocorrencia.is_located());
        assert_eq!(
            p.ultima_ocorrencia
                .ocorrencia_entrev_desap_dto
                .as_ref()
                .unwrap()
                .vestimentas_desaparecido,
            "SHORT PRETO E CAMISA BRANCA"
        );
    }

    #[test]
    fn test_blank_location_date_is_not_located() {
        let p: Person = serde_json::from_value(person_json(json!("   "))).unwrap();
        assert!(!p.ultima_ocorrencia.is_located());
        let p: Person = serde_json::from_value(person_json(json!(null))).unwrap();
        assert!(!p.ultima_ocorrencia.is_located());
    }

    #[test]
    fn test_person_serializes_back_to_camel_case() {
        let p: Person = serde_json::from_value(person_json(json!(null))).unwrap();
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["ultimaOcorrencia"]["ocoId"], 1524);
        assert!(v["ultimaOcorrencia"]["ocorrenciaEntrevDesapDTO"].is_object());
        assert_eq!(v["urlFoto"], Value::Null);
    }

    #[test]
    fn test_parse_upstream_datetime_variants() {
        let expected = NaiveDate::from_ymd_opt(2025, 4, 2)
            .unwrap()
            .and_hms_opt(22, 22, 0)
            .unwrap();
        assert_eq!(parse_upstream_datetime("2025-04-02T22:22:00"), Some(expected));
        assert_eq!(parse_upstream_datetime("2025-04-02T22:22:00.000"), Some(expected));
        assert_eq!(parse_upstream_datetime("2025-04-02T22:22:00Z"), Some(expected));
        assert_eq!(parse_upstream_datetime("2025-04-02T22:22"), Some(expected));
        assert!(parse_upstream_datetime("2025-04-02").is_some());
        assert!(parse_upstream_datetime("").is_none());
        assert!(parse_upstream_datetime("ontem").is_none());
    }

    #[test]
    fn test_days_missing_rounds_up() {
        let p: Person = serde_json::from_value(person_json(json!(null))).unwrap();
        let since = p.ultima_ocorrencia.disappeared_at().unwrap();
        assert_eq!(p.days_missing(since), Some(0));
        assert_eq!(p.days_missing(since + chrono::Duration::hours(1)), Some(1));
        assert_eq!(p.days_missing(since + chrono::Duration::days(3)), Some(3));
        assert_eq!(
            p.days_missing(since + chrono::Duration::days(3) + chrono::Duration::seconds(1)),
            Some(4)
        );
    }

    #[test]
    fn test_status_and_sex_parsing() {
        assert_eq!(StatusFilter::parse("LOCALIZADO"), Some(StatusFilter::Localizado));
        assert_eq!(StatusFilter::parse("desaparecido"), Some(StatusFilter::Desaparecido));
        assert_eq!(StatusFilter::parse("todos"), None);
        assert_eq!(Sex::parse("feminino"), Some(Sex::Feminino));
        assert_eq!(Sex::parse("todos"), None);
    }

    #[test]
    fn test_composed_text_appends_contact_details() {
        let tip = TipSubmission {
            oco_id: 1,
            informacao: "Vi a pessoa na praça central".to_string(),
            descricao: String::new(),
            data: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            fotos: vec![],
            localizacao: Some("Praça Alencastro".to_string()),
            telefone: Some("(65) 99999-9999".to_string()),
        };
        assert_eq!(
            tip.composed_text(),
            "Vi a pessoa na praça central\n\nLocal onde a pessoa foi vista: Praça Alencastro\nTelefone para contato: (65) 99999-9999"
        );

        let bare = TipSubmission { localizacao: None, telefone: None, ..tip };
        assert_eq!(bare.composed_text(), "Vi a pessoa na praça central");
    }
}
