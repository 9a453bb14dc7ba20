//! Input validation for listing filters and tip submissions
//!
//! Messages are user-facing (Portuguese) and collected per field so a form
//! can show every problem at once.

use chrono::{Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Photo, TipSubmission};

/// Minimum tip length in characters (after trimming)
pub const MIN_TIP_CHARS: usize = 10;
/// Maximum tip length in characters
pub const MAX_TIP_CHARS: usize = 500;
/// Maximum photos per tip
pub const MAX_PHOTOS: usize = 5;
/// Maximum size of a single photo
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;
/// Photo types accepted by investigators
pub const ALLOWED_PHOTO_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(\d{2}\) \d{4,5}-\d{4}$").expect("valid phone regex"));
static PHONE_GROUPS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{0,2})(\d{0,5})(\d{0,4})$").expect("valid phone mask regex"));

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Parse a `yyyy-MM-dd` date, rejecting other layouts and impossible dates
pub fn parse_date(field: &str, value: &str) -> std::result::Result<NaiveDate, FieldError> {
    let value = value.trim();
    if !DATE_RE.is_match(value) {
        return Err(FieldError::new(field, "Data deve estar no formato yyyy-MM-dd"));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| FieldError::new(field, "Data inválida"))
}

/// Optional date query parameter: empty means absent
pub fn parse_optional_date(
    field: &str,
    value: Option<&str>,
) -> std::result::Result<Option<NaiveDate>, FieldError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_date(field, v).map(Some),
        None => Ok(None),
    }
}

/// Apply the `(XX) XXXXX-XXXX` display mask to whatever digits were typed.
///
/// Input with more than eleven digits is returned unchanged.
///
/// # Examples
/// ```
/// use mpr_common::validation::format_phone;
///
/// assert_eq!(format_phone("65999999999"), "(65) 99999-9999");
/// assert_eq!(format_phone("659"), "(65) 9");
/// assert_eq!(format_phone("6"), "6");
/// ```
pub fn format_phone(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    let Some(caps) = PHONE_GROUPS_RE.captures(&digits) else {
        return value.to_string();
    };
    let area = &caps[1];
    let prefix = &caps[2];
    let line = &caps[3];

    if prefix.is_empty() {
        area.to_string()
    } else if line.is_empty() {
        format!("({}) {}", area, prefix)
    } else {
        format!("({}) {}-{}", area, prefix, line)
    }
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

/// Check a photo against the size and type rules.
///
/// The type is sniffed from the bytes; on success the photo's content type
/// is replaced with the detected one.
pub fn validate_photo(photo: &mut Photo) -> std::result::Result<(), FieldError> {
    if photo.bytes.len() > MAX_PHOTO_BYTES {
        return Err(FieldError::new(
            "fotos",
            format!("A imagem {} é muito grande. Máximo 5MB.", photo.file_name),
        ));
    }
    match infer::get(&photo.bytes).map(|t| t.mime_type()) {
        Some(mime) if ALLOWED_PHOTO_TYPES.contains(&mime) => {
            photo.content_type = mime.to_string();
            Ok(())
        }
        _ => Err(FieldError::new(
            "fotos",
            format!(
                "O arquivo {} não é uma imagem válida (JPG, PNG ou GIF).",
                photo.file_name
            ),
        )),
    }
}

/// Raw tip form fields, as typed
#[derive(Debug, Clone, Default)]
pub struct TipDraft {
    pub oco_id: i64,
    pub informacao: String,
    pub descricao: String,
    pub data: String,
    pub localizacao: String,
    pub telefone: String,
    pub fotos: Vec<Photo>,
}

/// Validate a draft into a submission, collecting every field error
pub fn validate_tip(draft: TipDraft, today: NaiveDate) -> Result<TipSubmission> {
    let mut errors = Vec::new();

    let informacao = draft.informacao.trim().to_string();
    let chars = informacao.chars().count();
    if chars == 0 {
        errors.push(FieldError::new("informacao", "Este campo é obrigatório"));
    } else if chars < MIN_TIP_CHARS {
        errors.push(FieldError::new(
            "informacao",
            format!("Informação deve ter pelo menos {} caracteres", MIN_TIP_CHARS),
        ));
    } else if chars > MAX_TIP_CHARS {
        errors.push(FieldError::new(
            "informacao",
            format!("Informação deve ter no máximo {} caracteres", MAX_TIP_CHARS),
        ));
    }

    let data = match parse_date("data", &draft.data) {
        Ok(date) => {
            let one_year_ago = today.checked_sub_months(Months::new(12)).unwrap_or(today);
            if date < one_year_ago || date > today {
                errors.push(FieldError::new("data", "Data deve ser entre 1 ano atrás e hoje"));
            }
            Some(date)
        }
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let telefone = match draft.telefone.trim() {
        "" => None,
        raw => {
            let masked = format_phone(raw);
            if !is_valid_phone(&masked) {
                errors.push(FieldError::new(
                    "telefone",
                    "Telefone deve estar no formato (XX) XXXXX-XXXX",
                ));
            }
            Some(masked)
        }
    };

    let mut fotos = draft.fotos;
    if fotos.len() > MAX_PHOTOS {
        errors.push(FieldError::new("fotos", "Máximo de 5 fotos permitidas."));
    } else {
        for photo in fotos.iter_mut() {
            if let Err(e) = validate_photo(photo) {
                errors.push(e);
            }
        }
    }

    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    Ok(TipSubmission {
        oco_id: draft.oco_id,
        informacao,
        descricao: draft.descricao.trim().to_string(),
        data: data.unwrap_or(today),
        fotos,
        localizacao: Some(draft.localizacao.trim().to_string()).filter(|l| !l.is_empty()),
        telefone,
    })
}
