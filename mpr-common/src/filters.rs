//! Local filter corrections
//!
//! The registry does not honour every filter it accepts: `LOCALIZADO`
//! returns records without a location date, and the disappearance date range
//! is applied loosely. These functions re-apply the filters on our side.

use chrono::{NaiveDateTime, NaiveTime};

use crate::models::{Person, SearchFilters, StatusFilter};

/// Inclusive disappearance window built from the filter dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
}

impl DateRange {
    /// `de` starts at midnight; `ate` covers the whole day up to 23:59:59.999
    pub fn from_filters(filters: &SearchFilters) -> Self {
        let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        Self {
            from: filters
                .data_desaparecimento_de
                .map(|d| d.and_time(NaiveTime::MIN)),
            until: filters
                .data_desaparecimento_ate
                .map(|d| d.and_time(end_of_day)),
        }
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.until.is_none()
    }

    /// Unparseable disappearance dates never match a bounded range
    pub fn contains(&self, person: &Person) -> bool {
        if self.is_open() {
            return true;
        }
        let Some(at) = person.ultima_ocorrencia.disappeared_at() else {
            return false;
        };
        self.from.map_or(true, |from| at >= from) && self.until.map_or(true, |until| at <= until)
    }
}

/// Whether the listing needs the local correction pass
pub fn needs_local_filtering(filters: &SearchFilters) -> bool {
    filters.status == Some(StatusFilter::Localizado) || filters.has_date_range()
}

/// Correction pass applied on top of an upstream page
pub fn apply_local_filters(list: &[Person], filters: &SearchFilters) -> Vec<Person> {
    let range = DateRange::from_filters(filters);
    let located_only = filters.status == Some(StatusFilter::Localizado);

    list.iter()
        .filter(|p| !located_only || p.ultima_ocorrencia.is_located())
        .filter(|p| range.contains(p))
        .cloned()
        .collect()
}

/// Full filter used when answering from the offline mock dataset
pub fn apply_mock_filters(list: &[Person], filters: &SearchFilters) -> Vec<Person> {
    let range = DateRange::from_filters(filters);
    let name = filters.name().map(str::to_lowercase);

    list.iter()
        .filter(|p| {
            name.as_deref()
                .map_or(true, |n| p.nome.to_lowercase().contains(n))
        })
        .filter(|p| match filters.status {
            Some(StatusFilter::Desaparecido) => !p.ultima_ocorrencia.is_located(),
            Some(StatusFilter::Localizado) => p.ultima_ocorrencia.is_located(),
            None => true,
        })
        .filter(|p| filters.sexo.map_or(true, |s| p.sexo == s))
        .filter(|p| range.contains(p))
        .cloned()
        .collect()
}
