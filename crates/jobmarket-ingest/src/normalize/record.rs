//! Raw offer -> structured row conversion
//!
//! Maps a [`RawOffer`] onto the flat shape the store layer persists:
//! parsed salary range, parsed location, split skill/language lists.
//! Missing source fields become None here; substitution of the documented
//! defaults ("Unknown" company, "Inconnue"/"00" location) happens in the
//! store layer at resolution time.

use chrono::{DateTime, NaiveDate};
use tracing::warn;

use super::Normalizer;
use crate::francetravail::models::{RawOffer, RawRequirement};

/// A normalized job-offer row, ready for entity resolution
#[derive(Debug, Clone, Default)]
pub struct NormalizedOffer {
    /// Idempotency key for the whole pipeline
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub contract: Option<String>,
    pub salary_min_annual: Option<f64>,
    pub salary_max_annual: Option<f64>,
    pub date_posted: Option<NaiveDate>,
    pub dept_code: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub skills_hard_required: Vec<String>,
    pub skills_hard_optional: Vec<String>,
    /// Soft skills carry no exigence flag; always linked as required
    pub skills_soft: Vec<String>,
    pub languages_required: Vec<String>,
    pub languages_optional: Vec<String>,
}

impl Normalizer {
    /// Normalize one raw record into a structured row
    pub fn normalize_offer(&self, raw: &RawOffer) -> NormalizedOffer {
        let (skills_hard_required, skills_hard_optional) =
            split_by_exigence(raw.competences.as_deref());
        let (languages_required, languages_optional) =
            split_by_exigence(raw.langues.as_deref());

        let skills_soft = raw
            .qualites_professionnelles
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|q| q.libelle.clone())
            .collect();

        let salary_text = raw.salaire.as_ref().and_then(|s| s.libelle.as_deref());
        let (salary_min_annual, salary_max_annual) = self.parse_salary(salary_text);

        let location_text = raw.lieu_travail.as_ref().and_then(|l| l.libelle.as_deref());
        let location = self.parse_location(location_text);

        let education = raw.formations.as_ref().map(|formations| {
            formations
                .iter()
                .map(|f| f.libelle.clone().unwrap_or_default())
                .collect::<Vec<_>>()
                .join(", ")
        });

        NormalizedOffer {
            url: raw.canonical_url(),
            title: raw.intitule.clone().unwrap_or_default(),
            description: raw.description.clone(),
            company: raw.entreprise.as_ref().and_then(|e| e.nom.clone()),
            industry: raw.secteur_activite_libelle.clone(),
            experience: raw.experience_libelle.clone(),
            education,
            contract: raw.type_contrat_libelle.clone(),
            salary_min_annual,
            salary_max_annual,
            date_posted: parse_date(raw.date_creation.as_deref()),
            dept_code: location.dept_code,
            city: location.city,
            latitude: location.latitude,
            longitude: location.longitude,
            skills_hard_required,
            skills_hard_optional,
            skills_soft,
            languages_required,
            languages_optional,
        }
    }
}

/// Split requirement entries into (required, optional) label lists
///
/// The exigence flag is `E` for required and `S` for optional; entries
/// with any other flag or no label are dropped.
fn split_by_exigence(items: Option<&[RawRequirement]>) -> (Vec<String>, Vec<String>) {
    let Some(items) = items else {
        return (Vec::new(), Vec::new());
    };

    let required = items
        .iter()
        .filter(|i| i.exigence.as_deref() == Some("E"))
        .filter_map(|i| i.libelle.clone())
        .collect();
    let optional = items
        .iter()
        .filter(|i| i.exigence.as_deref() == Some("S"))
        .filter_map(|i| i.libelle.clone())
        .collect();

    (required, optional)
}

/// Parse an ISO-8601 `Z`-suffixed timestamp into a date
fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?;
    if value.is_empty() {
        return None;
    }

    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.date_naive()),
        Err(e) => {
            warn!(value = %value, error = %e, "Unparseable creation date, leaving date_posted empty");
            None
        },
    }
}
