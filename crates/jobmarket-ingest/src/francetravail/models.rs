//! France Travail API payload types
//!
//! Matches the offer search response structure. Every field on an offer is
//! optional: the source routinely omits blocks (`entreprise`, `salaire`,
//! `competences`, ...) and a partial record is not an error.

use serde::Deserialize;

/// OAuth2 token response from the client-credentials exchange
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// One page of offer search results
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub resultats: Vec<RawOffer>,
}

/// A raw job-offer record, as returned by the search endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOffer {
    pub id: Option<String>,
    pub intitule: Option<String>,
    pub description: Option<String>,
    pub entreprise: Option<RawCompany>,
    pub secteur_activite_libelle: Option<String>,
    pub experience_libelle: Option<String>,
    pub formations: Option<Vec<RawFormation>>,
    pub type_contrat_libelle: Option<String>,
    pub salaire: Option<RawSalary>,
    pub date_creation: Option<String>,
    pub lieu_travail: Option<RawWorkplace>,
    pub competences: Option<Vec<RawRequirement>>,
    pub langues: Option<Vec<RawRequirement>>,
    pub qualites_professionnelles: Option<Vec<RawQuality>>,
    pub origine_offre: Option<RawOrigin>,
}

/// Employer block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCompany {
    pub nom: Option<String>,
}

/// Education entry (`formations[]`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFormation {
    pub libelle: Option<String>,
}

/// Free-text salary block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSalary {
    pub libelle: Option<String>,
}

/// Workplace block; `libelle` has the form `"<dept code> - <city>"`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWorkplace {
    pub libelle: Option<String>,
}

/// Skill or language entry with an exigence flag (`E` = required, `S` = optional)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRequirement {
    pub libelle: Option<String>,
    pub exigence: Option<String>,
}

/// Soft-skill entry (`qualitesProfessionnelles[]`, no exigence flag)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuality {
    pub libelle: Option<String>,
}

/// Offer origin block carrying the canonical source URL
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrigin {
    pub url_origine: Option<String>,
}

impl RawOffer {
    /// Canonical URL for the offer, used as the idempotency key.
    ///
    /// Falls back to a synthetic `francetravail:<id>` URL when the origin
    /// block is absent.
    pub fn canonical_url(&self) -> String {
        self.origine_offre
            .as_ref()
            .and_then(|o| o.url_origine.clone())
            .unwrap_or_else(|| {
                format!("francetravail:{}", self.id.as_deref().unwrap_or("unknown"))
            })
    }
}
