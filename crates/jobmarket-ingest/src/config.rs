//! Ingestion configuration
//!
//! Everything is supplied via environment variables (with `.env` support
//! through dotenvy); nothing is hardcoded beyond defaults for the public
//! API endpoints and pagination knobs.

use std::path::PathBuf;

use jobmarket_common::{MarketError, Result};

use crate::db::DbConfig;

// ============================================================================
// Ingestion Configuration Constants
// ============================================================================

/// Default France Travail OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URL: &str =
    "https://entreprise.francetravail.fr/connexion/oauth2/access_token?realm=/partenaire";

/// Default France Travail offer search endpoint.
pub const DEFAULT_SEARCH_URL: &str =
    "https://api.francetravail.io/partenaire/offresdemploi/v2/offres/search";

/// Default page size for range-based pagination.
pub const DEFAULT_STEP: u32 = 150;

/// Default cap on the cumulative number of fetched offers per run.
pub const DEFAULT_MAX_RESULTS: u32 = 300;

/// Default delay between page fetches, in milliseconds.
pub const DEFAULT_PAGE_DELAY_MS: u64 = 500;

/// France Travail API configuration
#[derive(Debug, Clone)]
pub struct FranceTravailConfig {
    /// OAuth2 client id
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Token endpoint URL (overridable for tests)
    pub token_url: String,
    /// Search endpoint URL (overridable for tests)
    pub search_url: String,
    /// Page size for range-based pagination
    pub step: u32,
    /// Cap on cumulative fetched results per run
    pub max_results: u32,
    /// Delay between page fetches, in milliseconds
    pub page_delay_ms: u64,
}

impl Default for FranceTravailConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            step: DEFAULT_STEP,
            max_results: DEFAULT_MAX_RESULTS,
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
        }
    }
}

/// Full ingestion configuration
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub database: DbConfig,
    pub api: FranceTravailConfig,
    /// Optional department-geography CSV path; absence disables
    /// coordinate enrichment
    pub dept_geo_csv: Option<PathBuf>,
}

impl IngestConfig {
    /// Load configuration from environment and defaults
    ///
    /// Environment variables:
    /// - `DATABASE_URL` plus the pool knobs read by [`DbConfig::from_env`]
    /// - `FT_CLIENT_ID` / `FT_CLIENT_SECRET`: OAuth2 credentials (required)
    /// - `FT_TOKEN_URL` / `FT_SEARCH_URL`: endpoint overrides
    /// - `FT_STEP`: page size (default 150)
    /// - `FT_MAX_RESULTS`: per-run result cap (default 300)
    /// - `FT_PAGE_DELAY_MS`: inter-page delay (default 500)
    /// - `DEPT_GEO_CSV`: department-geography referential path (optional)
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database =
            DbConfig::from_env().map_err(|e| MarketError::Config(e.to_string()))?;

        let api = FranceTravailConfig {
            client_id: std::env::var("FT_CLIENT_ID")
                .map_err(|_| MarketError::config("FT_CLIENT_ID not set"))?,
            client_secret: std::env::var("FT_CLIENT_SECRET")
                .map_err(|_| MarketError::config("FT_CLIENT_SECRET not set"))?,
            token_url: std::env::var("FT_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            search_url: std::env::var("FT_SEARCH_URL")
                .unwrap_or_else(|_| DEFAULT_SEARCH_URL.to_string()),
            step: std::env::var("FT_STEP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_STEP),
            max_results: std::env::var("FT_MAX_RESULTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_RESULTS),
            page_delay_ms: std::env::var("FT_PAGE_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PAGE_DELAY_MS),
        };

        let dept_geo_csv = std::env::var("DEPT_GEO_CSV")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let config = Self {
            database,
            api,
            dept_geo_csv,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.step == 0 {
            return Err(MarketError::config("FT_STEP must be greater than 0"));
        }

        if self.api.max_results == 0 {
            return Err(MarketError::config(
                "FT_MAX_RESULTS must be greater than 0",
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(MarketError::Config(format!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }

        Ok(())
    }
}
