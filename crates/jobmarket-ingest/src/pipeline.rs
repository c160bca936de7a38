//! Ingestion pipeline orchestrator
//!
//! Runs a full fetch-normalize-store cycle for one set of search
//! filters. Phases run strictly in order; a failure in any phase aborts
//! the run before the database is touched, or rolls the batch back if
//! the store phase itself fails.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::IngestConfig;
use crate::francetravail::{FranceTravailClient, SearchFilters};
use crate::normalize::{DeptGeoTable, Normalizer};
use crate::store::OfferStore;

/// Result of a pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineResult {
    /// Raw offers fetched from the API
    pub fetched: usize,
    /// New job_offer rows inserted
    pub created: usize,
    /// Existing job_offer rows updated
    pub updated: usize,
}

impl PipelineResult {
    pub fn summary(&self) -> String {
        format!(
            "fetched {} offers: {} created, {} updated",
            self.fetched, self.created, self.updated
        )
    }
}

/// Orchestrates one ingestion run end to end
pub struct IngestPipeline {
    config: IngestConfig,
    store: OfferStore,
    normalizer: Normalizer,
}

impl IngestPipeline {
    /// Build a pipeline from configuration and a connected pool
    ///
    /// The department-geography referential is loaded here, once per
    /// pipeline; a missing `DEPT_GEO_CSV` disables coordinate enrichment
    /// rather than failing the run.
    pub fn new(config: IngestConfig, db: PgPool) -> Result<Self> {
        let geo = match &config.dept_geo_csv {
            Some(path) => Some(
                DeptGeoTable::load(path)
                    .with_context(|| format!("Failed to load geo referential from {}", path.display()))?,
            ),
            None => None,
        };

        if geo.is_none() {
            warn!("No department geo referential configured, coordinates will be absent");
        }

        let normalizer = Normalizer::new(geo).context("Failed to build normalizer")?;

        Ok(Self {
            config,
            store: OfferStore::new(db),
            normalizer,
        })
    }

    /// Run the full pipeline for one set of search filters
    pub async fn run(&self, filters: &SearchFilters) -> Result<PipelineResult> {
        info!(keywords = %filters.keywords, "Starting ingestion run");

        let client = FranceTravailClient::new(self.config.api.clone())
            .context("Failed to build API client")?;

        info!("Phase 1: Authenticating with France Travail");
        let token = client
            .fetch_token()
            .await
            .context("Failed to obtain access token")?;

        info!("Phase 2: Fetching offers");
        let raw_offers = client
            .fetch_offers(&token, filters)
            .await
            .context("Failed to fetch offers")?;

        if raw_offers.is_empty() {
            info!("No offers matched the filters, nothing to store");
            return Ok(PipelineResult::default());
        }

        info!(count = raw_offers.len(), "Phase 3: Normalizing offers");
        let normalized: Vec<_> = raw_offers
            .iter()
            .map(|raw| self.normalizer.normalize_offer(raw))
            .collect();

        info!("Phase 4: Storing batch");
        let stats = self
            .store
            .store_batch(&normalized)
            .await
            .context("Failed to store offer batch")?;

        let result = PipelineResult {
            fetched: raw_offers.len(),
            created: stats.created,
            updated: stats.updated,
        };

        info!("Ingestion run complete: {}", result.summary());

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_summary() {
        let result = PipelineResult {
            fetched: 12,
            created: 10,
            updated: 2,
        };
        assert_eq!(result.summary(), "fetched 12 offers: 10 created, 2 updated");
    }

    #[test]
    fn test_empty_result_summary() {
        let result = PipelineResult::default();
        assert_eq!(result.summary(), "fetched 0 offers: 0 created, 0 updated");
    }
}
