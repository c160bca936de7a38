//! HTTP client for the France Travail offer search API
//!
//! Handles the OAuth2 client-credentials exchange and range-based
//! pagination with a fixed inter-page delay to respect the upstream rate
//! limit. Any non-success HTTP status is fatal for the current run: the
//! orchestrator never works from a partially fetched batch.

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::models::{RawOffer, SearchPage, TokenResponse};
use crate::config::FranceTravailConfig;

/// HTTP timeout for token and search requests, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// OAuth2 scope granting access to the offer search API.
pub const API_SCOPE: &str = "api_offresdemploiv2 o2dsoffre";

/// Search filters for an ingestion run
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Keyword query (`motsCles`)
    pub keywords: String,
    /// Optional workplace filter (`lieuTravail`)
    pub location: Option<String>,
    /// Optional contract type filter (`typeContrat`)
    pub contract_type: Option<String>,
}

impl SearchFilters {
    /// Filters matching offers for the given keywords, no location or
    /// contract restriction
    pub fn keywords(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            ..Default::default()
        }
    }
}

/// API client for France Travail
pub struct FranceTravailClient {
    client: Client,
    config: FranceTravailConfig,
}

impl FranceTravailClient {
    /// Create a new API client
    pub fn new(config: FranceTravailConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, config })
    }

    /// Obtain a bearer token via the client-credentials exchange
    pub async fn fetch_token(&self) -> Result<String> {
        debug!(url = %self.config.token_url, "Requesting access token");

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", API_SCOPE),
            ])
            .send()
            .await
            .context("Token request failed")?
            .error_for_status()
            .context("Token endpoint returned an error status")?;

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to decode token response")?;

        Ok(token.access_token)
    }

    /// Fetch all offers matching the filters, page by page
    ///
    /// Requests ranges `[start, start + step - 1]` until a page comes back
    /// empty, a page is shorter than the requested step, or the cumulative
    /// count would reach `max_results`. Pages are paced with a fixed delay.
    ///
    /// Returns the raw records in the order received, no normalization
    /// applied.
    pub async fn fetch_offers(
        &self,
        token: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<RawOffer>> {
        let step = self.config.step;
        let max_results = self.config.max_results;

        let mut all_offers: Vec<RawOffer> = Vec::new();
        let mut start: u32 = 0;

        while start < max_results {
            let range = format!("{}-{}", start, start + step - 1);
            debug!(range = %range, "Fetching offer page");

            let mut request = self
                .client
                .get(&self.config.search_url)
                .bearer_auth(token)
                .query(&[
                    ("motsCles", filters.keywords.as_str()),
                    ("range", range.as_str()),
                    ("sort", "1"),
                ]);

            if let Some(location) = &filters.location {
                request = request.query(&[("lieuTravail", location.as_str())]);
            }
            if let Some(contract_type) = &filters.contract_type {
                request = request.query(&[("typeContrat", contract_type.as_str())]);
            }

            let response = request
                .send()
                .await
                .with_context(|| format!("Search request failed for range {}", range))?
                .error_for_status()
                .with_context(|| format!("Search endpoint returned an error status for range {}", range))?;

            let page: SearchPage = response
                .json()
                .await
                .context("Failed to decode search response")?;

            let page_len = page.resultats.len();
            if page_len == 0 {
                break;
            }

            all_offers.extend(page.resultats);

            // A short page means the result set is exhausted.
            if page_len < step as usize {
                break;
            }

            start += step;

            if start < max_results {
                tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;
            }
        }

        info!(
            fetched = all_offers.len(),
            keywords = %filters.keywords,
            "Offer fetch completed"
        );

        Ok(all_offers)
    }
}
