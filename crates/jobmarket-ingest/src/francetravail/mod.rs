//! France Travail API module
//!
//! OAuth2 client-credentials authentication and paginated access to the
//! offer search endpoint.

pub mod client;
pub mod models;

pub use client::{FranceTravailClient, SearchFilters};
pub use models::RawOffer;
