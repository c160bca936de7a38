//! Job market ingestion
//!
//! Pulls job offers from the France Travail search API, normalizes the
//! free-text fields (titles, salaries, workplaces) into comparable
//! values, and loads them idempotently into the relational job-market
//! schema. Re-running an ingestion updates existing offers in place
//! instead of duplicating them.

pub mod config;
pub mod db;
pub mod francetravail;
pub mod normalize;
pub mod pipeline;
pub mod store;

pub use config::IngestConfig;
pub use pipeline::{IngestPipeline, PipelineResult};
