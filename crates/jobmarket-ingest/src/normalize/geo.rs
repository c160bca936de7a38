//! Department geography referential
//!
//! A small CSV lookup table (one row per French department) used to enrich
//! parsed locations with coordinates and to supply a department name when
//! the offer text carries no usable city. Loaded once at startup and
//! injected into the [`Normalizer`](super::Normalizer); read-only after
//! construction. A missing path is a valid state — enrichment is simply
//! disabled.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use jobmarket_common::{MarketError, Result};

/// One department row from the referential
#[derive(Debug, Clone)]
pub struct DeptGeo {
    /// Department name (e.g., "Paris")
    pub name: String,
    /// Municipal-office latitude
    pub latitude: Option<f64>,
    /// Municipal-office longitude
    pub longitude: Option<f64>,
}

/// CSV row as stored on disk; extra columns are ignored
#[derive(Debug, Deserialize)]
struct DeptGeoRecord {
    dep_code: String,
    dep_nom: String,
    latitude_mairie: Option<f64>,
    longitude_mairie: Option<f64>,
}

/// Immutable department-geography lookup table keyed by 2-digit code
#[derive(Debug, Clone, Default)]
pub struct DeptGeoTable {
    by_code: HashMap<String, DeptGeo>,
}

impl DeptGeoTable {
    /// Load the referential from a CSV file
    ///
    /// Department codes are zero-padded to two characters on load so that
    /// `"1"` and `"01"` resolve to the same row.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            MarketError::Parse(format!(
                "Failed to open department geography CSV '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut by_code = HashMap::new();
        for record in reader.deserialize::<DeptGeoRecord>() {
            let record = record.map_err(|e| {
                MarketError::Parse(format!(
                    "Invalid row in department geography CSV '{}': {}",
                    path.display(),
                    e
                ))
            })?;

            by_code.insert(
                pad_dept_code(&record.dep_code),
                DeptGeo {
                    name: record.dep_nom,
                    latitude: record.latitude_mairie,
                    longitude: record.longitude_mairie,
                },
            );
        }

        info!(
            departments = by_code.len(),
            path = %path.display(),
            "Loaded department geography referential"
        );

        Ok(Self { by_code })
    }

    /// Build a table from rows already in memory (test seam)
    pub fn from_rows(rows: impl IntoIterator<Item = (String, DeptGeo)>) -> Self {
        Self {
            by_code: rows
                .into_iter()
                .map(|(code, geo)| (pad_dept_code(&code), geo))
                .collect(),
        }
    }

    /// Look up a department by its zero-padded code
    pub fn get(&self, dept_code: &str) -> Option<&DeptGeo> {
        self.by_code.get(dept_code)
    }

    /// Number of departments loaded
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

/// Zero-pad a department code to two characters ("1" -> "01", "2A" -> "2A")
pub fn pad_dept_code(code: &str) -> String {
    let code = code.trim();
    if code.len() == 1 {
        format!("0{}", code)
    } else {
        code.to_uppercase()
    }
}
