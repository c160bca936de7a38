//! Location text parsing
//!
//! Workplace labels have the form `"<dept code> - <city>"`, e.g.
//! `"75 - Paris 9e arrondissement"` or `"2A - Ajaccio"`. Parsing strips
//! arrondissement suffixes, zero-pads the department code, and optionally
//! enriches with coordinates from the department geography referential.
//! Text that does not match the pattern yields an all-None result, never
//! an error.

use anyhow::{Context, Result};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::geo::{pad_dept_code, DeptGeoTable};

/// Parsed workplace fields; any subset may be absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLocation {
    /// Zero-padded department code ("75", "2A")
    pub dept_code: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Parser for workplace labels
#[derive(Debug)]
pub struct LocationParser {
    pattern: Regex,
    arrondissement_re: Regex,
}

impl LocationParser {
    pub fn new() -> Result<Self> {
        // The alternation admits the Corsican codes 2A/2B alongside the
        // 1-3 digit numeric codes; the city segment may be empty.
        let pattern = Regex::new(r"(?i)^\s*(\d{1,3}|\d[ab])\s*-\s*(.*)$")
            .context("Failed to compile location pattern")?;
        let arrondissement_re = Regex::new(r"(?i)\s+\d{1,2}(er|e)?\s+arrondissement.*$")
            .context("Failed to compile arrondissement pattern")?;

        Ok(Self {
            pattern,
            arrondissement_re,
        })
    }

    /// Parse a workplace label into department code, city, and coordinates
    ///
    /// When the referential knows the department, coordinates come from it
    /// and an empty city falls back to the department name. Without a
    /// referential (or for an unknown code) the parsed code and city are
    /// returned with no coordinates.
    pub fn parse(&self, location: Option<&str>, geo: Option<&DeptGeoTable>) -> ParsedLocation {
        let Some(location) = location else {
            return ParsedLocation::default();
        };

        // The source occasionally emits decomposed accents; match on the
        // NFKC form.
        let location: String = location.nfkc().collect::<String>().trim().to_string();

        let Some(captures) = self.pattern.captures(&location) else {
            return ParsedLocation::default();
        };

        let dept_code = pad_dept_code(&captures[1]);
        let city_raw = self.clean_city_name(&captures[2]);

        let Some(dept) = geo.and_then(|g| g.get(&dept_code)) else {
            return ParsedLocation {
                dept_code: Some(dept_code),
                city: if city_raw.is_empty() {
                    None
                } else {
                    Some(city_raw)
                },
                latitude: None,
                longitude: None,
            };
        };

        let city = if city_raw.is_empty() {
            dept.name.clone()
        } else {
            city_raw
        };

        ParsedLocation {
            dept_code: Some(dept_code),
            city: Some(city),
            latitude: dept.latitude,
            longitude: dept.longitude,
        }
    }

    /// Strip arrondissement suffixes and trailing punctuation from a city
    ///
    /// "Paris 9e arrondissement" -> "Paris", "Lyon 1er Arrondissement" -> "Lyon"
    fn clean_city_name(&self, city: &str) -> String {
        let city = city.trim();
        let city = self.arrondissement_re.replace(city, "");
        city.trim_end_matches([',', ' ']).trim().to_string()
    }
}
