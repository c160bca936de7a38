//! Normalization of raw France Travail text
//!
//! Pure functions and parsers turning loosely structured API text into
//! typed values: canonical titles, annual salary ranges, department/city
//! locations. No I/O happens here; the department geography table is
//! loaded by the caller and injected into the [`Normalizer`].

pub mod geo;
pub mod location;
pub mod record;
pub mod salary;

use anyhow::Result;

pub use geo::{DeptGeo, DeptGeoTable};
pub use location::{LocationParser, ParsedLocation};
pub use record::NormalizedOffer;
pub use salary::SalaryParser;

/// Lowercase, collapse whitespace runs (including non-breaking spaces) to
/// single spaces, and trim. Missing input yields an empty string.
pub fn normalize_text(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.to_lowercase().chars() {
        if c.is_whitespace() || c == '\u{a0}' {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }

    out
}

/// Canonicalize a job title for grouping and deduplication (not display)
///
/// Beyond [`normalize_text`], strips parenthetical annotations ("(H/F)")
/// and every character outside the Latin letter set (accents included)
/// plus space, then collapses whitespace again.
pub fn normalize_job_title(title: Option<&str>) -> String {
    let Some(title) = title else {
        return String::new();
    };

    let lowered = title.to_lowercase();
    let stripped = strip_parentheticals(&lowered);

    let mut out = String::with_capacity(stripped.len());
    let mut pending_space = false;

    for c in stripped.chars() {
        let keep = c.is_ascii_lowercase() || "àâçéèêëîïôûùüÿñæœ".contains(c);
        if keep {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            // Whitespace and every rejected character both act as a
            // word separator.
            pending_space = true;
        }
    }

    out
}

/// Remove non-nested `(...)` groups; an unmatched "(" is left in place
fn strip_parentheticals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            },
            None => break,
        }
    }

    out.push_str(rest);
    out
}

/// Stateful normalizer owning the compiled patterns and the optional
/// geography referential
#[derive(Debug)]
pub struct Normalizer {
    salary: SalaryParser,
    location: LocationParser,
    geo: Option<DeptGeoTable>,
}

impl Normalizer {
    /// Create a normalizer; pass the geography table when coordinate
    /// enrichment is wanted
    pub fn new(geo: Option<DeptGeoTable>) -> Result<Self> {
        Ok(Self {
            salary: SalaryParser::new()?,
            location: LocationParser::new()?,
            geo,
        })
    }

    /// Parse a free-text salary into an annual (min, max) range
    pub fn parse_salary(&self, text: Option<&str>) -> (Option<f64>, Option<f64>) {
        self.salary.parse(text)
    }

    /// Parse a workplace label into department/city/coordinates
    pub fn parse_location(&self, text: Option<&str>) -> ParsedLocation {
        self.location.parse(text, self.geo.as_ref())
    }

    /// Whether coordinate enrichment is active
    pub fn has_geo(&self) -> bool {
        self.geo.is_some()
    }
}
