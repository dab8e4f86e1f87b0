//! Analysis configuration.
//!
//! Every field has a default, so a JSON file only needs to name the values
//! it changes:
//!
//! ```json
//! { "dormant_days_threshold": 60, "quick_win_threshold": 0.65 }
//! ```

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::thresholds;

/// Keywords marking a line item as a non-merchandise charge.
const DEFAULT_EXCLUDED_PRODUCT_KEYWORDS: &[&str] = &[
    "fee",
    "shipping",
    "freight",
    "delivery",
    "tax",
    "credit",
    "deposit",
    "service",
    "discount",
    "refund",
    "adjustment",
    "surcharge",
    "handling",
];

/// Keywords identifying a wine product for the product insight roll-up.
const DEFAULT_WINE_KEYWORDS: &[&str] = &[
    "wine",
    "cabernet",
    "merlot",
    "pinot",
    "chardonnay",
    "sauvignon",
    "riesling",
    "zinfandel",
    "syrah",
    "shiraz",
    "malbec",
    "grenache",
    "tempranillo",
    "sangiovese",
    "nebbiolo",
    "chianti",
    "bordeaux",
    "burgundy",
    "rioja",
    "rose",
    "rosé",
    "champagne",
    "prosecco",
    "brut",
    "moscato",
    "red blend",
    "white blend",
];

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Fixed "today" for the analysis. When unset the latest transaction
    /// date in the input is used.
    pub reference_date: Option<NaiveDate>,
    /// Customers who ordered within this many days are still active.
    pub dormant_days_threshold: i64,
    /// Length of the trailing lookback window in calendar months.
    pub lookback_months: u32,
    /// 6-month value above which a dormant customer counts as high value.
    pub high_value_threshold: f64,
    /// Win-back score above which a dormant customer is a quick win.
    pub quick_win_threshold: f64,
    pub max_aggregate_products: usize,
    pub max_reported_issues: usize,
    pub chunk_size: usize,
    pub excluded_product_keywords: Vec<String>,
    pub wine_keywords: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reference_date: None,
            dormant_days_threshold: thresholds::DORMANT_DAYS_THRESHOLD,
            lookback_months: thresholds::LOOKBACK_MONTHS,
            high_value_threshold: thresholds::HIGH_VALUE_THRESHOLD,
            quick_win_threshold: thresholds::QUICK_WIN_THRESHOLD,
            max_aggregate_products: thresholds::MAX_AGGREGATE_PRODUCTS,
            max_reported_issues: thresholds::MAX_REPORTED_ISSUES,
            chunk_size: thresholds::DEFAULT_CHUNK_SIZE,
            excluded_product_keywords: to_strings(DEFAULT_EXCLUDED_PRODUCT_KEYWORDS),
            wine_keywords: to_strings(DEFAULT_WINE_KEYWORDS),
        }
    }
}

impl AnalysisConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject values that would make the dormancy window empty or the
    /// scoring thresholds meaningless.
    pub fn validate(&self) -> PipelineResult<()> {
        if !(1..=thresholds::MAX_DORMANT_DAYS_THRESHOLD).contains(&self.dormant_days_threshold) {
            return Err(PipelineError::InvalidConfig(format!(
                "dormant_days_threshold must be within 1..={}, got {}",
                thresholds::MAX_DORMANT_DAYS_THRESHOLD,
                self.dormant_days_threshold
            )));
        }
        if self.lookback_months == 0 {
            return Err(PipelineError::InvalidConfig(
                "lookback_months must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.quick_win_threshold) {
            return Err(PipelineError::InvalidConfig(format!(
                "quick_win_threshold must be within [0, 1], got {}",
                self.quick_win_threshold
            )));
        }
        if !self.high_value_threshold.is_finite() || self.high_value_threshold < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "high_value_threshold must be a non-negative amount, got {}",
                self.high_value_threshold
            )));
        }
        if self.chunk_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "chunk_size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Is this line item a real product rather than a fee, tax or credit?
    pub fn is_merchandise(&self, product: &str) -> bool {
        let name = product.trim().to_lowercase();
        if name.is_empty() || name == "unknown" {
            return false;
        }
        !self
            .excluded_product_keywords
            .iter()
            .any(|kw| name.contains(&kw.to_lowercase()))
    }

    pub fn is_wine_product(&self, product: &str) -> bool {
        let name = product.to_lowercase();
        self.wine_keywords
            .iter()
            .any(|kw| name.contains(&kw.to_lowercase()))
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            AnalysisConfig::from_json(r#"{ "dormant_days_threshold": 60 }"#).unwrap();
        assert_eq!(config.dormant_days_threshold, 60);
        assert_eq!(config.lookback_months, 6);
        assert!((config.quick_win_threshold - 0.7).abs() < 1e-9);
        assert!(config.reference_date.is_none());
    }

    #[test]
    fn reference_date_parses_from_iso_string() {
        let config =
            AnalysisConfig::from_json(r#"{ "reference_date": "2025-06-01" }"#).unwrap();
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2025, 6, 1));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(AnalysisConfig::from_json(r#"{ "dormant_days_threshold": 0 }"#).is_err());
        assert!(AnalysisConfig::from_json(r#"{ "quick_win_threshold": 1.5 }"#).is_err());
        assert!(AnalysisConfig::from_json(r#"{ "chunk_size": 0 }"#).is_err());
        let huge = AnalysisConfig::from_json(r#"{ "dormant_days_threshold": 200000000000000 }"#);
        assert!(matches!(huge, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "high_value_threshold": 3000 }}"#).unwrap();
        let config = AnalysisConfig::from_json_file(file.path()).unwrap();
        assert!((config.high_value_threshold - 3000.0).abs() < 1e-9);
    }

    #[test]
    fn merchandise_excludes_admin_lines() {
        let config = AnalysisConfig::default();
        assert!(config.is_merchandise("Cabernet Sauvignon 2019"));
        assert!(!config.is_merchandise("Shipping & Handling"));
        assert!(!config.is_merchandise("Delivery FEE"));
        assert!(!config.is_merchandise("Sales Tax"));
        assert!(!config.is_merchandise("  "));
        assert!(!config.is_merchandise("Unknown"));
    }

    #[test]
    fn wine_keywords_match_varietals() {
        let config = AnalysisConfig::default();
        assert!(config.is_wine_product("Napa Cabernet 2018"));
        assert!(config.is_wine_product("House Red Blend"));
        assert!(!config.is_wine_product("Gift Basket"));
    }
}
