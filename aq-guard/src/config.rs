//! Validator configuration.
//!
//! [`ValidatorConfig`] is fixed when a [`DataValidator`](crate::core::DataValidator)
//! is built. The defaults describe daily pollutant readings in µg/m³; a
//! deployment can override any part of it from a JSON file:
//!
//! ```json
//! {
//!   "valid_ranges": [{"parameter": "pm25", "min": 0.0, "max": 300.0}],
//!   "rules": {"missing": {"error_above": 30.0, "warning_above": 10.0}},
//!   "max_gap_days": 14
//! }
//! ```
//!
//! Keys that are left out keep their defaults. Note that `valid_ranges`
//! replaces the whole list.

use crate::core::ThresholdRules;
use crate::prelude::*;
use crate::security::SqlSecurity;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Name of the city column.
pub const CITY_COLUMN: &str = "city";

/// Name of the date column.
pub const DATE_COLUMN: &str = "date";

/// An inclusive range of acceptable values for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    /// Column holding the parameter
    pub parameter: String,
    /// Smallest acceptable value
    pub min: f64,
    /// Largest acceptable value
    pub max: f64,
}

impl ParameterRange {
    /// Creates a range for a parameter.
    pub fn new(parameter: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            parameter: parameter.into(),
            min,
            max,
        }
    }
}

/// Immutable configuration of the standard checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Valid ranges, checked in this order
    pub valid_ranges: Vec<ParameterRange>,
    /// Columns every dataset must have
    pub required_columns: Vec<String>,
    /// Percentage thresholds for each check
    pub rules: ThresholdRules,
    /// Consecutive readings further apart than this many days form a gap
    pub max_gap_days: i64,
    /// Parameters screened for IQR outliers
    pub outlier_columns: Vec<String>,
    /// IQR multiplier for the outlier bounds
    pub outlier_iqr_multiplier: f64,
    /// Minimum number of non-missing values before outliers are computed
    pub outlier_min_samples: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            valid_ranges: vec![
                ParameterRange::new("pm25", 0.0, 500.0),
                ParameterRange::new("pm10", 0.0, 1000.0),
                ParameterRange::new("no2", 0.0, 400.0),
                ParameterRange::new("so2", 0.0, 1000.0),
                ParameterRange::new("o3", 0.0, 500.0),
                ParameterRange::new("co", 0.0, 50000.0),
                ParameterRange::new("nh3", 0.0, 500.0),
                ParameterRange::new("dust", 0.0, 2000.0),
                ParameterRange::new("uv", 0.0, 15.0),
            ],
            required_columns: [CITY_COLUMN, DATE_COLUMN, "pm25", "pm10", "no2", "so2", "o3"]
                .into_iter()
                .map(String::from)
                .collect(),
            rules: ThresholdRules::default(),
            max_gap_days: 7,
            outlier_columns: ["pm25", "pm10", "no2", "so2", "o3"]
                .into_iter()
                .map(String::from)
                .collect(),
            outlier_iqr_multiplier: 3.0,
            outlier_min_samples: 10,
        }
    }
}

impl ValidatorConfig {
    /// Parses a configuration from JSON and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file and validates it.
    #[instrument]
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        debug!(
            config.path = %path.display(),
            config.ranges = config.valid_ranges.len(),
            config.required = config.required_columns.len(),
            "Loaded validator configuration"
        );
        Ok(config)
    }

    /// Replaces the range for a parameter, or appends it.
    pub fn with_range(mut self, parameter: impl Into<String>, min: f64, max: f64) -> Self {
        let range = ParameterRange::new(parameter, min, max);
        match self
            .valid_ranges
            .iter_mut()
            .find(|r| r.parameter == range.parameter)
        {
            Some(existing) => *existing = range,
            None => self.valid_ranges.push(range),
        }
        self
    }

    /// Sets the required columns.
    pub fn with_required_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the threshold rules.
    pub fn with_rules(mut self, rules: ThresholdRules) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the gap length, in days, above which a temporal gap is reported.
    pub fn with_max_gap_days(mut self, days: i64) -> Self {
        self.max_gap_days = days;
        self
    }

    /// Returns the range configured for a parameter.
    pub fn range_for(&self, parameter: &str) -> Option<&ParameterRange> {
        self.valid_ranges.iter().find(|r| r.parameter == parameter)
    }

    /// Checks the configuration for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.required_columns.is_empty() {
            return Err(AqError::Configuration(
                "At least one required column must be configured".to_string(),
            ));
        }

        let columns = self
            .valid_ranges
            .iter()
            .map(|r| r.parameter.as_str())
            .chain(self.required_columns.iter().map(String::as_str))
            .chain(self.outlier_columns.iter().map(String::as_str));
        for column in columns {
            SqlSecurity::validate_identifier(column).map_err(|e| {
                AqError::Configuration(format!("Invalid column name '{column}': {e}"))
            })?;
        }

        for range in &self.valid_ranges {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(AqError::Configuration(format!(
                    "Invalid range for '{}': [{}, {}]",
                    range.parameter, range.min, range.max
                )));
            }
        }

        for (name, rule) in self.rules.entries() {
            let bounds = rule.error_above.iter().chain(rule.warning_above.iter());
            for bound in bounds {
                if !bound.is_finite() || *bound < 0.0 {
                    return Err(AqError::Configuration(format!(
                        "Threshold for '{name}' must be a finite, non-negative percentage, got {bound}"
                    )));
                }
            }
        }

        if self.rules.duplicates.can_fail() || self.rules.outliers.can_fail() {
            return Err(AqError::Configuration(
                "Duplicate and outlier findings are warnings only; remove error_above from those rules"
                    .to_string(),
            ));
        }

        if self.max_gap_days < 1 {
            return Err(AqError::Configuration(format!(
                "max_gap_days must be at least 1, got {}",
                self.max_gap_days
            )));
        }

        if !self.outlier_iqr_multiplier.is_finite() || self.outlier_iqr_multiplier <= 0.0 {
            return Err(AqError::Configuration(format!(
                "outlier_iqr_multiplier must be positive, got {}",
                self.outlier_iqr_multiplier
            )));
        }

        if self.outlier_min_samples < 2 {
            return Err(AqError::Configuration(
                "outlier_min_samples must be at least 2".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SeverityRule;

    #[test]
    fn test_default_config_is_valid() {
        let config = ValidatorConfig::default();
        config.validate().unwrap();
        assert_eq!(config.valid_ranges.len(), 9);
        assert_eq!(
            config.required_columns,
            ["city", "date", "pm25", "pm10", "no2", "so2", "o3"]
        );
        assert_eq!(config.range_for("uv"), Some(&ParameterRange::new("uv", 0.0, 15.0)));
        assert_eq!(config.max_gap_days, 7);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ValidatorConfig::from_json_str(
            r#"{"max_gap_days": 14, "rules": {"range": {"error_above": 1.0, "warning_above": 0.0}}}"#,
        )
        .unwrap();
        assert_eq!(config.max_gap_days, 14);
        assert_eq!(config.rules.range.error_above, Some(1.0));
        assert_eq!(config.valid_ranges.len(), 9);
        assert_eq!(config.outlier_min_samples, 10);
    }

    #[test]
    fn test_with_range_replaces_existing() {
        let config = ValidatorConfig::default()
            .with_range("pm25", 0.0, 250.0)
            .with_range("benzene", 0.0, 50.0);
        assert_eq!(config.range_for("pm25").unwrap().max, 250.0);
        assert_eq!(config.valid_ranges.len(), 10);
        assert_eq!(config.valid_ranges[0].parameter, "pm25");
    }

    #[test]
    fn test_rejects_inverted_range() {
        let config = ValidatorConfig::default().with_range("pm25", 10.0, 1.0);
        assert!(matches!(config.validate(), Err(AqError::Configuration(_))));
    }

    #[test]
    fn test_rejects_unsafe_column_names() {
        let config = ValidatorConfig::default().with_required_columns(["city", "pm25; --"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_blocking_outlier_rule() {
        let mut rules = ThresholdRules::default();
        rules.outliers = SeverityRule::new(Some(50.0), Some(10.0));
        let config = ValidatorConfig::default().with_rules(rules);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_threshold_and_gap() {
        let mut rules = ThresholdRules::default();
        rules.missing = SeverityRule::new(Some(-1.0), Some(5.0));
        assert!(ValidatorConfig::default().with_rules(rules).validate().is_err());
        assert!(ValidatorConfig::default()
            .with_max_gap_days(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validator.json");
        std::fs::write(&path, r#"{"required_columns": ["city", "date", "pm25"]}"#).unwrap();

        let config = ValidatorConfig::from_json_file(&path).unwrap();
        assert_eq!(config.required_columns, ["city", "date", "pm25"]);

        let missing = ValidatorConfig::from_json_file(&dir.path().join("absent.json"));
        assert!(matches!(missing, Err(AqError::Io(_))));
    }
}
