//! Validation report types.

use super::Level;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// IQR outlier summary for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierStats {
    /// Number of values outside the bounds
    pub count: u64,
    /// Outliers as a percentage of non-missing values
    pub percentage: f64,
    /// `(Q1 - k·IQR, Q3 + k·IQR)`
    pub bounds: (f64, f64),
}

/// Structured results recorded by the checks, keyed by check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportStatistics {
    /// Missing-value count for every column of the dataset
    pub missing_values: BTreeMap<String, u64>,
    /// Rows participating in a duplicate `(city, date)` key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicates: Option<u64>,
    /// Cities with at least one large temporal gap, and how many
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub temporal_gaps: BTreeMap<String, u64>,
    /// Parameters with at least one IQR outlier
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outliers: BTreeMap<String, OutlierStats>,
}

impl ReportStatistics {
    /// Returns true if no check recorded anything.
    pub fn is_empty(&self) -> bool {
        self.missing_values.is_empty()
            && self.duplicates.is_none()
            && self.temporal_gaps.is_empty()
            && self.outliers.is_empty()
    }
}

/// The outcome of one validation run.
///
/// A report is only produced by [`DataValidator`](crate::core::DataValidator)
/// and cannot be modified afterwards; `passed()` is always equal to
/// `errors().is_empty()`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub(crate) dataset: String,
    pub(crate) timestamp: String,
    pub(crate) total_rows: u64,
    pub(crate) passed: bool,
    pub(crate) errors: Vec<String>,
    pub(crate) warnings: Vec<String>,
    pub(crate) statistics: ReportStatistics,
    pub(crate) execution_time_ms: u64,
}

impl ValidationReport {
    /// Name of the validated table.
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// When the run started (RFC 3339).
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Number of rows in the validated table.
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// True iff no finding was classified as an error.
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Blocking findings, in check order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Non-blocking findings, in check order.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Structured per-check results.
    pub fn statistics(&self) -> &ReportStatistics {
        &self.statistics
    }

    /// Wall-clock duration of the run.
    pub fn execution_time_ms(&self) -> u64 {
        self.execution_time_ms
    }

    /// Returns the findings at a given level.
    pub fn findings(&self, level: Level) -> &[String] {
        match level {
            Level::Error => &self.errors,
            Level::Warning => &self.warnings,
        }
    }

    /// Returns true if there are neither errors nor warnings.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Accumulates findings while the checks run.
///
/// Checks receive a `&mut ReportBuilder`; the validator turns it into an
/// immutable [`ValidationReport`] once every check has run.
#[derive(Debug)]
pub struct ReportBuilder {
    dataset: String,
    timestamp: String,
    total_rows: u64,
    errors: Vec<String>,
    warnings: Vec<String>,
    statistics: ReportStatistics,
}

impl ReportBuilder {
    pub(crate) fn new(dataset: impl Into<String>, total_rows: u64) -> Self {
        Self {
            dataset: dataset.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            total_rows,
            errors: Vec::new(),
            warnings: Vec::new(),
            statistics: ReportStatistics::default(),
        }
    }

    /// Number of rows in the table being validated.
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// Records a finding at the given level.
    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        match level {
            Level::Error => self.errors.push(message.into()),
            Level::Warning => self.warnings.push(message.into()),
        }
    }

    /// Records a blocking finding.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    /// Records a non-blocking finding.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Level::Warning, message);
    }

    /// Mutable access to the statistics section.
    pub fn statistics_mut(&mut self) -> &mut ReportStatistics {
        &mut self.statistics
    }

    /// Number of findings recorded so far, errors and warnings together.
    pub fn finding_count(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    pub(crate) fn finish(self, elapsed: Duration) -> ValidationReport {
        ValidationReport {
            passed: self.errors.is_empty(),
            dataset: self.dataset,
            timestamp: self.timestamp,
            total_rows: self.total_rows,
            errors: self.errors,
            warnings: self.warnings,
            statistics: self.statistics,
            execution_time_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Percentage of `part` in `whole`; NaN when `whole` is zero.
pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        f64::NAN
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_tracks_errors() {
        let mut builder = ReportBuilder::new("data", 10);
        builder.warning("pm25: 1 values (10.00%) outside range [0, 500]");
        let report = builder.finish(Duration::from_millis(3));
        assert!(report.passed());
        assert_eq!(report.warnings().len(), 1);
        assert!(!report.is_clean());

        let mut builder = ReportBuilder::new("data", 10);
        builder.push(Level::Error, "Dataset is empty");
        let report = builder.finish(Duration::ZERO);
        assert!(!report.passed());
        assert_eq!(report.findings(Level::Error), ["Dataset is empty"]);
    }

    #[test]
    fn test_statistics_serialization_skips_empty_sections() {
        let mut builder = ReportBuilder::new("data", 2);
        builder
            .statistics_mut()
            .missing_values
            .insert("pm25".to_string(), 0);
        let report = builder.finish(Duration::ZERO);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["passed"], true);
        assert_eq!(json["statistics"]["missing_values"]["pm25"], 0);
        assert!(json["statistics"].get("duplicates").is_none());
        assert!(json["statistics"].get("outliers").is_none());
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 10), 10.0);
        assert!(percentage(1, 0).is_nan());
    }
}
