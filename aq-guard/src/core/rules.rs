//! Declarative percentage thresholds.
//!
//! Every percentage-based check maps its measured percentage to a severity
//! through a [`SeverityRule`]. The rules live together in [`ThresholdRules`]
//! so the whole rule set can be audited, serialized and overridden from one
//! place.

use super::Level;
use serde::{Deserialize, Serialize};

/// Maps a percentage to a finding severity.
///
/// Both bounds are exclusive: a percentage equal to `error_above` is a
/// warning, not an error. A bound set to `None` disables that severity.
///
/// ```rust
/// use aq_guard::core::{Level, SeverityRule};
///
/// let rule = SeverityRule::new(Some(20.0), Some(5.0));
/// assert_eq!(rule.classify(30.0), Some(Level::Error));
/// assert_eq!(rule.classify(20.0), Some(Level::Warning));
/// assert_eq!(rule.classify(5.0), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityRule {
    /// Percentages strictly above this are errors
    pub error_above: Option<f64>,
    /// Percentages strictly above this (and not errors) are warnings
    pub warning_above: Option<f64>,
}

impl SeverityRule {
    /// Creates a rule from its two bounds.
    pub const fn new(error_above: Option<f64>, warning_above: Option<f64>) -> Self {
        Self {
            error_above,
            warning_above,
        }
    }

    /// Creates a rule that can only ever produce warnings.
    pub const fn warning_only(warning_above: f64) -> Self {
        Self::new(None, Some(warning_above))
    }

    /// Classifies a percentage. Non-finite input (a zero denominator)
    /// produces no finding.
    pub fn classify(&self, pct: f64) -> Option<Level> {
        if !pct.is_finite() {
            return None;
        }
        if let Some(limit) = self.error_above {
            if pct > limit {
                return Some(Level::Error);
            }
        }
        match self.warning_above {
            Some(limit) if pct > limit => Some(Level::Warning),
            _ => None,
        }
    }

    /// Returns true if this rule can emit blocking findings.
    pub fn can_fail(&self) -> bool {
        self.error_above.is_some()
    }
}

/// Out-of-range values: more than 5% is an error, any is a warning.
pub const RANGE_RULE: SeverityRule = SeverityRule::new(Some(5.0), Some(0.0));

/// Missing values: more than 20% is an error, more than 5% a warning.
pub const MISSING_RULE: SeverityRule = SeverityRule::new(Some(20.0), Some(5.0));

/// Duplicate `(city, date)` keys: any is a warning.
pub const DUPLICATE_RULE: SeverityRule = SeverityRule::warning_only(0.0);

/// IQR outliers: more than 10% of non-missing values is a warning.
pub const OUTLIER_RULE: SeverityRule = SeverityRule::warning_only(10.0);

/// The complete rule table used by the standard checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdRules {
    /// Out-of-range values, as a percentage of all rows
    pub range: SeverityRule,
    /// Missing values in required columns, as a percentage of all rows
    pub missing: SeverityRule,
    /// Rows sharing a `(city, date)` key, as a percentage of all rows
    pub duplicates: SeverityRule,
    /// IQR outliers, as a percentage of non-missing values
    pub outliers: SeverityRule,
}

impl Default for ThresholdRules {
    fn default() -> Self {
        Self {
            range: RANGE_RULE,
            missing: MISSING_RULE,
            duplicates: DUPLICATE_RULE,
            outliers: OUTLIER_RULE,
        }
    }
}

impl ThresholdRules {
    /// Returns the rules keyed by the check that applies them.
    pub fn entries(&self) -> [(&'static str, SeverityRule); 4] {
        [
            ("range", self.range),
            ("missing", self.missing),
            ("duplicates", self.duplicates),
            ("outliers", self.outliers),
        ]
    }
}
