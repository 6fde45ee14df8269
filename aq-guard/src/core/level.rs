//! Finding severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity of a data-quality finding.
///
/// Levels are ordered by severity: `Error > Warning`. Only `Error` findings
/// fail a validation run.
///
/// ```rust
/// use aq_guard::core::Level;
///
/// assert!(Level::Error > Level::Warning);
/// assert!(Level::Error.is_blocking());
/// assert!(!Level::Warning.is_blocking());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Recorded in the report, does not block downstream processing
    #[default]
    Warning = 1,
    /// Fails the validation run
    Error = 2,
}

impl Level {
    /// Returns the string representation of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }

    /// Returns true if a finding at this level fails validation.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Level::Error)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
