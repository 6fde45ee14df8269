//! Prelude for commonly used types and traits in aq-guard.

pub use crate::config::ValidatorConfig;
pub use crate::core::{DataValidator, Level, ValidationReport};
pub use crate::error::{AqError, ErrorContext, Result};
pub use crate::formatters::{generate_report, FormatterConfig, ReportFormatter};
pub use crate::logging::LogConfig;
pub use crate::sources::DataSource;
