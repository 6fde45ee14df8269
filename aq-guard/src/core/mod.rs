//! Core validation types for the aq-guard data quality library.
//!
//! ## Overview
//!
//! - **[`DataValidator`]**: runs the standard checks over a registered table
//! - **[`QualityCheck`]**: the trait every check implements
//! - **[`SeverityRule`]** / **[`ThresholdRules`]**: the declarative
//!   percentage → severity table
//! - **[`ValidationReport`]**: the immutable result of one run
//! - **[`Level`]**: finding severity (`Warning`, `Error`)
//!
//! ## Architecture
//!
//! ```text
//! DataValidator (ValidatorConfig, fixed at construction)
//!     │  validate(ctx, table)
//!     ├── ValidationContext::load      schema + row count, scoped per run
//!     ├── StructureCheck ─┐
//!     ├── RangeCheck      │
//!     ├── MissingValueCheck            each appends to one ReportBuilder
//!     ├── DuplicateCheck  │
//!     ├── TemporalGapCheck│
//!     └── OutlierCheck ───┘
//!             │
//!             ▼
//!     ValidationReport (passed == errors.is_empty())
//! ```
//!
//! ## Example
//!
//! ```rust
//! use aq_guard::core::{DataValidator, Level};
//! use aq_guard::config::ValidatorConfig;
//! use datafusion::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = SessionContext::new();
//! ctx.sql(
//!     "CREATE TABLE data AS VALUES \
//!      ('Moscow', DATE '2023-01-01', 10.0, 20.0, 30.0, 5.0, 40.0)",
//! )
//! .await?;
//!
//! let config = ValidatorConfig::default().with_range("pm25", 0.0, 250.0);
//! let validator = DataValidator::new(config)?;
//! let report = validator.validate(&ctx, "data").await?;
//!
//! // The VALUES table has column1..column7, so the structure check fails.
//! assert!(!report.passed());
//! assert!(!report.findings(Level::Error).is_empty());
//! # Ok(())
//! # }
//! ```

pub mod check;
pub mod level;
pub mod report;
pub mod rules;
pub mod validation_context;
pub mod validator;

pub use check::{BoxedCheck, QualityCheck};
pub use level::Level;
pub use report::{OutlierStats, ReportBuilder, ReportStatistics, ValidationReport};
pub use rules::{
    SeverityRule, ThresholdRules, DUPLICATE_RULE, MISSING_RULE, OUTLIER_RULE, RANGE_RULE,
};
pub use validation_context::{current_validation_context, ValidationContext};
pub use validator::DataValidator;
