//! # aq-guard - Data Quality Validation for Air-Quality Readings
//!
//! aq-guard validates a table of daily air-quality readings (one row per city
//! and calendar day) before it is handed to analysis or forecasting. It runs a
//! fixed set of rule-based checks through DataFusion and produces a
//! [`ValidationReport`](core::ValidationReport) that separates blocking errors
//! from advisory warnings.
//!
//! ## Quick Start
//!
//! ```rust
//! use aq_guard::core::DataValidator;
//! use aq_guard::formatters::generate_report;
//! use datafusion::prelude::*;
//!
//! # async fn example() -> aq_guard::prelude::Result<()> {
//! let ctx = SessionContext::new();
//! ctx.sql(
//!     "CREATE VIEW readings AS \
//!      SELECT column1 AS city, column2 AS date, column3 AS pm25, column4 AS pm10, \
//!             column5 AS no2, column6 AS so2, column7 AS o3 \
//!      FROM (VALUES \
//!        ('Moscow', DATE '2023-01-01', 12.0, 20.0, 30.0, 5.0, 40.0), \
//!        ('Moscow', DATE '2023-01-02', 14.0, 22.0, 31.0, 6.0, 41.0))",
//! )
//! .await?;
//!
//! let validator = DataValidator::default();
//! let report = validator.validate(&ctx, "readings").await?;
//!
//! assert!(report.passed());
//! println!("{}", generate_report(&report));
//! # Ok(())
//! # }
//! # tokio::runtime::Runtime::new().unwrap().block_on(example()).unwrap();
//! ```
//!
//! ## Checks
//!
//! | Check | Finding | Level |
//! |-------|---------|-------|
//! | `structure` | required columns missing, empty dataset | error |
//! | `value_range` | values outside the configured range | error above 5%, warning otherwise |
//! | `missing_values` | NULL or NaN in a required column | error above 20%, warning above 5% |
//! | `duplicates` | repeated `(city, date)` pairs | warning |
//! | `temporal_gaps` | consecutive readings too far apart | warning |
//! | `outliers` | IQR outliers | warning above 10% |
//!
//! Every check runs even when an earlier one fails, so a single report lists
//! every problem. Thresholds, ranges and the gap limit come from
//! [`ValidatorConfig`](config::ValidatorConfig).
//!
//! ## Data Sources
//!
//! The [`sources`] module registers data as DataFusion tables:
//!
//! - CSV files (single files, lists and glob patterns)
//! - Newline-delimited JSON exports
//! - In-memory Arrow record batches
//! - Daily aggregation of hourly readings
//!
//! ## Architecture
//!
//! - **`core`**: the [`DataValidator`](core::DataValidator), the report and the check seam
//! - **`checks`**: the standard quality checks
//! - **`config`**: validator configuration
//! - **`sources`**: data source connectors
//! - **`formatters`**: text, JSON and Markdown report rendering
//! - **`pipeline`**: the validation gate of the processing pipeline
//! - **`security`**: SQL identifier validation and escaping
//! - **`logging`**: structured logging helpers

pub mod checks;
pub mod config;
pub mod core;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod pipeline;
pub mod prelude;
pub mod security;
pub mod sources;

#[cfg(test)]
mod test_fixtures;
