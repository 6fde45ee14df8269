//! The check trait implemented by every validation rule.

use super::ReportBuilder;
use crate::prelude::*;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use std::fmt::Debug;

/// A data-quality check run against the table in the current
/// [`ValidationContext`](crate::core::ValidationContext).
///
/// Checks are stateless: everything they need is fixed at construction or
/// read from the context, and findings go into the supplied builder. A check
/// that finds nothing to look at (an absent optional column, too few values)
/// simply records nothing.
///
/// # Examples
///
/// ```rust
/// use aq_guard::core::{current_validation_context, QualityCheck, ReportBuilder};
/// use aq_guard::prelude::*;
/// use async_trait::async_trait;
/// use datafusion::prelude::SessionContext;
///
/// #[derive(Debug)]
/// struct MinimumRows(u64);
///
/// #[async_trait]
/// impl QualityCheck for MinimumRows {
///     fn name(&self) -> &str {
///         "minimum_rows"
///     }
///
///     async fn run(&self, _ctx: &SessionContext, report: &mut ReportBuilder) -> Result<()> {
///         let rows = current_validation_context().total_rows();
///         if rows < self.0 {
///             report.warning(format!("Only {rows} rows, expected at least {}", self.0));
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait QualityCheck: Debug + Send + Sync {
    /// Returns the name of the check, used in logs.
    fn name(&self) -> &str;

    /// Runs the check and records its findings and statistics.
    ///
    /// Returns an error only for software faults, never for bad data.
    async fn run(&self, ctx: &SessionContext, report: &mut ReportBuilder) -> Result<()>;
}

/// A boxed check for use in collections.
pub type BoxedCheck = Box<dyn QualityCheck>;
