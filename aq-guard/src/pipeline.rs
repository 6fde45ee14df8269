//! The validation gate of the processing pipeline.
//!
//! Downstream stages (analysis, forecasting) run only when
//! [`validate_data_pipeline`] reports `passed`.

use crate::core::{DataValidator, ValidationReport};
use crate::formatters::ReportFormatter;
use crate::log_data_op;
use crate::prelude::*;
use crate::security::SqlSecurity;
use crate::sources::DataSource;
use datafusion::prelude::SessionContext;
use tracing::{info, instrument, warn};

/// What the pipeline gate decided, and why.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Whether downstream processing may continue
    pub passed: bool,
    /// The validation report, absent when there was no data to validate
    pub report: Option<ValidationReport>,
    /// The rendered report, or a notice that there was no data
    pub rendered: String,
}

/// Registers `source` as `table_name`, validates it and renders the report.
///
/// An empty table fails the gate without running the checks.
///
/// ```rust,no_run
/// use aq_guard::core::DataValidator;
/// use aq_guard::formatters::TextFormatter;
/// use aq_guard::pipeline::validate_data_pipeline;
/// use aq_guard::sources::CsvSource;
/// use datafusion::prelude::SessionContext;
///
/// # async fn example() -> aq_guard::prelude::Result<()> {
/// let ctx = SessionContext::new();
/// let source = CsvSource::new("data/processed/air_quality_clean.csv")?;
/// let outcome = validate_data_pipeline(
///     &ctx,
///     &source,
///     "data",
///     &DataValidator::default(),
///     &TextFormatter::new(),
/// )
/// .await?;
/// println!("{}", outcome.rendered);
/// if !outcome.passed {
///     return Ok(());
/// }
/// # Ok(())
/// # }
/// ```
#[instrument(skip_all, fields(
    pipeline.table = %table_name,
    pipeline.source = %source.description()
))]
pub async fn validate_data_pipeline(
    ctx: &SessionContext,
    source: &dyn DataSource,
    table_name: &str,
    validator: &DataValidator,
    formatter: &dyn ReportFormatter,
) -> Result<PipelineOutcome> {
    source.register(ctx, table_name).await?;

    let table_ref = SqlSecurity::escape_identifier(table_name)?;
    let rows = ctx.table(table_ref.as_str()).await?.count().await?;
    log_data_op!(
        validator.log_config(),
        pipeline.table = %table_name,
        pipeline.source = %source.description(),
        pipeline.rows = rows,
        "Loaded data for validation"
    );
    if rows == 0 {
        warn!(pipeline.table = %table_name, "No data to validate");
        return Ok(PipelineOutcome {
            passed: false,
            report: None,
            rendered: format!("⚠️  No data to validate in '{table_name}'"),
        });
    }

    let report = validator.validate(ctx, table_name).await?;
    let rendered = formatter.format(&report)?;
    info!(
        pipeline.table = %table_name,
        pipeline.passed = report.passed(),
        "Pipeline validation gate evaluated"
    );

    Ok(PipelineOutcome {
        passed: report.passed(),
        report: Some(report),
        rendered,
    })
}
