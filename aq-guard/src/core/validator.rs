//! The validator that runs the standard checks over a registered table.

use super::validation_context::CURRENT_CONTEXT;
use super::{BoxedCheck, Level, ReportBuilder, ValidationContext, ValidationReport};
use crate::checks::standard_checks;
use crate::config::ValidatorConfig;
use crate::log_check;
use crate::logging::{truncate_field, LogConfig};
use crate::prelude::*;
use crate::sources::{DataSource, MemorySource};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use datafusion::prelude::SessionContext;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Validates air-quality readings against a fixed configuration.
///
/// A validator holds no per-run state: [`validate`](Self::validate) builds a
/// fresh [`ValidationReport`] on every call and returns it, so one validator
/// can be shared between tasks and run concurrently.
///
/// # Examples
///
/// ```rust,no_run
/// use aq_guard::core::DataValidator;
/// use aq_guard::formatters::generate_report;
/// use datafusion::prelude::*;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let ctx = SessionContext::new();
/// ctx.register_csv("data", "readings.csv", CsvReadOptions::new()).await?;
///
/// let validator = DataValidator::default();
/// let report = validator.validate(&ctx, "data").await?;
/// println!("{}", generate_report(&report));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DataValidator {
    config: ValidatorConfig,
    checks: Vec<BoxedCheck>,
    log_config: LogConfig,
}

impl DataValidator {
    /// Creates a validator running the standard checks for `config`.
    ///
    /// Fails if the configuration is inconsistent.
    pub fn new(config: ValidatorConfig) -> Result<Self> {
        config.validate()?;
        let checks = standard_checks(&config);
        Ok(Self {
            config,
            checks,
            log_config: LogConfig::default(),
        })
    }

    /// Returns the configuration the validator was built with.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Returns the names of the checks, in run order.
    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Returns the logging configuration.
    pub fn log_config(&self) -> &LogConfig {
        &self.log_config
    }

    /// Sets the logging configuration.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Appends a check that runs after the standard ones.
    pub fn with_check(mut self, check: BoxedCheck) -> Self {
        self.checks.push(check);
        self
    }

    /// Validates the table registered under `table_name`.
    ///
    /// Bad data never produces an `Err`; it produces findings. An error means
    /// the table could not be read or a column has a type the checks cannot
    /// work with.
    #[instrument(skip(self, ctx), fields(
        validation.table = %table_name,
        validation.checks = self.checks.len()
    ))]
    pub async fn validate(
        &self,
        ctx: &SessionContext,
        table_name: &str,
    ) -> Result<ValidationReport> {
        let start_time = Instant::now();
        let validation_ctx = ValidationContext::load(ctx, table_name).await?;
        info!(
            validation.table = %table_name,
            validation.rows = validation_ctx.total_rows(),
            validation.columns = validation_ctx.schema().fields().len(),
            "Starting validation"
        );

        let mut report = ReportBuilder::new(table_name, validation_ctx.total_rows());
        CURRENT_CONTEXT
            .scope(validation_ctx, self.run_checks(ctx, &mut report))
            .await?;

        let report = report.finish(start_time.elapsed());
        for level in [Level::Error, Level::Warning] {
            for finding in report.findings(level) {
                log_check!(
                    self.log_config,
                    finding.level = %level,
                    finding.message = %log_finding(&self.log_config, finding),
                    "Finding"
                );
            }
        }
        info!(
            validation.table = %table_name,
            validation.passed = report.passed(),
            validation.errors = report.errors().len(),
            validation.warnings = report.warnings().len(),
            validation.duration_ms = report.execution_time_ms(),
            "Validation completed"
        );
        Ok(report)
    }

    async fn run_checks(&self, ctx: &SessionContext, report: &mut ReportBuilder) -> Result<()> {
        for check in &self.checks {
            let check_start = Instant::now();
            let findings_before = report.finding_count();
            debug!(check.name = %check.name(), "Running check");

            if let Err(e) = check.run(ctx, report).await {
                error!(check.name = %check.name(), error = %e, "Check failed to execute");
                return Err(e);
            }

            log_check!(
                self.log_config,
                check.name = %check.name(),
                check.findings = report.finding_count() - findings_before,
                check.duration_ms = check_start.elapsed().as_millis() as u64,
                "Check completed"
            );
        }
        Ok(())
    }

    /// Validates in-memory batches, registered under the table name `data`.
    ///
    /// The schema is passed separately so that an empty dataset still has
    /// columns.
    pub async fn validate_batches(
        &self,
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
    ) -> Result<ValidationReport> {
        let ctx = SessionContext::new();
        MemorySource::new(schema, batches)
            .register(&ctx, "data")
            .await?;
        self.validate(&ctx, "data").await
    }
}

impl Default for DataValidator {
    fn default() -> Self {
        let config = ValidatorConfig::default();
        Self {
            checks: standard_checks(&config),
            config,
            log_config: LogConfig::default(),
        }
    }
}

/// Truncates a finding for structured logs.
pub(crate) fn log_finding(log_config: &LogConfig, finding: &str) -> String {
    truncate_field(finding, log_config.max_field_length)
}
