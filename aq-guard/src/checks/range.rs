//! Valid-range check for pollutant parameters.

use super::support::{display_bound, present_predicate, query_counts, require_numeric};
use crate::config::ParameterRange;
use crate::core::{
    current_validation_context, report::percentage, QualityCheck, ReportBuilder, SeverityRule,
};
use crate::prelude::*;
use crate::security::SqlSecurity;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use tracing::{debug, instrument};

/// Counts present values outside each parameter's inclusive range.
///
/// The percentage is taken over all rows of the table, so a column that is
/// mostly missing yields a small out-of-range percentage. Parameters without
/// a column are skipped.
#[derive(Debug, Clone)]
pub struct RangeCheck {
    ranges: Vec<ParameterRange>,
    rule: SeverityRule,
}

impl RangeCheck {
    /// Creates the check for the given ranges.
    pub fn new(ranges: Vec<ParameterRange>, rule: SeverityRule) -> Self {
        Self { ranges, rule }
    }
}

#[async_trait]
impl QualityCheck for RangeCheck {
    fn name(&self) -> &str {
        "value_range"
    }

    #[instrument(skip_all, fields(check.name = "value_range", check.ranges = self.ranges.len()))]
    async fn run(&self, ctx: &SessionContext, report: &mut ReportBuilder) -> Result<()> {
        let validation_ctx = current_validation_context();

        let mut present = Vec::new();
        let mut select = Vec::new();
        for range in &self.ranges {
            let Some(data_type) = validation_ctx.column_type(&range.parameter) else {
                debug!(column = %range.parameter, "Parameter absent, skipping range check");
                continue;
            };
            require_numeric(&range.parameter, data_type)?;

            let column = SqlSecurity::escape_identifier(&range.parameter)?;
            let min = SqlSecurity::float_literal(range.min, "min")?;
            let max = SqlSecurity::float_literal(range.max, "max")?;
            let is_present = present_predicate(&column, data_type);
            select.push(format!(
                "CAST(COALESCE(SUM(CASE WHEN {is_present} AND ({column} < {min} OR {column} > {max}) THEN 1 ELSE 0 END), 0) AS BIGINT)"
            ));
            present.push(range);
        }

        if present.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "SELECT {} FROM {}",
            select.join(", "),
            validation_ctx.table_ref()
        );
        let counts = query_counts(ctx, &sql).await?;

        let total_rows = validation_ctx.total_rows();
        for (range, count) in present.into_iter().zip(counts) {
            let pct = percentage(count, total_rows);
            debug!(
                column = %range.parameter,
                out_of_range = count,
                pct,
                "Range check computed"
            );
            if let Some(level) = self.rule.classify(pct) {
                report.push(
                    level,
                    format!(
                        "{}: {count} values ({pct:.2}%) outside range [{}, {}]",
                        range.parameter,
                        display_bound(range.min),
                        display_bound(range.max)
                    ),
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RANGE_RULE;
    use crate::test_fixtures::{clean_readings, run_check, TableBuilder, PM25};

    fn pm25_range() -> Vec<ParameterRange> {
        vec![ParameterRange::new("pm25", 0.0, 500.0)]
    }

    #[tokio::test]
    async fn test_values_in_range() {
        let ctx = clean_readings().context();
        let ranges = crate::config::ValidatorConfig::default().valid_ranges;
        let check = RangeCheck::new(ranges, RANGE_RULE);
        let report = run_check(&check, &ctx).await;
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_ten_percent_out_of_range_is_error() {
        let mut values = PM25;
        values[0] = 600.0;
        let ctx = TableBuilder::new().floats("pm25", &values).context();

        let report = run_check(&RangeCheck::new(pm25_range(), RANGE_RULE), &ctx).await;
        assert!(!report.passed());
        assert_eq!(
            report.errors(),
            ["pm25: 1 values (10.00%) outside range [0, 500]"]
        );
        assert!(report.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_small_share_out_of_range_is_warning() {
        let mut values = vec![10.0; 40];
        values[3] = -1.0;
        let ctx = TableBuilder::new().floats("pm25", &values).context();

        let report = run_check(&RangeCheck::new(pm25_range(), RANGE_RULE), &ctx).await;
        assert!(report.passed());
        assert_eq!(
            report.warnings(),
            ["pm25: 1 values (2.50%) outside range [0, 500]"]
        );
    }

    #[tokio::test]
    async fn test_bounds_are_inclusive() {
        let ctx = TableBuilder::new()
            .floats("pm25", &[0.0, 500.0, 250.0])
            .context();
        let report = run_check(&RangeCheck::new(pm25_range(), RANGE_RULE), &ctx).await;
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_missing_values_not_counted() {
        let ctx = TableBuilder::new()
            .nullable("pm25", &[Some(10.0), None, Some(f64::NAN), Some(20.0)])
            .context();
        let report = run_check(&RangeCheck::new(pm25_range(), RANGE_RULE), &ctx).await;
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_denominator_is_total_rows() {
        // 1 of 2 present values is out of range, but 1 of 40 rows.
        let mut values = vec![None; 40];
        values[0] = Some(10.0);
        values[1] = Some(900.0);
        let ctx = TableBuilder::new().nullable("pm25", &values).context();

        let report = run_check(&RangeCheck::new(pm25_range(), RANGE_RULE), &ctx).await;
        assert!(report.passed());
        assert_eq!(
            report.warnings(),
            ["pm25: 1 values (2.50%) outside range [0, 500]"]
        );
    }

    #[tokio::test]
    async fn test_absent_parameter_skipped() {
        let ctx = TableBuilder::new().floats("pm10", &[5000.0]).context();
        let report = run_check(&RangeCheck::new(pm25_range(), RANGE_RULE), &ctx).await;
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_ranges_reported_in_configured_order() {
        let ctx = TableBuilder::new()
            .floats("uv", &[20.0, 1.0])
            .floats("pm25", &[-5.0, 1.0])
            .context();
        let ranges = vec![
            ParameterRange::new("pm25", 0.0, 500.0),
            ParameterRange::new("uv", 0.0, 15.0),
        ];
        let report = run_check(&RangeCheck::new(ranges, RANGE_RULE), &ctx).await;
        assert_eq!(
            report.errors(),
            [
                "pm25: 1 values (50.00%) outside range [0, 500]",
                "uv: 1 values (50.00%) outside range [0, 15]",
            ]
        );
    }

    #[tokio::test]
    async fn test_text_column_is_type_error() {
        let ctx = TableBuilder::new()
            .strings("pm25", &[Some("12"), Some("N/A")])
            .context();
        let validation_ctx = crate::core::ValidationContext::load(&ctx, "data")
            .await
            .unwrap();
        let mut builder = ReportBuilder::new("data", 2);
        let result = crate::core::validation_context::CURRENT_CONTEXT
            .scope(
                validation_ctx,
                RangeCheck::new(pm25_range(), RANGE_RULE).run(&ctx, &mut builder),
            )
            .await;
        assert!(matches!(result, Err(AqError::TypeMismatch { .. })));
    }
}
