//! Missing-value check.

use super::support::{present_predicate, query_counts};
use crate::core::{
    current_validation_context, report::percentage, QualityCheck, ReportBuilder, SeverityRule,
};
use crate::prelude::*;
use crate::security::SqlSecurity;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use tracing::{debug, instrument};

/// Counts missing values (NULL, or NaN in float columns) per column.
///
/// Counts are recorded in `statistics.missing_values` for every column of
/// the table; only required columns are classified into findings.
#[derive(Debug, Clone)]
pub struct MissingValueCheck {
    required_columns: Vec<String>,
    rule: SeverityRule,
}

impl MissingValueCheck {
    pub fn new(required_columns: Vec<String>, rule: SeverityRule) -> Self {
        Self {
            required_columns,
            rule,
        }
    }
}

#[async_trait]
impl QualityCheck for MissingValueCheck {
    fn name(&self) -> &str {
        "missing_values"
    }

    #[instrument(skip_all, fields(check.name = "missing_values"))]
    async fn run(&self, ctx: &SessionContext, report: &mut ReportBuilder) -> Result<()> {
        let validation_ctx = current_validation_context();
        let fields = validation_ctx.schema().fields();
        if fields.is_empty() {
            return Ok(());
        }

        let select = fields
            .iter()
            .map(|field| {
                let column = SqlSecurity::quote_schema_identifier(field.name())?;
                let is_present = present_predicate(&column, field.data_type());
                Ok(format!(
                    "CAST(COALESCE(SUM(CASE WHEN {is_present} THEN 0 ELSE 1 END), 0) AS BIGINT)"
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let sql = format!(
            "SELECT {} FROM {}",
            select.join(", "),
            validation_ctx.table_ref()
        );
        let counts = query_counts(ctx, &sql).await?;

        let missing_values = &mut report.statistics_mut().missing_values;
        for (field, count) in fields.iter().zip(&counts) {
            missing_values.insert(field.name().clone(), *count);
        }

        let total_rows = validation_ctx.total_rows();
        for column in &self.required_columns {
            let Some((idx, _)) = validation_ctx.schema().column_with_name(column) else {
                continue;
            };
            let count = counts[idx];
            let pct = percentage(count, total_rows);
            if let Some(level) = self.rule.classify(pct) {
                debug!(
                    column = %column,
                    missing = count,
                    pct,
                    level = %level,
                    "Missing values above threshold"
                );
                report.push(
                    level,
                    format!("{column}: {count} missing values ({pct:.2}%)"),
                );
            }
        }

        Ok(())
    }
}
