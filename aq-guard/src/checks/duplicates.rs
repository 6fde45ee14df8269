//! Duplicate `(city, date)` key check.

use super::support::query_counts;
use crate::config::{CITY_COLUMN, DATE_COLUMN};
use crate::core::{
    current_validation_context, report::percentage, QualityCheck, ReportBuilder, SeverityRule,
};
use crate::prelude::*;
use crate::security::SqlSecurity;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use tracing::{debug, instrument};

/// Counts every row whose `(city, date)` key occurs more than once.
///
/// Both copies of a doubled key are counted, so two rows sharing a key give
/// a count of 2. Runs only when both key columns exist.
#[derive(Debug, Clone)]
pub struct DuplicateCheck {
    rule: SeverityRule,
}

impl DuplicateCheck {
    pub fn new(rule: SeverityRule) -> Self {
        Self { rule }
    }
}

#[async_trait]
impl QualityCheck for DuplicateCheck {
    fn name(&self) -> &str {
        "duplicates"
    }

    #[instrument(skip_all, fields(check.name = "duplicates"))]
    async fn run(&self, ctx: &SessionContext, report: &mut ReportBuilder) -> Result<()> {
        let validation_ctx = current_validation_context();
        if !validation_ctx.has_column(CITY_COLUMN) || !validation_ctx.has_column(DATE_COLUMN) {
            debug!("Key columns absent, skipping duplicate check");
            return Ok(());
        }

        let city = SqlSecurity::escape_identifier(CITY_COLUMN)?;
        let date = SqlSecurity::escape_identifier(DATE_COLUMN)?;
        let sql = format!(
            "SELECT CAST(COALESCE(SUM(n), 0) AS BIGINT) FROM \
             (SELECT COUNT(*) AS n FROM {} GROUP BY {city}, {date} HAVING COUNT(*) > 1)",
            validation_ctx.table_ref()
        );
        let duplicates = query_counts(ctx, &sql).await?.first().copied().unwrap_or(0);

        if duplicates == 0 {
            return Ok(());
        }

        let pct = percentage(duplicates, validation_ctx.total_rows());
        debug!(duplicates, pct, "Duplicate keys found");
        report.statistics_mut().duplicates = Some(duplicates);
        if let Some(level) = self.rule.classify(pct) {
            report.push(
                level,
                format!("Found {duplicates} duplicate rows ({pct:.2}%)"),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DUPLICATE_RULE;
    use crate::test_fixtures::{clean_readings, run_check, TableBuilder};

    #[tokio::test]
    async fn test_unique_keys() {
        let ctx = clean_readings().context();
        let report = run_check(&DuplicateCheck::new(DUPLICATE_RULE), &ctx).await;
        assert!(report.is_clean());
        assert_eq!(report.statistics().duplicates, None);
    }

    #[tokio::test]
    async fn test_both_rows_of_a_pair_counted() {
        let ctx = TableBuilder::new()
            .city(&["Moscow"; 10])
            .dates("2023-01-01", &[0, 1, 2, 3, 4, 4, 5, 6, 7, 8])
            .floats("pm25", &[1.0; 10])
            .context();
        let report = run_check(&DuplicateCheck::new(DUPLICATE_RULE), &ctx).await;
        assert!(report.passed());
        assert_eq!(report.warnings(), ["Found 2 duplicate rows (20.00%)"]);
        assert_eq!(report.statistics().duplicates, Some(2));
    }

    #[tokio::test]
    async fn test_same_date_in_different_cities_is_not_duplicate() {
        let ctx = TableBuilder::new()
            .city(&["Moscow", "Tula", "Tula", "Tula"])
            .dates("2023-01-01", &[0, 0, 1, 1])
            .context();
        let report = run_check(&DuplicateCheck::new(DUPLICATE_RULE), &ctx).await;
        assert_eq!(report.statistics().duplicates, Some(2));
        assert_eq!(report.warnings(), ["Found 2 duplicate rows (50.00%)"]);
    }

    #[tokio::test]
    async fn test_skipped_without_date() {
        let ctx = TableBuilder::new()
            .city(&["Moscow", "Moscow"])
            .floats("pm25", &[1.0, 1.0])
            .context();
        let report = run_check(&DuplicateCheck::new(DUPLICATE_RULE), &ctx).await;
        assert!(report.is_clean());
        assert_eq!(report.statistics().duplicates, None);
    }
}
