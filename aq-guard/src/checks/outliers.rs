//! Interquartile-range outlier screening.

use super::support::{present_predicate, query_floats, require_numeric};
use crate::core::{
    current_validation_context, report::percentage, OutlierStats, QualityCheck, ReportBuilder,
    SeverityRule,
};
use crate::prelude::*;
use crate::security::SqlSecurity;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use tracing::{debug, instrument};

/// Linear-interpolation quantile of an ascending slice.
///
/// For `q` in `[0, 1]` this is the value at fractional position
/// `q * (n - 1)`, interpolated between its neighbours. Returns NaN for an
/// empty slice.
///
/// ```rust
/// use aq_guard::checks::quantile;
///
/// let sorted = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(quantile(&sorted, 0.25), 1.75);
/// assert_eq!(quantile(&sorted, 0.5), 2.5);
/// assert_eq!(quantile(&sorted, 1.0), 4.0);
/// ```
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Flags values beyond `k` interquartile ranges outside the quartiles.
///
/// Statistics are recorded for any parameter with at least one outlier;
/// findings go through the outlier rule, which never blocks.
#[derive(Debug, Clone)]
pub struct OutlierCheck {
    columns: Vec<String>,
    iqr_multiplier: f64,
    min_samples: usize,
    rule: SeverityRule,
}

impl OutlierCheck {
    pub fn new(
        columns: Vec<String>,
        iqr_multiplier: f64,
        min_samples: usize,
        rule: SeverityRule,
    ) -> Self {
        Self {
            columns,
            iqr_multiplier,
            min_samples,
            rule,
        }
    }

    /// Computes outlier statistics for an already sorted sample.
    pub(crate) fn screen(&self, sorted: &[f64]) -> OutlierStats {
        let q1 = quantile(sorted, 0.25);
        let q3 = quantile(sorted, 0.75);
        let iqr = q3 - q1;
        let lower = q1 - self.iqr_multiplier * iqr;
        let upper = q3 + self.iqr_multiplier * iqr;

        let count = sorted.iter().filter(|v| **v < lower || **v > upper).count() as u64;
        OutlierStats {
            count,
            percentage: percentage(count, sorted.len() as u64),
            bounds: (lower, upper),
        }
    }
}

#[async_trait]
impl QualityCheck for OutlierCheck {
    fn name(&self) -> &str {
        "outliers"
    }

    #[instrument(skip_all, fields(check.name = "outliers", check.columns = self.columns.len()))]
    async fn run(&self, ctx: &SessionContext, report: &mut ReportBuilder) -> Result<()> {
        let validation_ctx = current_validation_context();

        for column in &self.columns {
            let Some(data_type) = validation_ctx.column_type(column) else {
                continue;
            };
            require_numeric(column, data_type)?;

            let column_sql = SqlSecurity::escape_identifier(column)?;
            let sql = format!(
                "SELECT CAST({column_sql} AS DOUBLE) FROM {} WHERE {}",
                validation_ctx.table_ref(),
                present_predicate(&column_sql, data_type)
            );
            let mut values = query_floats(ctx, &sql).await?;
            if values.len() < self.min_samples {
                debug!(
                    column = %column,
                    samples = values.len(),
                    "Too few values for outlier screening"
                );
                continue;
            }
            values.sort_unstable_by(f64::total_cmp);

            let stats = self.screen(&values);
            if stats.count == 0 {
                continue;
            }
            debug!(
                column = %column,
                outliers = stats.count,
                pct = stats.percentage,
                lower = stats.bounds.0,
                upper = stats.bounds.1,
                "Outliers found"
            );
            if let Some(level) = self.rule.classify(stats.percentage) {
                report.push(
                    level,
                    format!(
                        "{column}: {} statistical outliers ({:.2}%)",
                        stats.count, stats.percentage
                    ),
                );
            }
            report
                .statistics_mut()
                .outliers
                .insert(column.clone(), stats);
        }

        Ok(())
    }
}
