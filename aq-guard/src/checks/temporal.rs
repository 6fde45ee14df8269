//! Temporal continuity check.

use crate::config::{CITY_COLUMN, DATE_COLUMN};
use crate::core::{current_validation_context, QualityCheck, ReportBuilder};
use crate::prelude::*;
use crate::security::SqlSecurity;
use arrow::array::{Array, StringArray, TimestampMicrosecondArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, TimeUnit};
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Finds cities whose consecutive readings are more than `max_gap_days` apart.
///
/// Dates are compared at microsecond resolution, so for a timestamp column a
/// gap of 7 days and 12 hours exceeds a 7 day limit. Rows with a missing city
/// or date take no part, and cities with a single reading are skipped.
#[derive(Debug, Clone)]
pub struct TemporalGapCheck {
    max_gap_days: i64,
}

impl TemporalGapCheck {
    pub fn new(max_gap_days: i64) -> Self {
        Self { max_gap_days }
    }

    async fn readings_by_city(
        &self,
        ctx: &SessionContext,
        table_ref: &str,
    ) -> Result<BTreeMap<String, Vec<i64>>> {
        let city = SqlSecurity::escape_identifier(CITY_COLUMN)?;
        let date = SqlSecurity::escape_identifier(DATE_COLUMN)?;
        let sql = format!(
            "SELECT CAST({city} AS VARCHAR), CAST({date} AS TIMESTAMP) FROM {table_ref} \
             WHERE {city} IS NOT NULL AND {date} IS NOT NULL"
        );
        let batches = ctx.sql(&sql).await?.collect().await?;

        let mut by_city: BTreeMap<String, Vec<i64>> = BTreeMap::new();
        for batch in &batches {
            // VARCHAR may come back as Utf8View
            let cities =
                cast(batch.column(0), &DataType::Utf8).context("Failed to read city names")?;
            let instants = cast(
                batch.column(1),
                &DataType::Timestamp(TimeUnit::Microsecond, None),
            )
            .context("Failed to read dates")?;
            let cities = cities
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| AqError::Internal("city column is not Utf8".to_string()))?;
            let instants = instants
                .as_any()
                .downcast_ref::<TimestampMicrosecondArray>()
                .ok_or_else(|| AqError::Internal("date column is not a timestamp".to_string()))?;

            for row in 0..batch.num_rows() {
                if cities.is_null(row) || instants.is_null(row) {
                    continue;
                }
                by_city
                    .entry(cities.value(row).to_string())
                    .or_default()
                    .push(instants.value(row));
            }
        }
        Ok(by_city)
    }
}

const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Number of consecutive gaps larger than `max_gap_days` in a sorted series
/// of microsecond timestamps.
pub(crate) fn count_gaps(sorted_micros: &[i64], max_gap_days: i64) -> u64 {
    let limit = max_gap_days.saturating_mul(MICROS_PER_DAY);
    sorted_micros
        .windows(2)
        .filter(|pair| pair[1].saturating_sub(pair[0]) > limit)
        .count() as u64
}

#[async_trait]
impl QualityCheck for TemporalGapCheck {
    fn name(&self) -> &str {
        "temporal_gaps"
    }

    #[instrument(skip_all, fields(check.name = "temporal_gaps", check.max_gap_days = self.max_gap_days))]
    async fn run(&self, ctx: &SessionContext, report: &mut ReportBuilder) -> Result<()> {
        let validation_ctx = current_validation_context();
        if !validation_ctx.has_column(CITY_COLUMN) || !validation_ctx.has_column(DATE_COLUMN) {
            debug!("Key columns absent, skipping temporal check");
            return Ok(());
        }

        let by_city = self
            .readings_by_city(ctx, validation_ctx.table_ref())
            .await?;

        let mut gaps = BTreeMap::new();
        for (city, mut instants) in by_city {
            if instants.len() < 2 {
                continue;
            }
            instants.sort_unstable();
            let count = count_gaps(&instants, self.max_gap_days);
            if count > 0 {
                debug!(city = %city, gaps = count, "Temporal gaps found");
                gaps.insert(city, count);
            }
        }

        if gaps.is_empty() {
            return Ok(());
        }

        let listing = gaps
            .iter()
            .map(|(city, count)| format!("{city}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        report.warning(format!(
            "Temporal gaps > {} days detected: {{{listing}}}",
            self.max_gap_days
        ));
        report.statistics_mut().temporal_gaps = gaps;

        Ok(())
    }
}
