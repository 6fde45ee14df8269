//! SQL helpers shared by the checks.

use crate::prelude::*;
use arrow::array::{Array, Float64Array, Int64Array};
use arrow::datatypes::DataType;
use datafusion::prelude::SessionContext;

/// SQL predicate that is true when a value is present.
///
/// Floating-point columns treat NaN as missing; arrow orders NaN above every
/// number, so without this a NaN would also count as out of range.
pub(crate) fn present_predicate(column_sql: &str, data_type: &DataType) -> String {
    if data_type.is_floating() {
        format!("({column_sql} IS NOT NULL AND NOT isnan({column_sql}))")
    } else {
        format!("({column_sql} IS NOT NULL)")
    }
}

/// Fails with [`AqError::TypeMismatch`] unless the column is numeric.
///
/// A `Null` column (every value missing, as inferred from a CSV) passes.
pub(crate) fn require_numeric(column: &str, data_type: &DataType) -> Result<()> {
    if data_type.is_numeric() || data_type == &DataType::Null {
        Ok(())
    } else {
        Err(AqError::TypeMismatch {
            expected: format!("numeric column '{column}'"),
            found: data_type.to_string(),
        })
    }
}

/// Runs a query returning a single row of BIGINT columns.
///
/// NULL cells (e.g. `SUM` over zero rows) read as zero.
pub(crate) async fn query_counts(ctx: &SessionContext, sql: &str) -> Result<Vec<u64>> {
    let batches = ctx.sql(sql).await?.collect().await?;
    let Some(batch) = batches.iter().find(|b| b.num_rows() > 0) else {
        return Err(AqError::Internal(format!(
            "Aggregate query returned no rows: {sql}"
        )));
    };

    (0..batch.num_columns())
        .map(|idx| {
            let column = batch
                .column(idx)
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| AqError::TypeMismatch {
                    expected: "Int64".to_string(),
                    found: batch.column(idx).data_type().to_string(),
                })?;
            if column.is_null(0) {
                Ok(0)
            } else {
                Ok(column.value(0).max(0) as u64)
            }
        })
        .collect()
}

/// Runs a query whose first column is DOUBLE and returns its non-null values.
pub(crate) async fn query_floats(ctx: &SessionContext, sql: &str) -> Result<Vec<f64>> {
    let batches = ctx.sql(sql).await?.collect().await?;
    let mut values = Vec::new();
    for batch in &batches {
        let column = batch
            .column(0)
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| AqError::TypeMismatch {
                expected: "Float64".to_string(),
                found: batch.column(0).data_type().to_string(),
            })?;
        values.extend(column.iter().flatten());
    }
    Ok(values)
}

/// Formats a bound the way it was configured: `500`, not `500.0`.
pub(crate) fn display_bound(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
