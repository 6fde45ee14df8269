//! Per-run context shared with the checks.
//!
//! The validator loads the table schema and row count once, then scopes a
//! [`ValidationContext`] around the check loop so each check can reach them
//! without widening the [`QualityCheck`](crate::core::QualityCheck) trait.

use crate::prelude::*;
use crate::security::SqlSecurity;
use arrow::datatypes::{DataType, Schema, SchemaRef};
use datafusion::prelude::SessionContext;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Runtime information about the table being validated.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    table_name: Arc<str>,
    table_ref: Arc<str>,
    schema: SchemaRef,
    total_rows: u64,
}

impl ValidationContext {
    /// Creates a context from already known table facts.
    pub fn new(table_name: &str, schema: SchemaRef, total_rows: u64) -> Result<Self> {
        let table_ref = SqlSecurity::escape_identifier(table_name)?;
        Ok(Self {
            table_name: table_name.into(),
            table_ref: table_ref.into(),
            schema,
            total_rows,
        })
    }

    /// Reads the schema and row count of a registered table.
    #[instrument(skip(ctx))]
    pub async fn load(ctx: &SessionContext, table_name: &str) -> Result<Self> {
        let table_ref = SqlSecurity::escape_identifier(table_name)?;
        let df = ctx.table(table_ref.as_str()).await?;
        let schema = df.schema().inner().clone();
        let total_rows = df.count().await? as u64;

        debug!(
            table.name = %table_name,
            table.columns = schema.fields().len(),
            table.rows = total_rows,
            "Loaded validation context"
        );

        Ok(Self {
            table_name: table_name.into(),
            table_ref: table_ref.into(),
            schema,
            total_rows,
        })
    }

    /// Returns the name of the table being validated.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the quoted table name, ready for SQL.
    pub fn table_ref(&self) -> &str {
        &self.table_ref
    }

    /// Returns the table schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the number of rows in the table.
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// Returns true if the table has a column with this exact name.
    pub fn has_column(&self, column: &str) -> bool {
        self.schema.column_with_name(column).is_some()
    }

    /// Returns the data type of a column, if present.
    pub fn column_type(&self, column: &str) -> Option<&DataType> {
        self.schema
            .column_with_name(column)
            .map(|(_, field)| field.data_type())
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            table_name: "data".into(),
            table_ref: "\"data\"".into(),
            schema: Arc::new(Schema::empty()),
            total_rows: 0,
        }
    }
}

tokio::task_local! {
    pub static CURRENT_CONTEXT: ValidationContext;
}

/// Gets the current validation context.
///
/// Returns an empty context for table `data` when called outside a run.
pub fn current_validation_context() -> ValidationContext {
    CURRENT_CONTEXT
        .try_with(|ctx| ctx.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::Field;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("city", DataType::Utf8, true),
            Field::new("pm25", DataType::Float64, true),
        ]))
    }

    #[test]
    fn test_context_accessors() {
        let ctx = ValidationContext::new("readings", schema(), 42).unwrap();
        assert_eq!(ctx.table_name(), "readings");
        assert_eq!(ctx.table_ref(), "\"readings\"");
        assert_eq!(ctx.total_rows(), 42);
        assert!(ctx.has_column("pm25"));
        assert!(!ctx.has_column("pm10"));
        assert_eq!(ctx.column_type("pm25"), Some(&DataType::Float64));
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        assert!(ValidationContext::new("data; DROP TABLE x", schema(), 0).is_err());
    }

    #[tokio::test]
    async fn test_task_local_context() {
        assert_eq!(current_validation_context().table_name(), "data");
        assert_eq!(current_validation_context().total_rows(), 0);

        let custom = ValidationContext::new("clean_data", schema(), 7).unwrap();
        CURRENT_CONTEXT
            .scope(custom, async {
                let ctx = current_validation_context();
                assert_eq!(ctx.table_name(), "clean_data");
                assert_eq!(ctx.total_rows(), 7);
            })
            .await;

        assert_eq!(current_validation_context().table_name(), "data");
    }
}
