//! In-memory Arrow source.

use super::{table_ref, DataSource};
use crate::prelude::*;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Record batches already in memory, e.g. produced by another pipeline stage.
#[derive(Debug, Clone)]
pub struct MemorySource {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl MemorySource {
    /// Creates a source from a schema and its batches; the list may be empty.
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self { schema, batches }
    }

    /// Creates a source from non-empty batches, taking the first one's schema.
    pub fn from_batches(batches: Vec<RecordBatch>) -> Result<Self> {
        let schema = batches
            .first()
            .map(|b| b.schema())
            .ok_or_else(|| AqError::data_source("memory", "No record batches provided"))?;
        Ok(Self::new(schema, batches))
    }

    /// Total number of rows across all batches.
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

#[async_trait]
impl DataSource for MemorySource {
    #[instrument(skip(self, ctx), fields(table.name = %table_name, source.type = "memory"))]
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        debug!(
            table.name = %table_name,
            source.batches = self.batches.len(),
            source.rows = self.num_rows(),
            "Registering in-memory data source"
        );
        let table = MemTable::try_new(self.schema.clone(), vec![self.batches.clone()])?;
        ctx.register_table(table_ref(table_name)?.as_str(), Arc::new(table))?;
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "In-memory table: {} batches, {} rows",
            self.batches.len(),
            self.num_rows()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::clean_readings;

    #[tokio::test]
    async fn test_register_memory() {
        let batch = clean_readings().batch();
        let source = MemorySource::from_batches(vec![batch.clone(), batch]).unwrap();
        assert_eq!(source.num_rows(), 20);
        assert_eq!(source.description(), "In-memory table: 2 batches, 20 rows");

        let ctx = SessionContext::new();
        source.register(&ctx, "readings").await.unwrap();
        assert_eq!(ctx.table("readings").await.unwrap().count().await.unwrap(), 20);
    }

    #[test]
    fn test_from_batches_requires_one() {
        assert!(MemorySource::from_batches(vec![]).is_err());
    }
}
