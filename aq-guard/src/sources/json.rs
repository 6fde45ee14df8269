//! Newline-delimited JSON source, for document-store exports.

use super::{expand_globs, file_extension, table_ref, DataSource};
use crate::prelude::*;
use async_trait::async_trait;
use datafusion::prelude::*;
use tracing::{info, instrument};

/// Options for reading NDJSON files.
#[derive(Debug, Clone)]
pub struct JsonOptions {
    /// Maximum records to read for schema inference
    pub schema_infer_max_records: usize,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            schema_infer_max_records: 1000,
        }
    }
}

/// One or more NDJSON files (one document per line) registered as a table.
///
/// This is the shape `mongoexport` writes for a collection of readings.
#[derive(Debug, Clone)]
pub struct JsonSource {
    paths: Vec<String>,
    options: JsonOptions,
}

impl JsonSource {
    /// Creates a JSON source from a single file path.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        Self::from_paths(vec![path.into()])
    }

    /// Creates a JSON source from multiple file paths.
    pub fn from_paths(paths: Vec<String>) -> Result<Self> {
        if paths.is_empty() {
            return Err(AqError::Configuration(
                "At least one path must be provided".to_string(),
            ));
        }
        Ok(Self {
            paths,
            options: JsonOptions::default(),
        })
    }

    /// Creates a JSON source from a glob pattern.
    pub fn from_glob(pattern: impl Into<String>) -> Result<Self> {
        Self::from_paths(expand_globs(&[pattern.into()])?)
    }

    /// Sets custom options for this JSON source.
    pub fn with_custom_options(mut self, options: JsonOptions) -> Self {
        self.options = options;
        self
    }
}

#[async_trait]
impl DataSource for JsonSource {
    #[instrument(skip(self, ctx), fields(
        table.name = %table_name,
        source.type = "ndjson",
        source.files = self.paths.len()
    ))]
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        info!(
            table.name = %table_name,
            source.paths = ?self.paths,
            "Registering NDJSON data source"
        );

        let extension = file_extension(&self.paths[0]);
        let options = NdJsonReadOptions {
            schema_infer_max_records: self.options.schema_infer_max_records,
            ..NdJsonReadOptions::default()
        }
        .file_extension(&extension);

        let df = ctx
            .read_json(self.paths.clone(), options)
            .await
            .map_err(|e| {
                AqError::data_source_with_source(
                    "NDJSON",
                    format!("Failed to read {}", self.description()),
                    Box::new(e),
                )
            })?;
        ctx.register_table(table_ref(table_name)?.as_str(), df.into_view())?;
        Ok(())
    }

    fn description(&self) -> String {
        match self.paths.as_slice() {
            [path] => format!("NDJSON file: {path}"),
            paths => format!("NDJSON files: {} files", paths.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_register_ndjson() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.json");
        fs::write(
            &path,
            concat!(
                r#"{"city": "Moscow", "date": "2023-01-01", "pm25": 10.5}"#,
                "\n",
                r#"{"city": "Moscow", "date": "2023-01-02", "pm25": null}"#,
                "\n",
            ),
        )
        .unwrap();

        let ctx = SessionContext::new();
        let source = JsonSource::new(path.to_str().unwrap()).unwrap();
        assert!(source.description().starts_with("NDJSON file:"));
        source.register(&ctx, "data").await.unwrap();

        let batches = ctx
            .sql("SELECT COUNT(pm25) AS n FROM data")
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();
        let n = batches[0]
            .column(0)
            .as_any()
            .downcast_ref::<arrow::array::Int64Array>()
            .unwrap()
            .value(0);
        assert_eq!(n, 1);
    }
}
