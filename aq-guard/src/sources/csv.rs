//! CSV file source.

use super::{expand_globs, file_extension, table_ref, DataSource};
use crate::prelude::*;
use async_trait::async_trait;
use datafusion::prelude::*;
use tracing::{info, instrument};

/// Options for reading CSV files.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the files have a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Maximum records to read for schema inference
    pub schema_infer_max_records: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            schema_infer_max_records: 1000,
        }
    }
}

/// One or more CSV files registered as a single table.
///
/// ```rust,no_run
/// use aq_guard::sources::{CsvOptions, CsvSource};
///
/// # fn example() -> aq_guard::prelude::Result<()> {
/// let source = CsvSource::new("data/processed/air_quality_clean.csv")?;
///
/// let options = CsvOptions {
///     delimiter: b';',
///     ..Default::default()
/// };
/// let source = CsvSource::with_options("export.txt", options)?;
///
/// let source = CsvSource::from_glob("data/raw/*.csv")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    paths: Vec<String>,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a CSV source from a single file path.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        Self::from_paths(vec![path.into()])
    }

    /// Creates a CSV source with custom options.
    pub fn with_options(path: impl Into<String>, options: CsvOptions) -> Result<Self> {
        Ok(Self::new(path)?.with_custom_options(options))
    }

    /// Creates a CSV source from multiple file paths.
    pub fn from_paths(paths: Vec<String>) -> Result<Self> {
        if paths.is_empty() {
            return Err(AqError::Configuration(
                "At least one path must be provided".to_string(),
            ));
        }
        Ok(Self {
            paths,
            options: CsvOptions::default(),
        })
    }

    /// Creates a CSV source from a glob pattern.
    pub fn from_glob(pattern: impl Into<String>) -> Result<Self> {
        let paths = expand_globs(&[pattern.into()])?;
        Self::from_paths(paths)
    }

    /// Sets custom options for this CSV source.
    pub fn with_custom_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the files this source reads.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

#[async_trait]
impl DataSource for CsvSource {
    #[instrument(skip(self, ctx), fields(
        table.name = %table_name,
        source.type = "csv",
        source.files = self.paths.len()
    ))]
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        info!(
            table.name = %table_name,
            source.paths = ?self.paths,
            csv.delimiter = %(self.options.delimiter as char),
            csv.has_header = self.options.has_header,
            "Registering CSV data source"
        );

        let extension = file_extension(&self.paths[0]);
        let options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(&extension);

        let df = ctx
            .read_csv(self.paths.clone(), options)
            .await
            .map_err(|e| {
                AqError::data_source_with_source(
                    "CSV",
                    format!("Failed to read {}", self.description()),
                    Box::new(e),
                )
            })?;
        ctx.register_table(table_ref(table_name)?.as_str(), df.into_view())?;
        Ok(())
    }

    fn description(&self) -> String {
        match self.paths.as_slice() {
            [path] => format!("CSV file: {path}"),
            paths => format!("CSV files: {} files", paths.len()),
        }
    }
}
