//! Data sources for readings tables.
//!
//! A [`DataSource`] registers a table in a DataFusion [`SessionContext`];
//! the validator then reads it by name. File sources accept single paths,
//! path lists and glob patterns.

use crate::prelude::*;
use crate::security::SqlSecurity;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use std::fmt::Debug;
use std::path::Path;

mod csv;
mod daily;
mod json;
mod memory;

pub use csv::{CsvOptions, CsvSource};
pub use daily::{DailyAggregation, HOURLY_COLUMNS};
pub use json::{JsonOptions, JsonSource};
pub use memory::MemorySource;

/// A data source that can be registered with a DataFusion context.
///
/// # Examples
///
/// ```rust,no_run
/// use aq_guard::sources::{CsvSource, DataSource};
/// use datafusion::prelude::SessionContext;
///
/// # async fn example() -> aq_guard::prelude::Result<()> {
/// let source = CsvSource::new("data/processed/air_quality_clean.csv")?;
/// let ctx = SessionContext::new();
/// source.register(&ctx, "data").await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DataSource: Debug + Send + Sync {
    /// Registers this source under `table_name`.
    ///
    /// The name must be a plain SQL identifier; it is used case-sensitively.
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()>;

    /// Returns a human-readable description of this data source.
    fn description(&self) -> String;
}

/// Picks a file source from the extension of the first path.
///
/// `.json`, `.ndjson` and `.jsonl` files are read as newline-delimited JSON,
/// everything else as CSV. Glob patterns are expanded first.
pub fn open(patterns: &[String]) -> Result<Box<dyn DataSource>> {
    let paths = expand_globs(patterns)?;
    let extension = file_extension(&paths[0]);
    if paths.iter().any(|p| file_extension(p) != extension) {
        return Err(AqError::Configuration(format!(
            "All input files must share one extension, found {paths:?}"
        )));
    }

    match extension.as_str() {
        ".json" | ".ndjson" | ".jsonl" => Ok(Box::new(JsonSource::from_paths(paths)?)),
        _ => Ok(Box::new(CsvSource::from_paths(paths)?)),
    }
}

/// Expands glob patterns into the files they match, in pattern order.
///
/// A pattern without glob metacharacters is kept as is, so a missing file
/// surfaces as an I/O error when the source is registered.
pub(crate) fn expand_globs(patterns: &[String]) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            paths.push(pattern.clone());
            continue;
        }

        let matches = glob::glob(pattern).map_err(|e| {
            AqError::Configuration(format!("Invalid glob pattern '{pattern}': {e}"))
        })?;
        let mut matched: Vec<String> = Vec::new();
        for entry in matches {
            let path = entry.map_err(|e| AqError::Io(e.into()))?;
            if path.is_file() {
                if let Some(path_str) = path.to_str() {
                    matched.push(path_str.to_string());
                }
            }
        }
        matched.sort();
        paths.extend(matched);
    }

    if paths.is_empty() {
        return Err(AqError::data_source(
            "file",
            format!("No files found matching {patterns:?}"),
        ));
    }
    Ok(paths)
}

/// Lower-cased extension with a leading dot, `.csv` when there is none.
pub(crate) fn file_extension(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_else(|| ".csv".to_string())
}

/// Quoted table reference for registration, so names keep their case.
pub(crate) fn table_ref(table_name: &str) -> Result<String> {
    SqlSecurity::escape_identifier(table_name)
}
