//! Error types for the aq-guard validation library.
//!
//! Data-quality problems are never errors here: they are findings inside a
//! [`ValidationReport`](crate::core::ValidationReport). `AqError` covers
//! software faults only (unregistered tables, unreadable files, columns of
//! the wrong type, bad configuration).

use thiserror::Error;

/// The main error type for aq-guard.
#[derive(Error, Debug)]
pub enum AqError {
    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from data source operations.
    #[error("Data source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "NDJSON", "memory")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error when a column is not found in the dataset.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Error when data types don't match expected types.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Security-related error, raised for identifiers unsafe to put in SQL.
    #[error("Security error: {0}")]
    SecurityError(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, AqError>`.
pub type Result<T> = std::result::Result<T, AqError>;

impl AqError {
    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }
}

impl From<serde_json::Error> for AqError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AqError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            AqError::Internal(inner) => AqError::Internal(format!("{msg}: {inner}")),
            other => AqError::Internal(format!("{msg}: {other}")),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let msg = f();
            match e.into() {
                AqError::Internal(inner) => AqError::Internal(format!("{msg}: {inner}")),
                other => AqError::Internal(format!("{msg}: {other}")),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_data_source_error() {
        let err = AqError::data_source("CSV", "Invalid file format");
        assert_eq!(err.to_string(), "Data source error: Invalid file format");
    }

    #[test]
    fn test_data_source_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = AqError::data_source_with_source("NDJSON", "cannot open export", Box::new(io));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_column_not_found() {
        let err = AqError::ColumnNotFound {
            column: "pm25".to_string(),
        };
        assert_eq!(err.to_string(), "Column 'pm25' not found in dataset");
    }

    #[test]
    fn test_serde_json_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: AqError = parse.unwrap_err().into();
        assert!(matches!(err, AqError::Serialization(_)));
    }

    #[test]
    fn test_error_context() {
        fn failing_operation() -> Result<()> {
            Err(AqError::Internal("row count missing".to_string()))
        }

        let err = failing_operation()
            .context("While counting rows")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Internal error: While counting rows: row count missing"
        );
    }
}
