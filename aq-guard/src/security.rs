//! SQL identifier hardening.
//!
//! Every column and table name that reaches a SQL string goes through
//! [`SqlSecurity`]. Column names come from user configuration files, so they
//! are validated against a strict identifier grammar and then double-quoted.

use crate::error::{AqError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// SQL identifier validation and escaping utilities.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Validates and escapes a SQL identifier (table name, column name).
    ///
    /// # Examples
    /// ```rust
    /// use aq_guard::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::escape_identifier("pm25").unwrap(), "\"pm25\"");
    /// assert!(SqlSecurity::escape_identifier("pm25; DROP TABLE data--").is_err());
    /// assert!(SqlSecurity::escape_identifier(&"very_long_name_".repeat(100)).is_err());
    /// ```
    pub fn escape_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;

        let escaped = identifier.replace('"', "\"\"");
        Ok(format!("\"{escaped}\""))
    }

    /// Validates a SQL identifier without escaping it.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.trim().is_empty() {
            return Err(AqError::SecurityError(
                "SQL identifier cannot be empty or whitespace-only".to_string(),
            ));
        }

        if identifier.len() > 128 {
            return Err(AqError::SecurityError(
                "SQL identifier too long (max 128 characters)".to_string(),
            ));
        }

        if identifier.contains('\0') {
            return Err(AqError::SecurityError(
                "SQL identifier cannot contain null bytes".to_string(),
            ));
        }

        static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
            #[allow(clippy::expect_used)]
            Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$")
                .expect("Hard-coded regex pattern should be valid")
        });

        if !IDENTIFIER_REGEX.is_match(identifier) {
            return Err(AqError::SecurityError(format!(
                "Invalid SQL identifier format: '{identifier}'. Identifiers must start with a letter or underscore and contain only letters, numbers and underscores"
            )));
        }

        Ok(())
    }

    /// Quotes a column name read back from a registered table's schema.
    ///
    /// Such names already exist in the catalog (CSV headers like `pm2.5` or
    /// `Unnamed: 0` are legal there), so only the quoting is enforced.
    pub fn quote_schema_identifier(identifier: &str) -> Result<String> {
        if identifier.contains('\0') {
            return Err(AqError::SecurityError(
                "SQL identifier cannot contain null bytes".to_string(),
            ));
        }
        let escaped = identifier.replace('"', "\"\"");
        Ok(format!("\"{escaped}\""))
    }

    /// Renders a finite float as a SQL literal.
    ///
    /// Range bounds come from configuration, so NaN and infinities are
    /// rejected rather than rendered as text DataFusion cannot parse.
    pub fn float_literal(value: f64, name: &str) -> Result<String> {
        if !value.is_finite() {
            return Err(AqError::SecurityError(format!(
                "Invalid {name} value: must be finite (not NaN or infinite)"
            )));
        }
        Ok(format!("{value:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_sql_identifiers() {
        for name in ["city", "date", "pm25", "pm2_5", "uv_index", "_hidden", "PM10"] {
            assert!(SqlSecurity::validate_identifier(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_invalid_sql_identifiers() {
        let bad = [
            "",
            "   ",
            "1pm25",
            "pm 25",
            "pm25;",
            "pm25--",
            "pm25'",
            "data.pm25",
            "pm25\0",
        ];
        for name in bad {
            assert!(SqlSecurity::validate_identifier(name).is_err(), "{name:?}");
        }
        assert!(SqlSecurity::validate_identifier(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_sql_identifier_escaping() {
        assert_eq!(SqlSecurity::escape_identifier("o3").unwrap(), "\"o3\"");
        assert_eq!(
            SqlSecurity::escape_identifier("Carbon_Monoxide").unwrap(),
            "\"Carbon_Monoxide\""
        );
    }

    #[test]
    fn test_quote_schema_identifier() {
        assert_eq!(
            SqlSecurity::quote_schema_identifier("pm2.5").unwrap(),
            "\"pm2.5\""
        );
        assert_eq!(
            SqlSecurity::quote_schema_identifier("a\"b").unwrap(),
            "\"a\"\"b\""
        );
        assert!(SqlSecurity::quote_schema_identifier("a\0b").is_err());
    }

    #[test]
    fn test_float_literal() {
        assert_eq!(SqlSecurity::float_literal(500.0, "max").unwrap(), "500.0");
        assert_eq!(SqlSecurity::float_literal(-0.5, "min").unwrap(), "-0.5");
        assert!(SqlSecurity::float_literal(f64::NAN, "min").is_err());
        assert!(SqlSecurity::float_literal(f64::INFINITY, "max").is_err());
    }
}
