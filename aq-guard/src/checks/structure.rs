//! Required columns and non-empty dataset.

use crate::core::{current_validation_context, QualityCheck, ReportBuilder};
use crate::prelude::*;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use tracing::{debug, instrument};

/// Fails validation when a required column is absent or the table is empty.
#[derive(Debug, Clone)]
pub struct StructureCheck {
    required_columns: Vec<String>,
}

impl StructureCheck {
    /// Creates the check for the given required columns.
    pub fn new(required_columns: Vec<String>) -> Self {
        Self { required_columns }
    }
}

#[async_trait]
impl QualityCheck for StructureCheck {
    fn name(&self) -> &str {
        "structure"
    }

    #[instrument(skip_all, fields(check.name = "structure"))]
    async fn run(&self, _ctx: &SessionContext, report: &mut ReportBuilder) -> Result<()> {
        let validation_ctx = current_validation_context();

        let missing: Vec<&str> = self
            .required_columns
            .iter()
            .map(String::as_str)
            .filter(|column| !validation_ctx.has_column(column))
            .collect();

        if !missing.is_empty() {
            debug!(columns.missing = ?missing, "Required columns absent");
            report.error(format!(
                "Missing required columns: [{}]",
                missing.join(", ")
            ));
        }

        if validation_ctx.total_rows() == 0 {
            report.error("Dataset is empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{clean_readings, run_check, TableBuilder};

    fn required() -> Vec<String> {
        ["city", "date", "pm25", "pm10", "no2", "so2", "o3"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[tokio::test]
    async fn test_complete_structure_passes() {
        let ctx = clean_readings().context();
        let report = run_check(&StructureCheck::new(required()), &ctx).await;
        assert!(report.passed());
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_missing_columns_fail() {
        let ctx = TableBuilder::new()
            .city(&["Moscow"; 3])
            .floats("pm25", &[10.0, 12.0, 14.0])
            .context();
        let report = run_check(&StructureCheck::new(required()), &ctx).await;
        assert!(!report.passed());
        assert_eq!(
            report.errors(),
            ["Missing required columns: [date, pm10, no2, so2, o3]"]
        );
    }

    #[tokio::test]
    async fn test_empty_table_fails() {
        let ctx = TableBuilder::new()
            .city(&[])
            .dates("2023-01-01", &[])
            .floats("pm25", &[])
            .context();
        let check = StructureCheck::new(vec!["city".into(), "date".into(), "pm25".into()]);
        let report = run_check(&check, &ctx).await;
        assert!(!report.passed());
        assert_eq!(report.errors(), ["Dataset is empty"]);
    }
}
