//! Report rendering.
//!
//! [`generate_report`] produces the fixed-width text report printed by the
//! pipeline. The [`ReportFormatter`] implementations render the same
//! [`ValidationReport`] as text, JSON or Markdown, tuned by a
//! [`FormatterConfig`].
//!
//! # Examples
//!
//! ```rust
//! use aq_guard::formatters::{FormatterConfig, JsonFormatter, ReportFormatter, TextFormatter};
//! # use aq_guard::core::ValidationReport;
//! # fn render(report: &ValidationReport) -> aq_guard::prelude::Result<()> {
//! let text = TextFormatter::with_config(FormatterConfig::terminal()).format(report)?;
//! let json = JsonFormatter::new().with_pretty(false).format(report)?;
//! println!("{text}\n{json}");
//! # Ok(())
//! # }
//! ```

use crate::core::{Level, ValidationReport};
use crate::prelude::*;
use std::fmt::Write;

const BANNER_WIDTH: usize = 60;

/// Configuration options for rendering a report.
///
/// The default renders exactly what [`generate_report`] prints: findings
/// only, no colors.
#[derive(Debug, Clone, Default)]
pub struct FormatterConfig {
    /// Include the statistics section
    pub include_statistics: bool,
    /// Include dataset name, timestamp and execution time
    pub include_timestamps: bool,
    /// Maximum number of findings shown per level (`None` for all)
    pub max_findings: Option<usize>,
    /// Whether to use ANSI colors (text formatter only)
    pub use_colors: bool,
}

impl FormatterConfig {
    /// Shows everything.
    pub fn detailed() -> Self {
        Self {
            include_statistics: true,
            include_timestamps: true,
            max_findings: None,
            use_colors: false,
        }
    }

    /// Colored output for an interactive terminal.
    pub fn terminal() -> Self {
        Self {
            include_statistics: true,
            include_timestamps: false,
            max_findings: None,
            use_colors: true,
        }
    }

    /// Sets whether to include the statistics section.
    pub fn with_statistics(mut self, include: bool) -> Self {
        self.include_statistics = include;
        self
    }

    /// Sets the maximum number of findings shown per level.
    pub fn with_max_findings(mut self, max: usize) -> Self {
        self.max_findings = Some(max);
        self
    }

    /// Sets whether to use colorized output.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn visible<'a>(&self, findings: &'a [String]) -> &'a [String] {
        match self.max_findings {
            Some(max) => &findings[..max.min(findings.len())],
            None => findings,
        }
    }
}

/// Renders a validation report into a string.
///
/// # Examples
///
/// ```rust
/// use aq_guard::core::ValidationReport;
/// use aq_guard::formatters::ReportFormatter;
///
/// struct OneLine;
///
/// impl ReportFormatter for OneLine {
///     fn format(&self, report: &ValidationReport) -> aq_guard::prelude::Result<String> {
///         Ok(format!(
///             "{}: {} errors, {} warnings",
///             report.dataset(),
///             report.errors().len(),
///             report.warnings().len()
///         ))
///     }
/// }
/// ```
pub trait ReportFormatter {
    /// Formats a report.
    fn format(&self, report: &ValidationReport) -> Result<String>;
}

/// Renders the fixed-width text report for a validation run.
///
/// Stateless: the output depends only on `report`.
///
/// ```rust
/// # use aq_guard::core::ValidationReport;
/// # fn show(report: &ValidationReport) {
/// let text = aq_guard::formatters::generate_report(report);
/// assert!(text.contains("DATA QUALITY REPORT"));
/// # }
/// ```
pub fn generate_report(report: &ValidationReport) -> String {
    TextFormatter::new().render(report)
}

/// The fixed-width text report.
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    config: FormatterConfig,
}

impl TextFormatter {
    /// Creates a formatter with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a formatter with a custom configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn paint(&self, text: &str, color: &str) -> String {
        if self.config.use_colors {
            format!("\x1b[{color}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// Renders the report. Rendering a `String` cannot fail.
    pub fn render(&self, report: &ValidationReport) -> String {
        let banner = "=".repeat(BANNER_WIDTH);
        let mut lines = vec![
            banner.clone(),
            "DATA QUALITY REPORT".to_string(),
            banner.clone(),
        ];

        lines.push("\nGeneral information:".to_string());
        if self.config.include_timestamps {
            lines.push(format!("  Dataset: {}", report.dataset()));
            lines.push(format!("  Timestamp: {}", report.timestamp()));
            lines.push(format!("  Execution time: {}ms", report.execution_time_ms()));
        }
        lines.push(format!("  Total rows: {}", report.total_rows()));
        let status = if report.passed() {
            self.paint("✓ PASSED", "32")
        } else {
            self.paint("✗ FAILED", "31")
        };
        lines.push(format!("  Status: {status}"));

        for (level, title) in [(Level::Error, "❌ Errors"), (Level::Warning, "⚠️  Warnings")] {
            let findings = report.findings(level);
            if findings.is_empty() {
                continue;
            }
            lines.push(format!("\n{title} ({}):", findings.len()));
            let shown = self.config.visible(findings);
            lines.extend(shown.iter().map(|f| format!("  • {f}")));
            if shown.len() < findings.len() {
                lines.push(format!("  ... and {} more", findings.len() - shown.len()));
            }
        }

        if report.is_clean() {
            lines.push("\n✓ No problems found".to_string());
        }

        if self.config.include_statistics && !report.statistics().is_empty() {
            self.push_statistics(report, &mut lines);
        }

        lines.push(format!("\n{banner}"));
        lines.join("\n")
    }

    fn push_statistics(&self, report: &ValidationReport, lines: &mut Vec<String>) {
        let stats = report.statistics();
        lines.push("\nStatistics:".to_string());

        let missing: Vec<String> = stats
            .missing_values
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(column, count)| format!("{column}={count}"))
            .collect();
        if !missing.is_empty() {
            lines.push(format!("  Missing values: {}", missing.join(", ")));
        }
        if let Some(duplicates) = stats.duplicates {
            lines.push(format!("  Duplicate rows: {duplicates}"));
        }
        if !stats.temporal_gaps.is_empty() {
            let gaps: Vec<String> = stats
                .temporal_gaps
                .iter()
                .map(|(city, count)| format!("{city}={count}"))
                .collect();
            lines.push(format!("  Temporal gaps: {}", gaps.join(", ")));
        }
        for (column, outliers) in &stats.outliers {
            lines.push(format!(
                "  Outliers {column}: {} ({:.2}%), bounds [{:.2}, {:.2}]",
                outliers.count, outliers.percentage, outliers.bounds.0, outliers.bounds.1
            ));
        }
    }
}

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        Ok(self.render(report))
    }
}

/// Formats a report as JSON for programmatic consumption.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a pretty-printing formatter that includes everything.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::detailed(),
            pretty: true,
        }
    }

    /// Creates a formatter with a custom configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to pretty-print the JSON output.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        let mut value = serde_json::to_value(report)?;
        if let Some(object) = value.as_object_mut() {
            if !self.config.include_statistics {
                object.remove("statistics");
            }
            if !self.config.include_timestamps {
                object.remove("timestamp");
                object.remove("execution_time_ms");
            }
            if let Some(max) = self.config.max_findings {
                for key in ["errors", "warnings"] {
                    if let Some(serde_json::Value::Array(findings)) = object.get_mut(key) {
                        findings.truncate(max);
                    }
                }
            }
        }

        let json = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(json)
    }
}

/// Formats a report as Markdown, for CI summaries and documentation.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    /// Creates a formatter with statistics tables and level-2 headings.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::detailed(),
            heading_level: 2,
        }
    }

    /// Creates a formatter with a custom configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the starting heading level (1-6).
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 6);
        self
    }

    fn write_report(&self, report: &ValidationReport, out: &mut String) -> std::fmt::Result {
        let h1 = "#".repeat(self.heading_level as usize);
        let h2 = "#".repeat((self.heading_level + 1).min(6) as usize);

        writeln!(out, "{h1} Data Quality Report: `{}`", report.dataset())?;
        writeln!(out)?;
        let status = if report.passed() {
            "✅ PASSED"
        } else {
            "❌ FAILED"
        };
        writeln!(out, "**Status:** {status}  ")?;
        writeln!(out, "**Total rows:** {}  ", report.total_rows())?;
        if self.config.include_timestamps {
            writeln!(out, "**Timestamp:** {}  ", report.timestamp())?;
            writeln!(out, "**Execution time:** {}ms  ", report.execution_time_ms())?;
        }

        for (level, title) in [(Level::Error, "Errors"), (Level::Warning, "Warnings")] {
            let findings = report.findings(level);
            if findings.is_empty() {
                continue;
            }
            writeln!(out)?;
            writeln!(out, "{h2} {title} ({})", findings.len())?;
            writeln!(out)?;
            let shown = self.config.visible(findings);
            for finding in shown {
                writeln!(out, "- {finding}")?;
            }
            if shown.len() < findings.len() {
                writeln!(out, "- *... and {} more*", findings.len() - shown.len())?;
            }
        }

        if report.is_clean() {
            writeln!(out)?;
            writeln!(out, "No problems found.")?;
        }

        if self.config.include_statistics {
            self.write_statistics(report, &h2, out)?;
        }
        Ok(())
    }

    fn write_statistics(
        &self,
        report: &ValidationReport,
        heading: &str,
        out: &mut String,
    ) -> std::fmt::Result {
        let stats = report.statistics();
        if stats.is_empty() {
            return Ok(());
        }
        writeln!(out)?;
        writeln!(out, "{heading} Statistics")?;

        if !stats.missing_values.is_empty() {
            writeln!(out)?;
            writeln!(out, "| Column | Missing |")?;
            writeln!(out, "|--------|---------|")?;
            for (column, count) in &stats.missing_values {
                writeln!(out, "| {column} | {count} |")?;
            }
        }

        if let Some(duplicates) = stats.duplicates {
            writeln!(out)?;
            writeln!(out, "Duplicate rows: **{duplicates}**")?;
        }

        if !stats.temporal_gaps.is_empty() {
            writeln!(out)?;
            writeln!(out, "| City | Gaps |")?;
            writeln!(out, "|------|------|")?;
            for (city, count) in &stats.temporal_gaps {
                writeln!(out, "| {city} | {count} |")?;
            }
        }

        if !stats.outliers.is_empty() {
            writeln!(out)?;
            writeln!(out, "| Parameter | Outliers | % | Lower | Upper |")?;
            writeln!(out, "|-----------|----------|---|-------|-------|")?;
            for (column, o) in &stats.outliers {
                writeln!(
                    out,
                    "| {column} | {} | {:.2} | {:.2} | {:.2} |",
                    o.count, o.percentage, o.bounds.0, o.bounds.1
                )?;
            }
        }
        Ok(())
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        let mut out = String::new();
        self.write_report(report, &mut out)
            .map_err(|e| AqError::Internal(format!("Failed to render markdown: {e}")))?;
        Ok(out)
    }
}
