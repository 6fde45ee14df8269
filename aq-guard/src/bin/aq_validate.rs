//! aq-validate
//!
//! Validates a daily air-quality dataset and prints the quality report.
//! Exits with 0 when the data passed, 1 when it failed and 2 when the
//! validation could not run.

use anyhow::{Context, Result};
use aq_guard::config::ValidatorConfig;
use aq_guard::core::DataValidator;
use aq_guard::formatters::{JsonFormatter, MarkdownFormatter, ReportFormatter, TextFormatter};
use aq_guard::logging::setup::{init_logging, LoggingConfig};
use aq_guard::logging::LogConfig;
use aq_guard::pipeline::validate_data_pipeline;
use aq_guard::sources::{self, DailyAggregation};
use clap::{Parser, ValueEnum};
use datafusion::prelude::SessionContext;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Markdown,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV or NDJSON files, or glob patterns, to validate as one table
    #[arg(required = true)]
    inputs: Vec<String>,

    /// JSON file overriding the default validator configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Treat the inputs as hourly readings and validate their daily means
    #[arg(long)]
    hourly: bool,

    /// Non-missing hourly pm2.5 readings a city must exceed to be kept
    #[arg(long, default_value_t = 10_000, requires = "hourly")]
    min_hourly_readings: u64,

    /// Name the dataset is registered under
    #[arg(long, default_value = "data")]
    table: String,

    /// Log level for aq-guard
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Format {
    fn formatter(self) -> Box<dyn ReportFormatter> {
        match self {
            Format::Text => Box::new(TextFormatter::new()),
            Format::Json => Box::new(JsonFormatter::new()),
            Format::Markdown => Box::new(MarkdownFormatter::new()),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let logging = LoggingConfig::default()
        .with_crate_level(args.log_level)
        .with_json_format(args.json_logs);
    if let Err(e) = init_logging(logging) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(&args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!(error = %e, "Validation did not complete");
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(args: &Args) -> Result<bool> {
    let config = match &args.config {
        Some(path) => ValidatorConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ValidatorConfig::default(),
    };
    let validator = DataValidator::new(config)
        .context("building the validator")?
        .with_log_config(LogConfig::for_level(args.log_level));

    let mut source = sources::open(&args.inputs).context("opening the input files")?;
    if args.hourly {
        source = Box::new(
            DailyAggregation::new(source).with_min_hourly_readings(args.min_hourly_readings),
        );
    }

    let ctx = SessionContext::new();
    let formatter = args.format.formatter();
    let outcome = validate_data_pipeline(
        &ctx,
        source.as_ref(),
        &args.table,
        &validator,
        formatter.as_ref(),
    )
    .await?;

    println!("{}", outcome.rendered);
    Ok(outcome.passed)
}
