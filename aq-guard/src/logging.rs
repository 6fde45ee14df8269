//! Logging utilities and configuration for aq-guard.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary (see [`setup::init_logging`]).

use tracing::Level;

/// Controls how much a validation run logs beyond its summary.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log each check's duration and every finding at debug level
    pub log_check_details: bool,
    /// Log how much data was loaded before validating it
    pub log_data_operations: bool,
    /// Findings longer than this are truncated in logs (temporal gap
    /// warnings list every affected city)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_check_details: false,
            log_data_operations: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Logs every check and every finding.
    pub fn verbose() -> Self {
        Self {
            log_check_details: true,
            log_data_operations: true,
            max_field_length: 1024,
        }
    }

    /// Only the start and summary events of each run.
    pub fn quiet() -> Self {
        Self {
            log_check_details: false,
            log_data_operations: false,
            max_field_length: 128,
        }
    }

    /// Picks the preset matching a subscriber level: `verbose` at debug and
    /// below, the default otherwise.
    pub fn for_level(level: Level) -> Self {
        if level >= Level::DEBUG {
            Self::verbose()
        } else {
            Self::default()
        }
    }
}

/// Logs a check outcome only when check details are enabled.
#[macro_export]
macro_rules! log_check {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_check_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Logs a data loading step only when data operations are enabled.
#[macro_export]
macro_rules! log_data_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_data_operations {
            tracing::info!($($arg)*);
        }
    };
}

/// Cuts `value` to at most `max_length` bytes on a character boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut cut = max_length;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...(truncated)", &value[..cut])
}

/// Subscriber installation for the `aq-validate` binary.
pub mod setup {
    use tracing::Level;

    /// Subscriber settings.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Level for dependencies such as DataFusion
        pub level: Level,
        /// Level for aq-guard and the binary
        pub crate_level: Level,
        /// Emit one JSON object per event
        pub json_format: bool,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: false,
            }
        }
    }

    impl LoggingConfig {
        /// Sets the level for aq-guard components.
        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        /// Sets whether events are written as JSON.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// The `EnvFilter` directive used when `RUST_LOG` is unset.
        pub fn directive(&self) -> String {
            let crate_level = self.crate_level.as_str().to_lowercase();
            format!(
                "{},aq_guard={crate_level},aq_validate={crate_level}",
                self.level.as_str().to_lowercase()
            )
        }
    }

    /// Installs a global subscriber writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over the configured levels. Logs go to
    /// stderr so the rendered report on stdout stays machine-readable.
    ///
    /// ```rust,no_run
    /// use aq_guard::logging::setup::{init_logging, LoggingConfig};
    /// use tracing::Level;
    ///
    /// init_logging(LoggingConfig::default().with_crate_level(Level::DEBUG)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.directive()));

        let events = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        let events = if config.json_format {
            events.json().boxed()
        } else {
            events.boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(events)
            .try_init()?;
        Ok(())
    }
}
