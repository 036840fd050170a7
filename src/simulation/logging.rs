//! Logging and tracing configuration
//!
//! [`LoggingConfig`] builds the global subscriber used by the binary and by tests:
//! a console layer on stderr (pretty or JSON) and, optionally, a daily-rolling JSON
//! file. The [`sim_event!`](crate::sim_event) and [`perf_span!`](crate::perf_span)
//! macros tag events and spans with the component that produced them.

use std::error::Error;
use std::io;
use tracing::{debug, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Result of installing the global subscriber
///
/// Holds the file writer guard when file logging is on; dropping it flushes and
/// stops the background writer.
pub type LoggingResult = Result<Option<WorkerGuard>, Box<dyn Error + Send + Sync>>;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the crate's own targets
    pub level: Level,
    /// Emit JSON on the console instead of pretty output
    pub json_format: bool,
    /// Directory for daily-rolling JSON log files, if any
    pub log_directory: Option<String>,
    /// Log file prefix
    pub log_file_prefix: String,
    /// Emit span enter/exit events
    pub enable_span_events: bool,
    /// Whether to enable ansi colors in console output
    pub enable_ansi: bool,
    /// Filter directive overriding both `RUST_LOG` and `level`
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            log_directory: None,
            log_file_prefix: env!("CARGO_PKG_NAME").to_string(),
            enable_span_events: false,
            enable_ansi: true,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enable JSON console output
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Also write JSON logs to `directory`
    pub fn with_file_logging(mut self, directory: impl Into<String>) -> Self {
        self.log_directory = Some(directory.into());
        self
    }

    /// Set log file prefix
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_file_prefix = prefix.into();
        self
    }

    /// Enable span events
    pub fn with_span_events(mut self) -> Self {
        self.enable_span_events = true;
        self
    }

    /// Disable ANSI colors
    pub fn without_ansi(mut self) -> Self {
        self.enable_ansi = false;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Filter directive applied when neither `env_filter` nor `RUST_LOG` is set
    pub fn default_directive(&self) -> String {
        format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), self.level)
    }

    fn span_events(&self) -> FmtSpan {
        if self.enable_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn build_filter(&self) -> Result<EnvFilter, Box<dyn Error + Send + Sync>> {
        match &self.env_filter {
            Some(filter) => Ok(EnvFilter::try_new(filter)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))),
        }
    }

    /// Install the global tracing subscriber
    ///
    /// Fails if a global subscriber is already set.
    pub fn init(self) -> LoggingResult {
        let filter = self.build_filter()?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        let console: BoxedLayer = if self.json_format {
            fmt::layer().json().with_writer(io::stderr).with_span_events(self.span_events()).boxed()
        } else {
            fmt::layer()
                .pretty()
                .with_writer(io::stderr)
                .with_ansi(self.enable_ansi)
                .with_span_events(self.span_events())
                .boxed()
        };
        layers.push(console);

        let guard = match &self.log_directory {
            Some(directory) => {
                let appender = rolling::daily(directory, &self.log_file_prefix);
                let (writer, guard) = non_blocking(appender);
                layers.push(
                    fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_span_events(self.span_events())
                        .boxed(),
                );
                Some(guard)
            }
            None => None,
        };

        Registry::default().with(layers).with(filter).try_init()?;
        debug!(level = %self.level, json = self.json_format, file = ?self.log_directory, "Logging initialized");
        Ok(guard)
    }

    /// Warnings only, no colors
    pub fn init_test() -> LoggingResult {
        Self::new().with_level(Level::WARN).without_ansi().init()
    }

    /// INFO level with span events
    pub fn init_verbose() -> LoggingResult {
        Self::new().with_level(Level::INFO).with_span_events().init()
    }

    /// DEBUG level with span events
    pub fn init_debug() -> LoggingResult {
        Self::new().with_level(Level::DEBUG).with_span_events().init()
    }
}

/// Macro for creating structured log events with simulation context
#[macro_export]
macro_rules! sim_event {
    ($level:ident, $message:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::$level!(
            message = $message,
            component = "simulation",
            $($key = $value,)*
        );
    };
    ($level:ident, $message:expr) => {
        tracing::$level!(
            message = $message,
            component = "simulation",
        );
    };
}

/// Macro for creating performance measurement spans around batch work
#[macro_export]
macro_rules! perf_span {
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info_span!(
            $name,
            component = "performance",
            $($key = $value,)*
        )
    };
    ($name:expr) => {
        tracing::info_span!(
            $name,
            component = "performance",
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::new();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.json_format);
        assert!(config.log_directory.is_none());
        assert_eq!(config.log_file_prefix, "mm1-queue-simulator");
        assert!(!config.enable_span_events);
        assert!(config.enable_ansi);
        assert!(config.env_filter.is_none());
    }

    #[test]
    fn test_logging_config_builder_pattern() {
        let config = LoggingConfig::new()
            .with_level(Level::DEBUG)
            .with_json_format()
            .with_file_logging("test_logs")
            .with_file_prefix("queue_runs")
            .with_span_events()
            .without_ansi()
            .with_env_filter("debug");

        assert_eq!(config.level, Level::DEBUG);
        assert!(config.json_format);
        assert_eq!(config.log_directory, Some("test_logs".to_string()));
        assert_eq!(config.log_file_prefix, "queue_runs");
        assert!(config.enable_span_events);
        assert!(!config.enable_ansi);
        assert_eq!(config.env_filter, Some("debug".to_string()));
    }

    #[test]
    fn test_default_directive_targets_this_crate() {
        let config = LoggingConfig::new().with_level(Level::WARN);
        assert_eq!(config.default_directive(), "mm1_queue_simulator=WARN");
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        let config = LoggingConfig::new().with_env_filter("mm1_queue_simulator=loudest");
        assert!(config.init().is_err());
    }
}
