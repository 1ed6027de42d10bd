/// Telemetry Module - Structured Logging with Tracing
///
/// - JSON or pretty output
/// - Optional file output with rotation
/// - `RUST_LOG` overrides the configured level

use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Result, SummaryError};

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub log_level: String,
    /// Log format: "json" or "pretty"
    pub log_format: String,
    /// Optional log file path (None = stderr only)
    pub log_file: Option<String>,
    /// Rotation interval: "daily", "hourly", "never"
    pub rotation: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            log_file: None,
            rotation: "daily".to_string(),
        }
    }
}

fn config_error(message: String) -> SummaryError {
    SummaryError::Config(config::ConfigError::Message(message))
}

fn file_appender(log_file: &str, rotation: &str) -> Result<rolling::RollingFileAppender> {
    let path = std::path::Path::new(log_file);
    let directory = path
        .parent()
        .ok_or_else(|| config_error(format!("log file without directory: {}", log_file)))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| config_error(format!("log file without name: {}", log_file)))?;
    let prefix = path.file_stem().unwrap_or(file_name);

    Ok(match rotation {
        "hourly" => rolling::hourly(directory, prefix),
        "never" => rolling::never(directory, file_name),
        _ => rolling::daily(directory, prefix),
    })
}

/// Initialize the global tracing subscriber
///
/// The returned guard flushes the file writer on drop; hold it for the
/// lifetime of the process. Console output goes to stderr so summaries on
/// stdout stay machine readable.
pub fn init_tracing(config: &TelemetryConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let json = config.log_format == "json";

    let (writer, guard) = match &config.log_file {
        Some(log_file) => {
            let (non_blocking, guard) =
                tracing_appender::non_blocking(file_appender(log_file, &config.rotation)?);
            (non_blocking, Some(guard))
        }
        None => {
            let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
            (non_blocking, Some(guard))
        }
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(writer),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(config.log_file.is_none())
                    .with_writer(writer),
            )
            .try_init()
    };

    // A subscriber installed earlier (tests, embedding apps) wins
    if installed.is_err() {
        return Ok(None);
    }
    Ok(guard)
}

/// Truncate hex string for logging
///
/// Example: "0a1b2c3d4e5f67890a1b2c3d4e5f6789" → "0a1b2c3d4e5f6789..."
pub fn truncate_hex(hex: &str, len: usize) -> String {
    match hex.get(..len) {
        Some(head) if hex.len() > len => format!("{}...", head),
        _ => hex.to_string(),
    }
}
