//! Tracing setup: console output plus a daily rolling log file

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;
use crate::error::{Error, Result};

/// Log file name inside `output_file_path`
pub const LOG_FILE_NAME: &str = "app.log";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `logging_level`. The returned guard flushes the file
/// writer on drop and must be held for the life of the process.
pub fn init(config: &AppConfig) -> Result<WorkerGuard> {
    init_with_dir(&config.output_file_path, &config.logging_level)
}

/// Install the global subscriber writing its file under `log_dir`
pub fn init_with_dir(log_dir: &Path, level: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir).map_err(|e| {
        Error::Config(format!(
            "Failed to create log directory {}: {}",
            log_dir.display(),
            e
        ))
    })?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().with_writer(file_writer).with_ansi(false);
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    Ok(guard)
}

/// Map a config level (`INFO`, `Warning`, ...) to a filter directive
fn filter_directive(level: &str) -> String {
    let level = match level.trim().to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        "" => "info".to_string(),
        other => other.to_string(),
    };
    format!("{level},tower_http=info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("INFO"), "info,tower_http=info");
        assert_eq!(filter_directive("WARNING"), "warn,tower_http=info");
        assert_eq!(filter_directive("critical"), "error,tower_http=info");
        assert_eq!(filter_directive(""), "info,tower_http=info");
    }
}
