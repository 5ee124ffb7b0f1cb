use crate::error::ConfigError;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";
const LOG_FILE_PREFIX: &str = "daqss.log";

/// Installs the global `tracing` subscriber.
///
/// The filter is taken from `RUST_LOG` and falls back to `info`. When
/// `log_dir` is given, output goes to a daily-rolling file in that directory
/// instead of stdout; keep the returned guard alive until shutdown so buffered
/// lines are flushed.
pub fn init_tracing(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|e| ConfigError::TelemetryError(e.to_string()))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .try_init()
                .map_err(|e| ConfigError::TelemetryError(e.to_string()))?;
            Ok(None)
        }
    }
}
