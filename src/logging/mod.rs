//! Application logging functionality
//!
//! Logs go to stderr and, when the logs directory can be created, to a
//! daily file under ~/.config/iconpress/logs/.

use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "iconpress.log";

/// Get the path to the logs directory
pub fn logs_dir() -> PathBuf {
    crate::core::config_file::ConfigFile::config_dir().join("logs")
}

/// Get the path to the current log file
pub fn current_log_file() -> PathBuf {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d");
    logs_dir().join(format!("{LOG_FILE_PREFIX}.{timestamp}"))
}

/// Filter used when RUST_LOG is not set
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "iconpress=debug,info"
    } else {
        "info"
    }
}

/// Install the global subscriber
///
/// Keep the returned guard alive until exit, dropping it flushes the file
/// writer. `None` means only stderr logging is active.
pub fn init(verbose: bool) -> Option<WorkerGuard> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)))
    };
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter());

    let logs_dir = logs_dir();
    match fs::create_dir_all(&logs_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(&logs_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter());
            let _ = tracing_subscriber::registry()
                .with(stderr_layer)
                .with(file_layer)
                .try_init();
            tracing::debug!("Logging to {}", current_log_file().display());
            Some(guard)
        }
        Err(e) => {
            let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
            tracing::debug!("No log file, cannot create {}: {}", logs_dir.display(), e);
            None
        }
    }
}
