//! Logging Infrastructure
//!
//! `tracing` subscriber setup. Console output in development; JSON lines into
//! a daily rolling file when a log directory is configured.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with console output only
pub fn init_logger(log_level: &str) {
    init_logger_with_file(log_level, None);
}

/// Initialize the logger with optional file output
///
/// `RUST_LOG` overrides `log_level` when set. Calling this twice is harmless;
/// the second subscriber is ignored.
pub fn init_logger_with_file(log_level: &str, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},redb=warn", log_level)));

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if let Err(e) = std::fs::create_dir_all(log_path) {
            eprintln!("Cannot create log directory {}: {}", dir, e);
        } else {
            let file_appender = tracing_appender::rolling::daily(log_path, "ledger-server");
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_writer(file_appender)
                .try_init();
            return;
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true)
        .try_init();
}
