//! Logging Infrastructure
//!
//! Console logging by default, daily rolling files when a log directory
//! is configured. `RUST_LOG` takes precedence over the configured level.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with optional file output
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // Add file output if log_dir exists
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "print-agent");
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
        eprintln!("Log directory {} does not exist, logging to stdout", dir);
    }

    subscriber.init();
}
