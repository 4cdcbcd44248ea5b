//! Tracing setup shared by the command-line tools
use std::path::PathBuf;

/// Directory the rolling log files are written to
pub fn log_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("KickerVision").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Install the global subscriber: a daily-rotated file plus stderr
///
/// Stdout is left to the tools' verdict lines. The filter comes from
/// `RUST_LOG` and defaults to `info`.
pub fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = log_dir();

    // Create log directory if it doesn't exist
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    // Create file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "kicker-vision.log");

    // Configure filter (info level by default)
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .with_target(false);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    match installed {
        Ok(()) => tracing::debug!("Log directory: {}", log_dir.display()),
        Err(e) => eprintln!("Warning: Tracing already initialized: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_ends_with_app_folder() {
        let dir = log_dir();
        assert!(dir.ends_with("logs"));
    }
}
