//! Logging initialization

use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Initialize logging
///
/// Logs go to stderr, or to `log_file` without ANSI codes. The level is
/// `info` (`debug` with the debug flag) unless `RUST_LOG` says otherwise.
pub fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_writer(file)
                .with_env_filter(filter)
                .with_ansi(false) // No ANSI codes in log file
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
