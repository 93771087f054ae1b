//! Logger bootstrap.
//!
//! Logs go to stderr unless a log directory is configured, in which case they
//! go to size-rotated files there. `RUST_LOG` overrides the configured level.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;

const LOG_FILE_BASENAME: &str = "taskers";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;
const MAX_LOGGED_INPUT_CHARS: usize = 60;

/// Starts the global logger. Keep the handle alive until exit so buffered
/// file output gets flushed.
pub fn init(level: &str, log_dir: Option<&Path>) -> Result<LoggerHandle> {
    let logger = Logger::try_with_env_or_str(level)
        .with_context(|| format!("invalid log level `{level}`"))?;

    let handle = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .start()
        }
        None => logger.start(),
    }
    .context("failed to start logger")?;

    info!(
        "event=app_start version={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        log_dir.map_or_else(|| "-".to_string(), |d| d.display().to_string())
    );
    Ok(handle)
}

/// Puts user-typed text on one line and caps its length before logging.
pub fn sanitize(value: &str) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated: String = normalized.chars().take(MAX_LOGGED_INPUT_CHARS).collect();
    if normalized.chars().count() > MAX_LOGGED_INPUT_CHARS {
        truncated.push_str("...");
    }
    truncated
}
