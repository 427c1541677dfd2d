//! File-based logging bootstrap.
//!
//! Logs go to rotating files, never to the terminal, so the TUI screen is not
//! corrupted. Initialization happens at most once per process; asking again
//! with the same level and directory is a no-op, anything else is rejected.

use std::path::{Path, PathBuf};

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;

use crate::error::AppError;

const LOG_FILE_BASENAME: &str = "rfp";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Start file logging at `level` under `log_dir`.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), AppError> {
    let level = normalize_level(level).map_err(|e| AppError::new(2, e))?;

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, AppError> {
        std::fs::create_dir_all(log_dir).map_err(|e| {
            AppError::new(
                2,
                format!("Failed to create log directory '{}': {e}", log_dir.display()),
            )
        })?;

        let logger = Logger::try_with_str(level)
            .map_err(|e| AppError::new(2, format!("Invalid log level '{level}': {e}")))?
            .log_to_file(
                FileSpec::default()
                    .directory(log_dir)
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|e| AppError::new(2, format!("Failed to start logger: {e}")))?;

        install_panic_hook();

        info!(
            "event=app_start status=ok version={} level={level} log_dir={}",
            env!("CARGO_PKG_VERSION"),
            log_dir.display()
        );

        Ok(LoggingState {
            level,
            log_dir: log_dir.to_path_buf(),
            _logger: logger,
        })
    })?;

    if state.log_dir != log_dir {
        return Err(AppError::new(
            2,
            format!(
                "Logging already initialized at '{}'; refusing to switch to '{}'",
                state.log_dir.display(),
                log_dir.display()
            ),
        ));
    }
    if state.level != level {
        return Err(AppError::new(
            2,
            format!(
                "Logging already initialized at level '{}'; refusing to switch to '{level}'",
                state.level
            ),
        ));
    }
    Ok(())
}

/// Active `(level, log_dir)`, if logging was started.
#[cfg(test)]
fn logging_status() -> Option<(&'static str, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(format!(
            "Unsupported log level '{other}'; expected trace|debug|info|warn|error|off"
        )),
    }
}

fn install_panic_hook() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = panic_info.payload().downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        error!(
            "event=panic status=error location={location} payload=\"{}\"",
            sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous_hook(panic_info);
    }));
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
