//! Centralized logging infrastructure for the capture history library
//!
//! This module provides:
//! - Structured logging with tracing
//! - Configurable log levels (Off, Error, Warn, Info, Debug, Trace)
//! - Optional daily-rotated log file
//! - Cross-platform log file locations

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::logging::{APP_DIR_NAME, LOG_FILE_NAME};
use crate::settings::HistorySettings;

lazy_static! {
    // Global handle for reloading log level dynamically
    static ref LOG_RELOAD_HANDLE: Mutex<Option<Handle<EnvFilter, Registry>>> = Mutex::new(None);
}

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            LogLevel::Off => "Off",
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        };
        write!(f, "{}", value)
    }
}

impl From<LogLevel> for Option<Level> {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Get the platform-specific logs directory
pub fn get_logs_dir() -> Result<PathBuf> {
    let logs_dir = if cfg!(target_os = "macos") {
        // macOS: ~/Library/Logs/CaptureHistory
        dirs::home_dir()
            .context("Failed to get home directory")?
            .join("Library")
            .join("Logs")
            .join(APP_DIR_NAME)
    } else {
        // Windows: %LOCALAPPDATA%\CaptureHistory\logs
        // Linux: ~/.local/share/CaptureHistory/logs
        dirs::data_local_dir()
            .context("Failed to get local data directory")?
            .join(APP_DIR_NAME)
            .join("logs")
    };

    if !logs_dir.exists() {
        fs::create_dir_all(&logs_dir)
            .with_context(|| format!("Failed to create logs directory: {:?}", logs_dir))?;
    }

    Ok(logs_dir)
}

fn build_filter(log_level: LogLevel) -> Result<EnvFilter> {
    let level: Option<Level> = log_level.into();
    match level {
        Some(lvl) => Ok(EnvFilter::new("off").add_directive(
            format!("capture_history={}", lvl.as_str())
                .parse()
                .context("Invalid log filter directive")?,
        )),
        None => Ok(EnvFilter::new("off")),
    }
}

/// Initialize the logging system
///
/// Calling this again only swaps the level filter; the file layer is
/// decided on the first call.
pub fn init_logging(log_level: LogLevel, log_to_file: bool) -> Result<()> {
    let level_filter = build_filter(log_level)?;

    let mut handle_guard = LOG_RELOAD_HANDLE
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(handle) = handle_guard.as_ref() {
        handle.reload(level_filter).context("Failed to reload log filter")?;
        return Ok(());
    }

    let (filter_layer, reload_handle) = tracing_subscriber::reload::Layer::new(level_filter);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let registry = tracing_subscriber::registry().with(filter_layer).with(fmt_layer);

    if log_to_file {
        let logs_dir = get_logs_dir()?;
        let appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, LOG_FILE_NAME);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(appender)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(false)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        registry
            .with(file_layer)
            .try_init()
            .context("Failed to install tracing subscriber")?;
    } else {
        registry
            .try_init()
            .context("Failed to install tracing subscriber")?;
    }

    *handle_guard = Some(reload_handle);
    Ok(())
}

/// Initialize logging from persisted settings
pub fn init_from_settings(settings: &HistorySettings) -> Result<()> {
    let level = settings.parsed_log_level().unwrap_or(LogLevel::Error);
    init_logging(level, settings.log_to_file)?;
    if settings.log_to_file {
        auto_cleanup_old_logs(settings.log_retention_days);
    }
    Ok(())
}

/// Clean up old log files
///
/// Returns the number of files deleted.
pub fn cleanup_old_logs(logs_dir: &Path, keep_days: u32) -> Result<usize> {
    let now = std::time::SystemTime::now();
    let keep_duration = std::time::Duration::from_secs(keep_days as u64 * 24 * 60 * 60);

    let mut deleted_count = 0;

    for entry in fs::read_dir(logs_dir)
        .with_context(|| format!("Failed to read logs directory: {:?}", logs_dir))?
    {
        let entry = entry?;
        let path = entry.path();

        // Rolled files look like `capture_history.log.2024-01-01`
        let is_log = path
            .file_name()
            .and_then(|s| s.to_str())
            .map_or(false, |name| name.starts_with(LOG_FILE_NAME));
        if !path.is_file() || !is_log {
            continue;
        }

        let metadata = entry.metadata()?;
        if let Ok(modified) = metadata.modified() {
            if let Ok(age) = now.duration_since(modified) {
                if age > keep_duration && fs::remove_file(&path).is_ok() {
                    deleted_count += 1;
                    tracing::debug!(file = ?path, age_days = age.as_secs() / 86400, "Deleted old log file");
                }
            }
        }
    }

    Ok(deleted_count)
}

/// Auto-cleanup old logs on startup (runs in background)
pub fn auto_cleanup_old_logs(keep_days: u32) {
    std::thread::spawn(move || {
        if let Ok(logs_dir) = get_logs_dir() {
            match cleanup_old_logs(&logs_dir, keep_days) {
                Ok(count) if count > 0 => {
                    tracing::info!(deleted_count = count, "Cleaned up old log files");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to cleanup old log files");
                }
                _ => {}
            }
        }
    });
}
