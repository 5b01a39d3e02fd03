//! Subscriber setup shared by the binaries.
//!
//! Library code only emits `tracing` events; the binaries call
//! [`init_logging`] once and keep the returned guard alive until exit.

use anyhow::{anyhow, Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Flushes the log file, if any, when dropped.
#[must_use = "dropping the guard early loses buffered log lines"]
pub struct LoggingGuard {
    file: Option<Arc<File>>,
}

impl Drop for LoggingGuard {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = (&**file).flush();
        }
    }
}

pub fn parse_level(level: &str) -> Result<LevelFilter> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| anyhow!("Invalid log level: {:?}", level))
}

/// Installs the global subscriber: stderr output plus an optional append-only
/// plain-text file. `LOG_LEVEL` in the environment takes precedence over
/// `level`.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Result<LoggingGuard> {
    let default_level = parse_level(level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(LOG_LEVEL_ENV)
        .from_env_lossy();

    let file = match log_file {
        Some(path) => Some(Arc::new(open_log_file(path)?)),
        None => None,
    };
    let file_layer = file.clone().map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(LoggingGuard { file })
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {:?}", parent))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {:?}", path))
}
