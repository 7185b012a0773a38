/*!
 * Logging and tracing initialization
 *
 * Diagnostics are built as an explicit `Dispatch` so callers can either install
 * it globally (the CLI) or hand it to a `Packager` that scopes its events to it.
 */

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Dispatch;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    EnvFilter,
};

use crate::config::{LogLevel, ToolConfig};
use crate::error::{Result, UpyError};

/// Severity threshold and on/off switch for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogSettings {
    pub level: LogLevel,
    pub enabled: bool,
    pub log_file: Option<PathBuf>,
}

impl LogSettings {
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            level: config.log_level,
            enabled: config.debug,
            log_file: config.log_file.clone(),
        }
    }

    /// Level actually applied, `Off` while disabled
    pub fn effective_level(&self) -> LogLevel {
        if self.enabled {
            self.level
        } else {
            LogLevel::Off
        }
    }
}

/// Build a dispatcher for the given settings
pub fn build_dispatch(settings: &LogSettings) -> Result<Dispatch> {
    let env_filter = build_filter(settings)?;

    if let Some(ref log_path) = settings.log_file {
        file_dispatch(log_path, env_filter)
    } else {
        Ok(stderr_dispatch(env_filter))
    }
}

/// Install the dispatcher for the given settings process-wide
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let dispatch = build_dispatch(settings)?;
    tracing::dispatcher::set_global_default(dispatch)
        .map_err(|e| UpyError::Config(format!("Failed to install logger: {}", e)))
}

fn build_filter(settings: &LogSettings) -> Result<EnvFilter> {
    if !settings.enabled {
        return Ok(EnvFilter::new(LogLevel::Off.to_level_filter().to_string()));
    }

    EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(format!(
                "upypack={}",
                settings.effective_level().to_level_filter()
            ))
        })
        .map_err(|e| UpyError::Config(format!("Failed to create log filter: {}", e)))
}

// stdout carries the JSON output, so diagnostics go to stderr
fn stderr_dispatch(env_filter: EnvFilter) -> Dispatch {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .compact();

    Dispatch::new(tracing_subscriber::registry().with(env_filter).with(fmt_layer))
}

fn file_dispatch(log_path: &Path, env_filter: EnvFilter) -> Result<Dispatch> {
    let file = File::create(log_path)
        .map_err(|e| UpyError::Config(format!("Failed to create log file: {}", e)))?;

    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false) // No ANSI colors in file
        .json();

    Ok(Dispatch::new(
        tracing_subscriber::registry().with(env_filter).with(fmt_layer),
    ))
}
