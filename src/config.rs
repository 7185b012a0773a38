/*!
 * Configuration types for upypack
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, UpyError};

/// Default glob for source files inside a package directory
pub const DEFAULT_SOURCE_PATTERN: &str = "*.py";

/// Default manifest file name, created next to the descriptor
pub const DEFAULT_MANIFEST_FILE_NAME: &str = "manifest.json";

/// Tool configuration, loadable from a TOML file and overridden by CLI flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Emit diagnostics at all
    #[serde(default)]
    pub debug: bool,

    /// Indent JSON output by 4 spaces
    #[serde(default)]
    pub pretty: bool,

    /// Glob matched against files directly inside each package directory
    #[serde(default = "default_source_pattern")]
    pub source_pattern: String,

    /// File name used when no manifest path is given for `create`
    #[serde(default = "default_manifest_file_name")]
    pub manifest_file_name: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            log_file: None,
            debug: false,
            pretty: false,
            source_pattern: default_source_pattern(),
            manifest_file_name: default_manifest_file_name(),
        }
    }
}

impl ToolConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ToolConfig = toml::from_str(&contents)
            .map_err(|e| UpyError::Config(format!("{}: {}", path.display(), e)))?;
        config.check()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| UpyError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values that would only fail later, deep inside an operation
    pub fn check(&self) -> Result<()> {
        glob::Pattern::new(&self.source_pattern).map_err(|e| {
            UpyError::Config(format!(
                "Invalid source pattern '{}': {}",
                self.source_pattern, e
            ))
        })?;

        if self.manifest_file_name.is_empty()
            || self.manifest_file_name.contains(['/', '\\'])
        {
            return Err(UpyError::Config(format!(
                "Invalid manifest file name '{}'",
                self.manifest_file_name
            )));
        }

        Ok(())
    }
}

/// Logging level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Nothing at all
    Off,

    /// Only errors
    #[default]
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to a tracing level filter
    pub fn to_level_filter(&self) -> tracing::level_filters::LevelFilter {
        use tracing::level_filters::LevelFilter;
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }

    /// Map a `-v` repetition count to a level
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 | 1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

fn default_source_pattern() -> String {
    DEFAULT_SOURCE_PATTERN.to_string()
}

fn default_manifest_file_name() -> String {
    DEFAULT_MANIFEST_FILE_NAME.to_string()
}
