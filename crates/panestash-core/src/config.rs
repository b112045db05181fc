//! Configuration management for panestash
//!
//! Handles loading and validation of panestash.toml configuration files.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::RestoreConfig;
use crate::error::ConfigError;
use crate::logging::{LogConfig, LogError, LogLevel, init_logging};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PANESTASH_CONFIG";

/// Default config file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "panestash.toml";

/// Default store file name inside the data directory.
pub const STORE_FILE_NAME: &str = "layouts.json";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Snapshot store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Restore behavior
    #[serde(default)]
    pub restore: RestoreConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON lines
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown log format: {s}. Expected pretty or json")),
        }
    }
}

/// General configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Optional log file
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            log_file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Snapshot store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store file; defaults to `<data_dir>/panestash/layouts.json`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.display().to_string(), e.to_string()))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load the resolved config file, or defaults when there is none.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match resolve_config_path(explicit) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load the config and install logging from it, applying an optional
    /// level override. Logging installed earlier in the process is kept.
    pub fn bootstrap(explicit: Option<&Path>, level_override: Option<&str>) -> crate::Result<Self> {
        let config = Self::load_or_default(explicit)?;
        let mut log = config.log_config();
        if let Some(level) = level_override {
            log.level = level.to_string();
        }
        match init_logging(&log) {
            Ok(()) | Err(LogError::AlreadyInitialized) => Ok(config),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.general
            .log_level
            .parse::<LogLevel>()
            .map_err(ConfigError::ValidationError)?;
        if let Some(path) = &self.store.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::ValidationError(
                    "store.path must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Store file location: `[store] path`, else the platform data dir.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        if let Some(path) = &self.store.path {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("panestash")
            .join(STORE_FILE_NAME)
    }

    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.general.log_level.clone(),
            format: self.general.log_format,
            file: self.general.log_file.clone(),
        }
    }
}

/// Locate the config file: `explicit`, then `$PANESTASH_CONFIG`, then
/// `<config_dir>/panestash/panestash.toml` if it exists.
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    let default = dirs::config_dir()?.join("panestash").join(CONFIG_FILE_NAME);
    default.exists().then_some(default)
}
