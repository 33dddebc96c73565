//! TOML configuration for the notealarm service.
//!
//! # Invariants
//! - Every key is optional; an empty file equals `Config::default()`.
//! - `load` only returns configs that passed `validate`.

use crate::alert::scheduler::{DEFAULT_DISPATCH_TIMEOUT, DEFAULT_TICK_INTERVAL};
use crate::logging::{default_log_level, normalize_level};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_DB_FILE_NAME: &str = "notealarm.sqlite3";
const DEFAULT_APP_NAME: &str = "notealarm";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub storage: StorageConfig,
    pub alerts: AlertsConfig,
    pub notifier: NotifierConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertsConfig {
    /// Seconds between snapshot polls.
    pub tick_interval_secs: u64,
    /// Upper bound on one tick's evaluation batch.
    pub dispatch_timeout_secs: u64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: DEFAULT_TICK_INTERVAL.as_secs(),
            dispatch_timeout_secs: DEFAULT_DISPATCH_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifierKind {
    #[default]
    Desktop,
    Log,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifierConfig {
    pub kind: NotifierKind,
    pub app_name: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            kind: NotifierKind::default(),
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files. Logs go to stderr when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

/// Reads, parses and validates a config file.
pub fn load(path: &Path) -> ConfigResult<Config> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> ConfigResult<()> {
    if config.storage.db_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "storage.db_path must be non-empty".to_string(),
        ));
    }
    if config.alerts.tick_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "alerts.tick_interval_secs must be greater than zero".to_string(),
        ));
    }
    if config.alerts.dispatch_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "alerts.dispatch_timeout_secs must be greater than zero".to_string(),
        ));
    }
    if config.notifier.app_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "notifier.app_name must be non-empty".to_string(),
        ));
    }
    normalize_level(&config.logging.level)
        .map_err(|err| ConfigError::Validation(format!("logging.level: {err}")))?;
    if let Some(dir) = config.logging.dir.as_ref() {
        if !dir.is_absolute() {
            return Err(ConfigError::Validation(format!(
                "logging.dir must be an absolute path, got `{}`",
                dir.display()
            )));
        }
    }
    Ok(())
}
