//! Configuration loading and management
//!
//! Handles parsing of the `config.toml` file. Lookup order is the
//! `--config` flag, `$TODOHUB_CONFIG`, then the platform config dir.

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::notification::DEFAULT_TIMEOUT_MS;

const CONFIG_FILE: &str = "config.toml";
const STORE_FILE: &str = "todo.json";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    /// Where and how tasks are persisted
    #[serde(default)]
    pub store: StoreConfig,

    /// Notification banner settings
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Terminal UI settings
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreConfig {
    /// Store file; defaults to `<data dir>/todo.json`
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// How long a writer waits for the store lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NotificationConfig {
    /// How long a message stays visible
    #[serde(default = "default_notification_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_notification_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_notification_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UiConfig {
    /// Render completed rows dimmed and struck through
    #[serde(default = "default_true")]
    pub dim_completed: bool,
}

fn default_true() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dim_completed: default_true(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "todohub")
}

/// Platform config file, e.g. `~/.config/todohub/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

pub fn default_store_path() -> Result<PathBuf> {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(STORE_FILE))
        .ok_or_else(|| Error::InvalidConfig("could not determine a data directory".to_string()))
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` (or the platform default), or return defaults
    /// when there is no file. A file that exists but is invalid is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// The configured store file, falling back to the data dir.
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store.path {
            Some(path) => Ok(path.clone()),
            None => default_store_path(),
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.store.path {
            if path.as_os_str().is_empty() {
                return Err(Error::InvalidConfig("store.path must not be empty".to_string()));
            }
        }
        if self.store.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "store.lock_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.notifications.timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "notifications.timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
