use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{fs, io};

use bucketfs_object_store::StoreConfig;
use common::prelude::{HandleConfig, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "bucketfs";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Object store backend
    #[serde(default)]
    pub store: StoreConfig,
    /// Entries requested per listing page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Default log level, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for daily log files (stdout only if not set)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            page_size: default_page_size(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    pub fn log_level(&self) -> Result<tracing::Level, StateError> {
        tracing::Level::from_str(&self.log_level)
            .map_err(|_| StateError::InvalidLogLevel(self.log_level.clone()))
    }

    pub fn handle_config(&self) -> HandleConfig {
        HandleConfig {
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Where the config was (or would have been) read from
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// The config file path (custom or default ~/.bucketfs/config.toml)
    pub fn config_path(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }
        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)).join(CONFIG_FILE_NAME))
    }

    /// Load the config file, falling back to defaults when it does not exist.
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let config_path = Self::config_path(custom_path)?;
        let config = match fs::read_to_string(&config_path) {
            Ok(text) => toml::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => AppConfig::default(),
            Err(e) => return Err(e.into()),
        };
        validate(&config, &config_path)?;
        Ok(Self {
            config_path,
            config,
        })
    }
}

fn validate(config: &AppConfig, path: &Path) -> Result<(), StateError> {
    if config.page_size == 0 {
        return Err(StateError::InvalidPageSize(path.to_path_buf()));
    }
    config.log_level()?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Could not determine home directory")]
    NoHomeDirectory,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
    #[error("page_size must be at least 1 in {0:?}")]
    InvalidPageSize(PathBuf),
}
