use std::env;
use std::path::PathBuf;

use crate::storage::{default_data_dir, JsonFileStore, StorageError};

pub const DATA_DIR_ENV: &str = "CYCLECAST_DATA_DIR";
pub const LOG_ENV: &str = "CYCLECAST_LOG";
pub const DEFAULT_LOG_DIRECTIVE: &str = "cyclecast=info";

/// Process-level configuration, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_filter: DEFAULT_LOG_DIRECTIVE.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            data_dir: lookup(DATA_DIR_ENV)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            log_filter: lookup(LOG_ENV)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_filter),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf, StorageError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    pub fn open_store(&self) -> Result<JsonFileStore, StorageError> {
        JsonFileStore::in_dir(&self.data_dir()?)
    }
}
