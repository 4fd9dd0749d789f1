use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::models::{AppData, AppSettings, CycleParameters, DailyLog};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("data directory not found")]
    NoDataDir,
}

/// Where logs and cycle settings live.
pub trait CycleStore {
    fn load(&self) -> Result<AppData, StorageError>;
    fn save(&mut self, data: &AppData) -> Result<(), StorageError>;
    fn wipe(&mut self) -> Result<(), StorageError>;

    fn load_logs(&self) -> Result<Vec<DailyLog>, StorageError> {
        Ok(self.load()?.logs)
    }

    /// Insert the log, or replace the one already stored for its date.
    /// The stored id is kept on replace.
    fn upsert_log(&mut self, log: DailyLog) -> Result<DailyLog, StorageError> {
        let mut data = self.load()?;
        let stored = match data.logs.iter_mut().find(|l| l.date == log.date) {
            Some(existing) => {
                let id = existing.id;
                *existing = DailyLog { id, ..log };
                existing.clone()
            }
            None => {
                data.logs.push(log.clone());
                log
            }
        };
        self.save(&data)?;
        Ok(stored)
    }

    /// Returns whether a log with that id existed.
    fn delete_log(&mut self, id: Uuid) -> Result<bool, StorageError> {
        let mut data = self.load()?;
        let before = data.logs.len();
        data.logs.retain(|l| l.id != id);
        let removed = data.logs.len() != before;
        if removed {
            self.save(&data)?;
        }
        Ok(removed)
    }

    fn load_parameters(&self) -> Result<CycleParameters, StorageError> {
        Ok(self.load()?.parameters)
    }

    fn save_parameters(&mut self, parameters: CycleParameters) -> Result<(), StorageError> {
        let mut data = self.load()?;
        data.parameters = parameters;
        self.save(&data)
    }

    fn load_settings(&self) -> Result<AppSettings, StorageError> {
        Ok(self.load()?.settings)
    }

    fn save_settings(&mut self, settings: AppSettings) -> Result<(), StorageError> {
        let mut data = self.load()?;
        data.settings = settings;
        self.save(&data)
    }
}

/// Pretty-printed JSON document on local disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub const FILE_NAME: &'static str = "data.json";

    /// Store inside `dir`, creating the directory if needed.
    pub fn in_dir(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(Self::FILE_NAME),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn default_data_dir() -> Result<PathBuf, StorageError> {
    Ok(dirs::data_local_dir()
        .ok_or(StorageError::NoDataDir)?
        .join("cyclecast"))
}

impl CycleStore for JsonFileStore {
    fn load(&self) -> Result<AppData, StorageError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no data file yet, using defaults");
            return Ok(AppData::default());
        }
        let raw = fs::read(&self.path)?;
        let data: AppData = serde_json::from_slice(&raw)?;
        Ok(data)
    }

    fn save(&mut self, data: &AppData) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(data)?;
        // replace atomically via a sibling temp file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), logs = data.logs.len(), "saved data");
        Ok(())
    }

    fn wipe(&mut self) -> Result<(), StorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: AppData,
}

impl CycleStore for MemoryStore {
    fn load(&self) -> Result<AppData, StorageError> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &AppData) -> Result<(), StorageError> {
        self.data = data.clone();
        Ok(())
    }

    fn wipe(&mut self) -> Result<(), StorageError> {
        self.data = AppData::default();
        Ok(())
    }
}
