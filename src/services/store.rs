//! Durable storage for the timer store
//!
//! The whole store lives under one well-known location and is rewritten
//! wholesale on every save. Reads fail soft: a missing, unreadable or
//! corrupt store reads as empty.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{error::StoreError, state::TimerStore};

/// File name of the store inside the data directory
pub const STORE_FILE_NAME: &str = "timers.json";

/// Load and save the keyed timer store
pub trait PersistenceStore: Send {
    /// Read the store, returning an empty one when nothing usable is stored
    fn load(&self) -> TimerStore;

    /// Replace the stored contents with `store`
    fn save(&self, store: &TimerStore) -> Result<(), StoreError>;
}

/// Default location of the store file, under the user's data directory
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("page-timer"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STORE_FILE_NAME)
}

/// Store persisted as a JSON file, replaced atomically on save
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl PersistenceStore for JsonFileStore {
    fn load(&self) -> TimerStore {
        match fs::read_to_string(&self.path) {
            Ok(content) => TimerStore::decode(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No timer store at {}, starting fresh", self.path.display());
                TimerStore::new()
            }
            Err(e) => {
                warn!(
                    "Failed to read timer store {} ({}), starting fresh",
                    self.path.display(),
                    e
                );
                TimerStore::new()
            }
        }
    }

    fn save(&self, store: &TimerStore) -> Result<(), StoreError> {
        let content = store.encode()?;

        let parent_dir = match self.path.parent() {
            Some(dir) if dir.as_os_str().is_empty() => Path::new("."),
            Some(dir) => dir,
            None => return Err(StoreError::NoParentDir(self.path.clone())),
        };
        fs::create_dir_all(parent_dir).map_err(|e| self.write_err(e))?;

        let mut temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| self.write_err(e))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| self.write_err(e))?;
        temp_file.flush().map_err(|e| self.write_err(e))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| self.write_err(e.error))?;

        debug!("Saved {} timers to {}", store.len(), self.path.display());
        Ok(())
    }
}

/// Store kept in memory as its serialized text.
///
/// Clones share the same contents. Holding the raw text lets tests plant
/// corrupt data exactly as it would sit in a file.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    raw: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    /// Current serialized contents, if anything was ever stored
    pub fn raw(&self) -> Option<String> {
        self.raw
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl PersistenceStore for MemoryStore {
    fn load(&self) -> TimerStore {
        match self.raw() {
            Some(raw) => TimerStore::decode(&raw),
            None => TimerStore::new(),
        }
    }

    fn save(&self, store: &TimerStore) -> Result<(), StoreError> {
        let content = store.encode()?;
        let mut raw = self.raw.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *raw = Some(content);
        Ok(())
    }
}
