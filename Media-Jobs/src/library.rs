use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::JobConfig;
use crate::error::{JobError, Result};
use crate::types::LibraryItem;

/// Most items the local library keeps. The oldest are evicted first.
pub const MAX_LIBRARY_ITEMS: usize = 100;

/// Storage key the library is written under.
pub const LIBRARY_KEY: &str = "media-library";

/// Raw key/value storage behind the library.
///
/// The library is always read and written as one serialized value, so
/// implementations only need whole-value reads and overwrites.
pub trait LibraryStorage: Send + Sync {
    /// Read the value stored under `key`. `Ok(None)` when nothing is stored.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

impl LibraryStorage for Box<dyn LibraryStorage> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }
}

/// Process-local storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LibraryStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| JobError::Persistence(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| JobError::Persistence(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl LibraryStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(JobError::Persistence(format!(
                "Failed to read {}: {}",
                self.path_for(key).display(),
                e
            ))),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            JobError::Persistence(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        // Write-then-rename so a crash never leaves a half-written file.
        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&staging, value).map_err(|e| {
            JobError::Persistence(format!("Failed to write {}: {}", staging.display(), e))
        })?;
        std::fs::rename(&staging, &target).map_err(|e| {
            JobError::Persistence(format!("Failed to replace {}: {}", target.display(), e))
        })?;
        Ok(())
    }
}

/// Bounded, newest-first history of completed generations.
///
/// Every append reads the whole list, puts the new item at the head, trims
/// to capacity and writes the whole list back. Appends from one process are
/// serialized; two processes sharing the same storage race, and the last
/// writer wins.
///
/// Storage failures never surface: a list that cannot be read loads as
/// empty, and a list that cannot be written is logged and dropped.
pub struct ResultCache<S: LibraryStorage> {
    storage: S,
    key: String,
    capacity: usize,
    write_lock: Mutex<()>,
}

impl<S: LibraryStorage> std::fmt::Debug for ResultCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("key", &self.key)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<S: LibraryStorage> ResultCache<S> {
    /// Wrap `storage` with the default key and capacity.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            key: LIBRARY_KEY.to_string(),
            capacity: MAX_LIBRARY_ITEMS,
            write_lock: Mutex::new(()),
        }
    }

    /// Keep at most `capacity` items.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Store the list under a different key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the stored list, newest first. Missing or corrupt data loads as
    /// an empty list.
    pub fn load(&self) -> Vec<LibraryItem> {
        match self.storage.read(&self.key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<LibraryItem>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(key = %self.key, error = %e, "library data is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "library could not be read, starting empty");
                Vec::new()
            }
        }
    }

    /// Put `item` at the head of the list, evict past capacity, persist.
    /// Returns the list as it now stands.
    pub fn append(&self, item: LibraryItem) -> Vec<LibraryItem> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut items = self.load();
        items.insert(0, item);
        items.truncate(self.capacity);

        if let Err(e) = self.persist(&items) {
            tracing::error!(key = %self.key, error = %e, "failed to persist library");
        }
        items
    }

    /// Drop every stored item.
    pub fn clear(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = self.persist(&[]) {
            tracing::error!(key = %self.key, error = %e, "failed to clear library");
        }
    }

    fn persist(&self, items: &[LibraryItem]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.storage.write(&self.key, &raw)
    }
}

impl ResultCache<Box<dyn LibraryStorage>> {
    /// File-backed when `library_dir` is set, in-memory otherwise.
    pub fn from_config(config: &JobConfig) -> Self {
        let storage: Box<dyn LibraryStorage> = match &config.library_dir {
            Some(dir) => Box::new(FileStorage::new(dir.clone())),
            None => Box::new(MemoryStorage::new()),
        };
        ResultCache::new(storage).with_capacity(config.library_capacity)
    }
}
