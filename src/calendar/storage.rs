//! Backing media for the event collection.
//!
//! The whole collection lives under a single key: one JSON document,
//! replaced wholesale on every write, mirroring the browser-storage layout
//! it stays field-compatible with. Backends move the raw payload only;
//! (de)serialization belongs to the store.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use super::error::StoreResult;

/// Environment override for the events file location.
pub const EVENTS_FILE_ENV: &str = "CALENDRIFY_EVENTS_FILE";

/// A place the serialized event collection can live.
///
/// `load` returns `None` when nothing has ever been stored. `save`
/// replaces the whole payload; concurrent writers are uncoordinated and
/// the last one wins.
pub trait StorageBackend {
    fn load(&self) -> StoreResult<Option<String>>;
    fn save(&self, payload: &str) -> StoreResult<()>;
}

/// One JSON file on disk.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default events file: `$CALENDRIFY_EVENTS_FILE` if set, otherwise
    /// `<data dir>/calendrify/events.json`.
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(EVENTS_FILE_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::data_dir().map(|d| d.join("calendrify").join("events.json"))
    }
}

impl StorageBackend for FileBackend {
    fn load(&self) -> StoreResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, payload: &str) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, payload)?;
        Ok(())
    }
}

/// In-memory backend: the substitutable fake for tests and dry runs.
#[derive(Default)]
pub struct MemoryBackend {
    payload: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend with a raw payload, bypassing the store.
    #[allow(dead_code)]
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Mutex::new(Some(payload.into())),
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self) -> StoreResult<Option<String>> {
        Ok(self.payload.lock().expect("storage lock poisoned").clone())
    }

    fn save(&self, payload: &str) -> StoreResult<()> {
        *self.payload.lock().expect("storage lock poisoned") = Some(payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_backend_absent_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("events.json"));
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn test_file_backend_creates_parent_dirs_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested").join("events.json"));
        backend.save("[]").unwrap();
        assert_eq!(backend.load().unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_backend_save_replaces_whole_payload() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("events.json"));
        backend.save("[1,2,3]").unwrap();
        backend.save("[]").unwrap();
        assert_eq!(backend.load().unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_backend_round_trips() {
        let backend = MemoryBackend::new();
        assert!(backend.load().unwrap().is_none());
        backend.save("[]").unwrap();
        assert_eq!(backend.load().unwrap().as_deref(), Some("[]"));
    }
}
