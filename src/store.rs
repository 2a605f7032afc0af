//! Key-value store adapter.
//!
//! Notes and the theme choice are persisted as whole string values under two
//! fixed keys. The [`KeyValueStore`] trait is the only contract the rest of
//! the crate relies on; [`MemoryStore`] and [`FileStore`] implement it.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    rc::Rc,
};

use log::{debug, error, trace};
use tempfile::NamedTempFile;

use crate::{NoteboxError, Result};

/// Key holding the JSON array of notes.
pub const NOTES_KEY: &str = "notes";

/// Key holding the active theme name.
pub const THEME_KEY: &str = "theme";

/// Synchronous string key-value storage.
///
/// Methods take `&self` so one store can back both the note repository and
/// the theme state, the way a single local storage area does.
pub trait KeyValueStore {
    /// Returns the raw value for `key`, or `None` if it was never set.
    ///
    /// A missing key is not an error. `StorageUnavailable` is returned only
    /// when the store itself cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Durably stores `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Removing a key that does not exist succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory store with an optional byte quota.
///
/// The quota counts key and value bytes across all entries. A store can also
/// be switched off entirely, after which every call fails like storage that
/// has been disabled by the user.
#[derive(Debug)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    quota: Option<usize>,
    available: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            quota: None,
            available: Cell::new(true),
        }
    }

    /// Creates a store that rejects writes once `bytes` would be exceeded.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::new()
        }
    }

    /// Creates a store on which every operation fails.
    pub fn disabled() -> Self {
        let store = Self::new();
        store.available.set(false);
        store
    }

    /// Turns the store on or off mid-session.
    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    /// Total bytes (keys plus values) currently held.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    fn check_available(&self, key: &str) -> Result<()> {
        if self.available.get() {
            Ok(())
        } else {
            Err(NoteboxError::storage(key, "storage is disabled"))
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        self.check_available(key)?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.check_available(key)?;

        if let Some(quota) = self.quota {
            let entries = self.entries.borrow();
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                debug!("Rejecting write of {} bytes to '{}': quota {}", needed, key, quota);
                return Err(NoteboxError::storage(
                    key,
                    format!("quota of {} bytes exceeded", quota),
                ));
            }
        }

        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_available(key)?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Directory-backed store keeping one `<key>.json` file per key.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a failed write leaves the previous value in place.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Helper method to get the file path for a key
    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(NoteboxError::InvalidInput {
                message: format!("'{}' is not a valid storage key", key),
            });
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        trace!("Reading key '{}' from {}", key, path.display());

        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                Err(NoteboxError::storage(key, e.to_string()))
            }
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        debug!("Saving key '{}' to {}", key, path.display());

        fs::create_dir_all(&self.dir).map_err(|e| {
            error!("Failed to create directory {}: {}", self.dir.display(), e);
            NoteboxError::storage(key, e.to_string())
        })?;

        let mut temp_file = NamedTempFile::new_in(&self.dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            NoteboxError::storage(key, e.to_string())
        })?;

        temp_file
            .write_all(value.as_bytes())
            .and_then(|_| temp_file.flush())
            .map_err(|e| {
                error!("Failed to write temporary file for '{}': {}", key, e);
                NoteboxError::storage(key, e.to_string())
            })?;

        temp_file.persist(&path).map_err(|e| {
            error!("Failed to persist file {}: {}", path.display(), e.error);
            NoteboxError::storage(key, e.error.to_string())
        })?;

        trace!("Key '{}' saved", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed key '{}'", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!("Failed to remove {}: {}", path.display(), e);
                Err(NoteboxError::storage(key, e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.load(NOTES_KEY).unwrap(), None);
    }

    #[test]
    fn memory_store_save_replace_remove() {
        let store = MemoryStore::new();
        store.save(THEME_KEY, "forest").unwrap();
        store.save(THEME_KEY, "sunset").unwrap();
        assert_eq!(store.load(THEME_KEY).unwrap().as_deref(), Some("sunset"));

        store.remove(THEME_KEY).unwrap();
        store.remove(THEME_KEY).unwrap();
        assert_eq!(store.load(THEME_KEY).unwrap(), None);
    }

    #[test]
    fn memory_store_quota_rejects_and_keeps_previous_value() {
        let store = MemoryStore::with_quota(16);
        store.save("theme", "cosmic").unwrap();

        let err = store.save("theme", "a-much-longer-value").unwrap_err();
        assert!(err.is_storage_failure());
        assert_eq!(store.load("theme").unwrap().as_deref(), Some("cosmic"));

        // Replacing a value only counts the new size
        store.save("theme", "forest1234").unwrap();
        assert_eq!(store.used_bytes(), 15);
    }

    #[test]
    fn disabled_memory_store_fails_every_call() {
        let store = MemoryStore::disabled();
        assert!(store.load(NOTES_KEY).is_err());
        assert!(store.save(NOTES_KEY, "[]").is_err());
        assert!(store.remove(NOTES_KEY).is_err());

        store.set_available(true);
        assert!(store.save(NOTES_KEY, "[]").is_ok());
    }

    #[test]
    fn file_store_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("data"));

        assert_eq!(store.load(NOTES_KEY).unwrap(), None);
        store.save(NOTES_KEY, "[1,2,3]").unwrap();
        assert!(tmp.path().join("data/notes.json").exists());
        assert_eq!(store.load(NOTES_KEY).unwrap().as_deref(), Some("[1,2,3]"));

        // A second handle on the same directory sees the value
        let reopened = FileStore::new(tmp.path().join("data"));
        assert_eq!(reopened.load(NOTES_KEY).unwrap().as_deref(), Some("[1,2,3]"));

        store.remove(NOTES_KEY).unwrap();
        store.remove(NOTES_KEY).unwrap();
        assert_eq!(reopened.load(NOTES_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(matches!(
            store.save("../escape", "x"),
            Err(NoteboxError::InvalidInput { .. })
        ));
    }

    #[test]
    fn shared_store_through_rc() {
        let store = Rc::new(MemoryStore::new());
        let other = Rc::clone(&store);
        store.save(THEME_KEY, "forest").unwrap();
        assert_eq!(other.load(THEME_KEY).unwrap().as_deref(), Some("forest"));
    }
}
