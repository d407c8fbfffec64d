//! Key/value store persisted as a single JSON object file.
//!
//! Plays the role browser local storage plays for the web build: every key
//! the app writes ends up as a string property of one JSON object.
//!
//! Writes are:
//! - **Atomic**: temp file + fsync + rename, so readers see either the old or
//!   the new object
//! - **Isolated**: an exclusive `fs2` lock on a sibling `.lock` file guards
//!   the read-modify-write cycle

use healthapp_core::error::{HealthAppError, Result};
use healthapp_core::storage::KeyValueStore;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use tracing::debug;

type Entries = BTreeMap<String, String>;

pub struct JsonFileKeyValueStore {
    path: PathBuf,
}

impl JsonFileKeyValueStore {
    /// Creates a store backed by `path`. The file is created on first write.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all entries. A missing or blank file is an empty store.
    fn load(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            HealthAppError::corrupted(self.path.display().to_string(), e.to_string())
        })
    }

    /// Writes all entries atomically.
    fn save(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(entries)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = create_private(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Read-modify-write under the exclusive lock.
    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Entries) -> bool,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut entries = self.load()?;
        if f(&mut entries) {
            self.save(&entries)?;
        }
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| HealthAppError::io("Storage path has no file name"))?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(self.path.with_file_name(tmp_name))
    }
}

impl KeyValueStore for JsonFileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.load()?;
        debug!("Read '{}' from {}", key, self.path.display());
        Ok(entries.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| entries.remove(key).is_some())
    }
}

/// Creates (truncating) a file readable only by the owner on Unix.
fn create_private(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    Ok(options.open(path)?)
}

/// A file lock guard that releases the lock when dropped.
///
/// The lock file itself is never removed, so every writer locks the same inode.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        fs2::FileExt::lock_exclusive(&file)
            .map_err(|e| HealthAppError::storage(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileKeyValueStore::new(temp_dir.path().join("storage.json"));

        assert_eq!(store.get("healthapp_users").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("storage.json");

        let store = JsonFileKeyValueStore::new(path.clone());
        store.set("healthapp_token", "fake-jwt-token").unwrap();
        store.set("healthapp_users", "[]").unwrap();

        let reopened = JsonFileKeyValueStore::new(path);
        assert_eq!(
            reopened.get("healthapp_token").unwrap().as_deref(),
            Some("fake-jwt-token")
        );
        assert_eq!(reopened.get("healthapp_users").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_is_a_json_object_of_strings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        let store = JsonFileKeyValueStore::new(path.clone());

        store.set("healthapp_user", r#"{"id":"1"}"#).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["healthapp_user"], r#"{"id":"1"}"#);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileKeyValueStore::new(temp_dir.path().join("storage.json"));

        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_no_temp_file_left_and_lock_file_kept() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        let store = JsonFileKeyValueStore::new(path.clone());

        store.set("k", "v").unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join(".storage.json.tmp").exists());
        assert!(temp_dir.path().join("storage.lock").exists());

        // The kept lock file is reused by the next write
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn test_corrupted_file_is_reported_and_kept() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        fs::write(&path, "[1, 2").unwrap();
        let store = JsonFileKeyValueStore::new(path.clone());

        assert!(store.get("k").unwrap_err().is_corrupted());
        assert!(store.set("k", "v").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[1, 2");
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        JsonFileKeyValueStore::new(path.clone())
            .set("healthapp_users", "[]")
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
