//! Session storage in a single JSON document on disk.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, instrument};

use marquee_core::error::StorageError;
use marquee_core::{Result, SessionStorage};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Name of the session document inside the storage directory.
pub const SESSION_FILE: &str = "session.json";

const LOCK_FILE: &str = "session.lock";

type Entries = BTreeMap<String, String>;

/// A [`SessionStorage`] that keeps every key in one JSON object on disk.
///
/// Each operation takes an exclusive advisory lock, so several processes
/// sharing a data directory see whole documents. Writes go to a temporary
/// file that is renamed over the document. On Unix the document is only
/// readable by its owner.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `root`. The directory is created on first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the session document.
    pub fn path(&self) -> PathBuf {
        self.root.join(SESSION_FILE)
    }

    fn lock(&self) -> Result<File> {
        fs::create_dir_all(&self.root).map_err(StorageError::Io)?;
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.root.join(LOCK_FILE))
            .map_err(StorageError::Io)?;
        lock_file.lock_exclusive().map_err(StorageError::Io)?;
        Ok(lock_file)
    }

    fn read(&self) -> Result<Entries> {
        match fs::read_to_string(self.path()) {
            Ok(content) if content.trim().is_empty() => Ok(Entries::new()),
            Ok(content) => Ok(serde_json::from_str(&content).map_err(StorageError::Corrupt)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(StorageError::Io(e).into()),
        }
    }

    fn write(&self, entries: &Entries) -> Result<()> {
        let path = self.path();
        if entries.is_empty() {
            return match fs::remove_file(&path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(StorageError::Io(e).into()),
                _ => Ok(()),
            };
        }

        let content = serde_json::to_string_pretty(entries).map_err(StorageError::Corrupt)?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(StorageError::Io)?;

        #[cfg(unix)]
        fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))
            .map_err(StorageError::Io)?;

        fs::rename(&temp_path, &path).map_err(StorageError::Io)?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Entries)) -> Result<()> {
        let lock_file = self.lock()?;
        let mut entries = self.read()?;
        apply(&mut entries);
        let written = self.write(&entries);
        lock_file.unlock().map_err(StorageError::Io)?;
        written
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if !self.path().exists() {
            return Ok(None);
        }
        let lock_file = self.lock()?;
        let value = self.read().map(|mut entries| entries.remove(key));
        lock_file.unlock().map_err(StorageError::Io)?;
        value
    }

    #[instrument(skip(self, value), fields(root = %self.root.display()))]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!("Persisting session key");
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn remove(&self, key: &str) -> Result<()> {
        if !self.path().exists() {
            return Ok(());
        }
        debug!("Removing session key");
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::Error;
    use tempfile::TempDir;

    #[test]
    fn missing_document_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get("accessToken").unwrap(), None);
        storage.remove("accessToken").unwrap();
        assert!(!storage.root().exists());
    }

    #[test]
    fn set_get_remove() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.set("accessToken", "a1").unwrap();
        storage.set("refreshToken", "r1").unwrap();
        assert_eq!(storage.get("accessToken").unwrap().as_deref(), Some("a1"));

        storage.set("accessToken", "a2").unwrap();
        assert_eq!(storage.get("accessToken").unwrap().as_deref(), Some("a2"));

        storage.remove("accessToken").unwrap();
        assert_eq!(storage.get("accessToken").unwrap(), None);
        assert_eq!(storage.get("refreshToken").unwrap().as_deref(), Some("r1"));
    }

    #[test]
    fn values_survive_a_new_instance() {
        let dir = TempDir::new().unwrap();
        FileStorage::new(dir.path()).set("auth-storage", r#"{"user":null}"#).unwrap();

        let reopened = FileStorage::new(dir.path());
        assert_eq!(
            reopened.get("auth-storage").unwrap().as_deref(),
            Some(r#"{"user":null}"#)
        );
    }

    #[test]
    fn removing_last_key_deletes_document() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.set("accessToken", "a1").unwrap();
        assert!(storage.path().exists());
        storage.remove("accessToken").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn corrupt_document_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        fs::write(storage.path(), "not json").unwrap();

        let err = storage.get("accessToken").unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Corrupt(_))));
    }

    #[cfg(unix)]
    #[test]
    fn document_is_owner_only() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set("accessToken", "a1").unwrap();

        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
