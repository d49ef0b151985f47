//! File-backed storage: one JSON file per key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{CartStorage, DEFAULT_QUOTA_BYTES, check_quota};
use crate::error::PersistenceError;

/// Stores the blob in `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling file that is then renamed over the target,
/// so readers see either the old blob or the new one, never a partial write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    quota: usize,
}

impl FileStorage {
    /// Storage for `key` inside `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
            quota: DEFAULT_QUOTA_BYTES,
        }
    }

    /// Set the maximum blob size in bytes.
    #[must_use]
    pub const fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    /// Path of the blob file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CartStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, blob: &str) -> Result<(), PersistenceError> {
        check_quota(blob.len(), self.quota)?;

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let temp = self.temp_path();
        fs::write(&temp, blob)?;
        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        debug!(path = %self.path.display(), bytes = blob.len(), "Cart blob written");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path(), "cart");
        assert_eq!(storage.read().unwrap(), None);
    }

    #[test]
    fn test_write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut storage = FileStorage::new(&nested, "cart");

        storage.write("{}").unwrap();

        assert_eq!(storage.path(), nested.join("cart.json"));
        assert_eq!(storage.read().unwrap().as_deref(), Some("{}"));
        assert!(!nested.join("cart.json.tmp").exists());
    }

    #[test]
    fn test_write_replaces_blob() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path(), "cart");
        storage.write("{\"m1\":{}}").unwrap();
        storage.write("{}").unwrap();
        assert_eq!(fs::read_to_string(storage.path()).unwrap(), "{}");
    }

    #[test]
    fn test_quota_exceeded_keeps_previous_blob() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path(), "cart").with_quota(4);
        storage.write("{}").unwrap();

        let result = storage.write("{\"too\":\"big\"}");

        assert!(matches!(
            result,
            Err(PersistenceError::QuotaExceeded { quota: 4, .. })
        ));
        assert_eq!(storage.read().unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path(), "cart");
        storage.clear().unwrap();
        storage.write("{}").unwrap();
        storage.clear().unwrap();
        assert_eq!(storage.read().unwrap(), None);
    }
}
