//! In-process key-value storage.
//!
//! Behaves like browser local storage: one map shared by every clone, a byte
//! quota over all entries, and a switch to make it unavailable.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{CartStorage, DEFAULT_QUOTA_BYTES, check_quota};
use crate::error::PersistenceError;

#[derive(Debug)]
struct Inner {
    entries: HashMap<String, String>,
    quota: usize,
    available: bool,
}

/// Shared in-memory storage; clones see the same entries.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    key: String,
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStorage {
    /// Create empty storage whose cart lives under `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                quota: DEFAULT_QUOTA_BYTES,
                available: true,
            })),
        }
    }

    /// Set the byte quota shared by all entries.
    #[must_use]
    pub fn with_quota(self, quota: usize) -> Self {
        self.lock().quota = quota;
        self
    }

    /// Another view of the same entries, reading and writing `key` instead.
    #[must_use]
    pub fn for_key(&self, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            inner: Arc::clone(&self.inner),
        }
    }

    /// The key this view reads and writes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw value of any entry.
    #[must_use]
    pub fn get_item(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    /// Overwrite any entry directly, bypassing the quota.
    pub fn set_item(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().entries.insert(key.into(), value.into());
    }

    /// Enable or disable the storage; while disabled every call fails.
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Inner {
    fn ensure_available(&self) -> Result<(), PersistenceError> {
        if self.available {
            Ok(())
        } else {
            Err(PersistenceError::Unavailable(
                "in-memory storage is disabled".to_string(),
            ))
        }
    }

    /// Bytes used by every entry except `key`.
    fn used_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, PersistenceError> {
        let inner = self.lock();
        inner.ensure_available()?;
        Ok(inner.entries.get(&self.key).cloned())
    }

    fn write(&mut self, blob: &str) -> Result<(), PersistenceError> {
        let mut inner = self.lock();
        inner.ensure_available()?;
        let size = inner.used_excluding(&self.key) + self.key.len() + blob.len();
        check_quota(size, inner.quota)?;
        inner.entries.insert(self.key.clone(), blob.to_owned());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        let mut inner = self.lock();
        inner.ensure_available()?;
        inner.entries.remove(&self.key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_read_empty() {
        let storage = MemoryStorage::new("cart");
        assert_eq!(storage.read().unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let mut storage = MemoryStorage::new("cart");
        storage.write("{}").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("{}"));
        assert_eq!(storage.get_item("cart").as_deref(), Some("{}"));
    }

    #[test]
    fn test_clones_share_entries() {
        let mut storage = MemoryStorage::new("cart");
        let observer = storage.clone();
        storage.write("{\"a\":1}").unwrap();
        assert_eq!(observer.read().unwrap().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_quota_counts_other_entries() {
        let mut storage = MemoryStorage::new("cart").with_quota(20);
        storage.set_item("token", "0123456789");
        // 15 (token) + 4 (key) + 2 (blob) = 21 > 20
        assert!(matches!(
            storage.write("{}"),
            Err(PersistenceError::QuotaExceeded { size: 21, quota: 20 })
        ));
        assert_eq!(storage.get_item("cart"), None);
    }

    #[test]
    fn test_quota_replaces_own_entry() {
        let mut storage = MemoryStorage::new("k").with_quota(10);
        storage.write("12345678").unwrap();
        storage.write("87654321").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("87654321"));
    }

    #[test]
    fn test_unavailable() {
        let mut storage = MemoryStorage::new("cart");
        storage.set_available(false);
        assert!(matches!(storage.read(), Err(PersistenceError::Unavailable(_))));
        assert!(matches!(storage.write("{}"), Err(PersistenceError::Unavailable(_))));
        assert!(matches!(storage.clear(), Err(PersistenceError::Unavailable(_))));
    }

    #[test]
    fn test_clear_removes_only_own_key() {
        let mut storage = MemoryStorage::new("cart");
        storage.set_item("other", "x");
        storage.write("{}").unwrap();
        storage.clear().unwrap();
        assert_eq!(storage.read().unwrap(), None);
        assert_eq!(storage.get_item("other").as_deref(), Some("x"));
    }

    #[test]
    fn test_for_key_shares_map() {
        let storage = MemoryStorage::new("cart");
        let mut guest = storage.for_key("guest_cart");
        guest.write("{}").unwrap();
        assert_eq!(storage.get_item("guest_cart").as_deref(), Some("{}"));
        assert_eq!(guest.key(), "guest_cart");
    }
}
