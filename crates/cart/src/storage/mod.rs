//! Durable storage for the persisted cart blob.
//!
//! The cart lives in a single key-value entry, the way a browser client keeps
//! it in local storage. Backends only move strings; encoding and decoding the
//! blob is the store's job.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::PersistenceError;

/// Default maximum blob size, matching typical browser local storage quotas.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// A single key-value entry holding the serialized cart.
pub trait CartStorage {
    /// Read the blob. `Ok(None)` means nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    fn read(&self) -> Result<Option<String>, PersistenceError>;

    /// Replace the blob as a whole.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or would exceed the quota. A failed
    /// write leaves the previous blob in place.
    fn write(&mut self, blob: &str) -> Result<(), PersistenceError>;

    /// Remove the entry entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry exists but cannot be removed.
    fn clear(&mut self) -> Result<(), PersistenceError>;
}

impl<T: CartStorage + ?Sized> CartStorage for Box<T> {
    fn read(&self) -> Result<Option<String>, PersistenceError> {
        (**self).read()
    }

    fn write(&mut self, blob: &str) -> Result<(), PersistenceError> {
        (**self).write(blob)
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        (**self).clear()
    }
}

/// Reject a blob larger than `quota` bytes.
pub(crate) fn check_quota(size: usize, quota: usize) -> Result<(), PersistenceError> {
    if size > quota {
        return Err(PersistenceError::QuotaExceeded { size, quota });
    }
    Ok(())
}
