//! Session-wide handle to the one cart store.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::storage::CartStorage;
use crate::store::CartStore;

/// The single owning instance of the cart, shared by every consumer.
///
/// This struct is cheaply cloneable via `Arc`. Components that need the cart
/// receive a clone of this handle instead of loading their own copy from
/// storage.
#[derive(Debug)]
pub struct SharedCart<S> {
    inner: Arc<Mutex<CartStore<S>>>,
}

impl<S> Clone for SharedCart<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: CartStorage> SharedCart<S> {
    /// Load the store from `storage` and wrap it.
    #[must_use]
    pub fn open(storage: S) -> Self {
        Self::from_store(CartStore::load(storage))
    }

    /// Wrap an already loaded store.
    #[must_use]
    pub fn from_store(store: CartStore<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Lock the store for a sequence of operations.
    ///
    /// Operations never panic while holding the lock, but a poisoned lock is
    /// recovered rather than propagated.
    pub fn lock(&self) -> MutexGuard<'_, CartStore<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the store.
    pub fn with<R>(&self, f: impl FnOnce(&mut CartStore<S>) -> R) -> R {
        f(&mut *self.lock())
    }

    /// Whether `other` is a handle to the same store.
    #[must_use]
    pub fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
