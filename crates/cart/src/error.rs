//! Cart error types.
//!
//! Every store operation returns [`Result<T>`]. None of these errors is fatal:
//! the worst outcome for the host is an empty cart.

use thiserror::Error;

use merchant_cart_core::{MerchantId, ProductId};

use crate::catalog::ProductError;

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// `add_item` was called with a product the cart cannot price.
    ///
    /// The store is left unchanged.
    #[error("Invalid product: {0}")]
    InvalidProduct(#[from] ProductError),

    /// The line does not exist in the merchant's partition.
    ///
    /// Usually means the caller is showing a stale cart and should refresh.
    #[error("Line not found: product {product_id} in cart for merchant {merchant_id}")]
    LineNotFound {
        merchant_id: MerchantId,
        product_id: ProductId,
    },

    /// Checkout was requested for a merchant with nothing in the cart.
    #[error("Cart for merchant {0} is empty")]
    EmptyCart(MerchantId),

    /// The persisted blob could not be written.
    ///
    /// The in-memory mutation has already been applied and stays in effect for
    /// this session; the cart may not survive a reload until a later write
    /// succeeds.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl CartError {
    /// Whether the operation's change is live in memory despite the error.
    #[must_use]
    pub const fn mutation_retained(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

/// Errors from reading or writing the persisted blob.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem operation failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The cart could not be serialized.
    #[error("failed to encode cart: {0}")]
    Encode(#[source] serde_json::Error),

    /// The stored blob is not a valid cart.
    #[error("stored cart is corrupted: {0}")]
    Corrupted(#[source] serde_json::Error),

    /// Writing the blob would exceed the storage quota.
    #[error("cart needs {size} bytes but the storage quota is {quota} bytes")]
    QuotaExceeded { size: usize, quota: usize },

    /// Storage is disabled or otherwise not reachable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
