//! Integration tests for the merchant cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p merchant-cart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - End-to-end shopper flows against the store
//! - `cart_properties` - Invariants checked over generated operation sequences (proptest)
//! - `persistence` - File-backed storage, reloads, and damaged blobs
//!
//! This crate only provides fixtures shared by the tests.

use std::str::FromStr;

use merchant_cart::{CartStore, FileStorage, MemoryStorage, MerchantRef, Product, PromotionRef};
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Parse a decimal literal.
///
/// # Panics
///
/// Panics if `s` is not a valid decimal; fixtures only pass literals.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// A product with no promotions.
#[must_use]
pub fn product(id: u64, name: &str, price: &str) -> Product {
    Product::new(id, name, dec(price))
}

/// A product priced by a percentage-off promotion.
#[must_use]
pub fn product_with_percentage(id: u64, name: &str, price: &str, percent: &str) -> Product {
    product(id, name, price).with_promotion(PromotionRef::percentage(
        format!("pct-{id}"),
        dec(percent),
        format!("{percent}% off"),
    ))
}

/// A merchant reference.
#[must_use]
pub fn merchant(id: &str, name: &str) -> MerchantRef {
    MerchantRef::new(id, name)
}

/// A store over fresh in-memory storage, plus a handle to that storage.
#[must_use]
pub fn memory_store() -> (CartStore<MemoryStorage>, MemoryStorage) {
    let storage = MemoryStorage::new("cart");
    (CartStore::load(storage.clone()), storage)
}

/// A temporary directory with file-backed storage inside it.
///
/// Keep the returned `TempDir` alive for as long as the storage is used.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn file_storage() -> (TempDir, FileStorage) {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path(), "cart");
    (dir, storage)
}
