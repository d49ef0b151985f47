//! Merchant-partitioned shopping cart.
//!
//! A shopper may hold carts for several merchants at once; each merchant's
//! lines live in their own partition and every operation acts on exactly one
//! partition. The whole store is mirrored into a single persisted blob after
//! each mutation.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the in-memory partitions and the storage backend
//! - [`SharedCart`] is the one handle every consumer clones; nobody keeps a
//!   private copy of the cart
//! - [`CartStorage`] abstracts the key-value entry the blob lives in
//!   ([`FileStorage`], [`MemoryStorage`])
//!
//! # Example
//!
//! ```rust
//! use merchant_cart::{CartStore, MemoryStorage, MerchantRef, Product};
//! use rust_decimal::Decimal;
//!
//! let mut store = CartStore::load(MemoryStorage::new("cart"));
//! let burger = Product::new(1_u64, "Burger", Decimal::new(1000, 2));
//! let joes = MerchantRef::new("m1", "Joe's");
//!
//! store.add_item("m1", &burger, Some(&joes))?;
//! store.add_item("m1", &burger, None)?;
//!
//! assert_eq!(store.get_total("m1"), Decimal::new(2000, 2));
//! # Ok::<(), merchant_cart::CartError>(())
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod blob;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod model;
mod shared;
pub mod storage;
mod store;
pub mod view;

pub use catalog::{CompanyField, MAX_UNIT_PRICE, Product, ProductError};
pub use checkout::{OrderDraft, OrderLine};
pub use config::{CartConfig, ConfigError};
pub use error::{CartError, PersistenceError, Result};
pub use model::{LineItem, MerchantCart, MerchantRef};
pub use shared::SharedCart;
pub use storage::{CartStorage, FileStorage, MemoryStorage};
pub use store::CartStore;
pub use view::{CartItemView, CartView};

pub use merchant_cart_core::{
    CurrencyCode, DiscountType, MerchantId, Price, ProductId, PromotionId, PromotionRef,
    effective_price, round2,
};
