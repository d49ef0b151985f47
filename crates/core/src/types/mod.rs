//! Core types for the merchant cart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod promotion;

pub use id::*;
pub use price::{CurrencyCode, Price, PriceError, round2};
pub use promotion::{DiscountType, PromotionRef, authoritative_promotion, effective_price};
