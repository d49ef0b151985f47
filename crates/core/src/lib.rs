//! Merchant Cart Core - Shared types library.
//!
//! This crate provides the types shared by every cart component:
//! - `merchant-cart` - The partitioned cart store and its persistence
//! - `merchant-cart-cli` - Command-line front end for the store
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, prices, and promotion pricing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
