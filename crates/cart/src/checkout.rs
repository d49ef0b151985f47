//! Order request built from a single merchant's cart.

use rust_decimal::Decimal;
use serde::Serialize;

use merchant_cart_core::{MerchantId, ProductId};

/// One product line of an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product: ProductId,
    pub quantity: u32,
}

/// Body of the backend's create-order request.
///
/// The backend prices the order itself; `total` is what the shopper was
/// shown, sent so the backend can detect a stale cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDraft {
    pub company: MerchantId,
    pub items: Vec<OrderLine>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total: Decimal,
}
