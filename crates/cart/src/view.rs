//! Display projections of a merchant's cart.
//!
//! Prices are pre-formatted so presentation code never does money arithmetic.

use serde::Serialize;

use merchant_cart_core::{CurrencyCode, Price};

use crate::model::{LineItem, MerchantCart};

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub product_id: String,
    pub title: String,
    pub quantity: u32,
    /// Effective unit price.
    pub price: String,
    /// Catalog unit price, only when a promotion lowers it.
    pub compare_at_price: Option<String>,
    pub line_price: String,
    pub promotion: Option<String>,
    pub image: Option<String>,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub merchant_name: Option<String>,
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    /// Total promotion savings, only when there are any.
    pub savings: Option<String>,
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty(currency: CurrencyCode) -> Self {
        Self {
            merchant_name: None,
            items: Vec::new(),
            subtotal: Price::new(rust_decimal::Decimal::ZERO, currency).display(),
            savings: None,
            item_count: 0,
        }
    }

    /// Project a partition for display.
    #[must_use]
    pub fn from_partition(cart: &MerchantCart, currency: CurrencyCode) -> Self {
        let savings = cart.savings();
        Self {
            merchant_name: cart
                .merchant
                .as_ref()
                .map(|m| m.name.clone())
                .filter(|name| !name.is_empty()),
            items: cart
                .lines
                .values()
                .map(|line| CartItemView::from_line(line, currency))
                .collect(),
            subtotal: Price::new(cart.total(), currency).display(),
            savings: (!savings.is_zero()).then(|| Price::new(savings, currency).display()),
            item_count: cart.item_count(),
        }
    }
}

impl CartItemView {
    /// Project a single line for display.
    #[must_use]
    pub fn from_line(line: &LineItem, currency: CurrencyCode) -> Self {
        let discounted = line.effective_unit_price < line.unit_price;
        Self {
            product_id: line.product_id.to_string(),
            title: line.name.clone(),
            quantity: line.quantity,
            price: Price::new(line.effective_unit_price, currency).display(),
            compare_at_price: discounted
                .then(|| Price::new(line.unit_price, currency).display()),
            line_price: Price::new(line.line_total(), currency).display(),
            promotion: line.promotion().map(|p| p.title.clone()),
            image: line.image_ref.clone(),
        }
    }
}
