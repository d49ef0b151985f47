//! Whole-cart commands.
//!
//! # Usage
//!
//! ```bash
//! cart-cli show 4
//! cart-cli show 4 --json
//! cart-cli total 4
//! cart-cli merchants
//! cart-cli checkout 4
//! cart-cli clear 4
//! cart-cli clear-all
//! ```

use merchant_cart::{CartConfig, CartStorage, CartView, Price, SharedCart};
use tracing::info;

use super::report;
use crate::input::emit;

/// Print a merchant's cart.
pub fn show<S: CartStorage>(
    cart: &SharedCart<S>,
    merchant: &str,
    json: bool,
    config: &CartConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let view = cart.lock().view(merchant, config.currency);

    if json {
        emit(serde_json::to_string_pretty(&view)?)?;
        return Ok(());
    }

    for line in render(&view) {
        emit(line)?;
    }
    Ok(())
}

/// Print a merchant's cart total.
pub fn total<S: CartStorage>(
    cart: &SharedCart<S>,
    merchant: &str,
    config: &CartConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let total = cart.lock().get_total(merchant);
    emit(Price::new(total, config.currency))?;
    Ok(())
}

/// Print every merchant with a cart.
pub fn merchants<S: CartStorage>(cart: &SharedCart<S>) -> Result<(), Box<dyn std::error::Error>> {
    let store = cart.lock();
    for merchant_id in store.merchants() {
        let cart = store.get_partition(merchant_id);
        let name = cart.merchant.map(|m| m.name).unwrap_or_default();
        emit(format_args!("{merchant_id}\t{name}\t{} items", cart.lines.len()))?;
    }
    Ok(())
}

/// Print the order request body for a merchant's cart.
pub fn checkout<S: CartStorage>(
    cart: &SharedCart<S>,
    merchant: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let draft = cart.lock().checkout_draft(merchant)?;
    emit(serde_json::to_string_pretty(&draft)?)?;
    Ok(())
}

/// Drop a merchant's cart.
pub fn clear<S: CartStorage>(
    cart: &SharedCart<S>,
    merchant: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    cart.lock().clear_merchant(merchant).map_err(report)?;
    info!(merchant, "Cart cleared");
    Ok(())
}

/// Drop every cart.
pub fn clear_all<S: CartStorage>(cart: &SharedCart<S>) -> Result<(), Box<dyn std::error::Error>> {
    cart.lock().clear_all().map_err(report)?;
    info!("All carts cleared");
    Ok(())
}

/// Plain-text rendering of a cart view.
fn render(view: &CartView) -> Vec<String> {
    if view.items.is_empty() {
        return vec!["Cart is empty".to_string()];
    }

    let mut lines = Vec::with_capacity(view.items.len() + 3);
    if let Some(name) = &view.merchant_name {
        lines.push(name.clone());
    }
    for item in &view.items {
        let was = item
            .compare_at_price
            .as_ref()
            .map(|price| format!(" (was {price})"))
            .unwrap_or_default();
        lines.push(format!(
            "{:>3} x {} @ {}{was} = {}",
            item.quantity, item.title, item.price, item.line_price
        ));
    }
    if let Some(savings) = &view.savings {
        lines.push(format!("You save {savings}"));
    }
    lines.push(format!("Subtotal ({} items): {}", view.item_count, view.subtotal));
    lines
}
