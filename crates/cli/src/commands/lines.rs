//! Line editing commands.
//!
//! # Usage
//!
//! ```bash
//! cart-cli add 4 --product @pad-thai.json --merchant-name "Thai Corner"
//! cart-cli set-qty 4 12 3
//! cart-cli reprice 4 12 --promotions '[{"id": 1, "discount_type": "PERCENTAGE", "discount_value": 10, "title": "Happy hour"}]'
//! cart-cli remove 4 12
//! ```

use merchant_cart::{
    CartConfig, CartStorage, MerchantRef, Price, Product, PromotionRef, SharedCart,
};
use tracing::info;

use super::report;
use crate::input::{emit, json_arg};

/// Add one unit of a product.
pub fn add<S: CartStorage>(
    cart: &SharedCart<S>,
    merchant: &str,
    product: &str,
    merchant_name: Option<String>,
    config: &CartConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let product: Product = json_arg(product)?;
    let merchant_ref = merchant_name.map(|name| MerchantRef::new(merchant, name));

    let mut store = cart.lock();
    let line = store
        .add_item(merchant, &product, merchant_ref.as_ref())
        .map_err(report)?;

    info!(merchant, product_id = %line.product_id, quantity = line.quantity, "Added to cart");
    emit(format_args!(
        "{} x{} ({} total for merchant)",
        line.name,
        line.quantity,
        store.view(merchant, config.currency).subtotal
    ))?;
    Ok(())
}

/// Remove a line.
pub fn remove<S: CartStorage>(
    cart: &SharedCart<S>,
    merchant: &str,
    product: &str,
    config: &CartConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = cart.lock();
    store.remove_item(merchant, product).map_err(report)?;
    emit(store.view(merchant, config.currency).subtotal)?;
    Ok(())
}

/// Set a line's exact quantity.
pub fn set_quantity<S: CartStorage>(
    cart: &SharedCart<S>,
    merchant: &str,
    product: &str,
    quantity: i64,
    config: &CartConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = cart.lock();
    store
        .update_quantity(merchant, product, quantity)
        .map_err(report)?;
    emit(store.view(merchant, config.currency).subtotal)?;
    Ok(())
}

/// Replace a line's promotions.
pub fn reprice<S: CartStorage>(
    cart: &SharedCart<S>,
    merchant: &str,
    product: &str,
    promotions: &str,
    config: &CartConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let promotions: Vec<PromotionRef> = json_arg(promotions)?;

    let mut store = cart.lock();
    let line = store
        .reprice_line(merchant, product, &promotions)
        .map_err(report)?;

    let price = Price::new(line.effective_unit_price, config.currency);
    emit(format_args!("{} now {price} each", line.name))?;
    Ok(())
}
