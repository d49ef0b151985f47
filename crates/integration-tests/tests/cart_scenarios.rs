//! End-to-end shopper flows against the cart store.

#![allow(clippy::unwrap_used)]

use merchant_cart::{CartError, CurrencyCode, MerchantCart, SharedCart};
use merchant_cart_integration_tests::{
    dec, memory_store, merchant, product, product_with_percentage,
};

// =============================================================================
// Adding Items
// =============================================================================

#[test]
fn test_first_add_creates_partition() {
    let (mut store, _) = memory_store();

    store
        .add_item("m1", &product(1, "Burger", "10.00"), Some(&merchant("m1", "Joe's")))
        .unwrap();

    let partition = store.get_partition("m1");
    assert_eq!(partition.lines.len(), 1);
    let line = partition.line("1").unwrap();
    assert_eq!(line.quantity, 1);
    assert_eq!(line.effective_unit_price, dec("10.00"));
    assert_eq!(store.get_total("m1"), dec("10.00"));
    assert_eq!(partition.merchant.unwrap().name, "Joe's");
}

#[test]
fn test_adding_same_product_twice_increments() {
    let (mut store, _) = memory_store();
    let burger = product(1, "Burger", "10.00");
    let joes = merchant("m1", "Joe's");

    store.add_item("m1", &burger, Some(&joes)).unwrap();
    store.add_item("m1", &burger, Some(&joes)).unwrap();

    let partition = store.get_partition("m1");
    assert_eq!(partition.lines.len(), 1);
    assert_eq!(partition.line("1").unwrap().quantity, 2);
    assert_eq!(store.get_total("m1"), dec("20.00"));
}

#[test]
fn test_percentage_promotion_lowers_price() {
    let (mut store, _) = memory_store();

    let line = store
        .add_item("m1", &product_with_percentage(1, "Burger", "10.00", "20"), None)
        .unwrap();

    assert_eq!(line.unit_price, dec("10.00"));
    assert_eq!(line.effective_unit_price, dec("8.00"));
    assert_eq!(store.get_total("m1"), dec("8.00"));
}

// =============================================================================
// Multiple Merchants
// =============================================================================

#[test]
fn test_clearing_one_merchant_leaves_others() {
    let (mut store, _) = memory_store();
    store
        .add_item("m1", &product(1, "Burger", "10.00"), Some(&merchant("m1", "Joe's")))
        .unwrap();
    store
        .add_item("m2", &product(5, "Taco", "3.00"), Some(&merchant("m2", "Taqueria")))
        .unwrap();
    let before = store.get_partition("m2");

    store.clear_merchant("m1").unwrap();

    assert_eq!(store.get_partition("m1"), MerchantCart::default());
    assert_eq!(store.get_partition("m2"), before);
    assert_eq!(store.get_total("m2"), dec("3.00"));
}

#[test]
fn test_same_product_id_is_independent_per_merchant() {
    let (mut store, _) = memory_store();
    store.add_item("m1", &product(1, "Burger", "10.00"), None).unwrap();
    store.add_item("m2", &product(1, "Soup", "4.00"), None).unwrap();

    store.update_quantity("m1", "1", 5).unwrap();

    assert_eq!(store.get_partition("m2").line("1").unwrap().quantity, 1);
    assert_eq!(store.get_total("m1"), dec("50.00"));
    assert_eq!(store.get_total("m2"), dec("4.00"));
}

// =============================================================================
// Quantity Updates
// =============================================================================

#[test]
fn test_zero_quantity_removes_only_line_and_partition() {
    let (mut store, storage) = memory_store();
    store.add_item("m1", &product(1, "Burger", "10.00"), None).unwrap();
    store.update_quantity("m1", "1", 3).unwrap();

    store.update_quantity("m1", "1", 0).unwrap();

    assert!(store.get_partition("m1").line("1").is_none());
    assert!(store.partition("m1").is_none());
    let blob: serde_json::Value = serde_json::from_str(&storage.get_item("cart").unwrap()).unwrap();
    assert!(blob.get("m1").is_none());
}

#[test]
fn test_zero_quantity_keeps_other_lines() {
    let (mut store, _) = memory_store();
    store.add_item("m1", &product(1, "Burger", "10.00"), None).unwrap();
    store.add_item("m1", &product(2, "Fries", "3.00"), None).unwrap();
    store.update_quantity("m1", "1", 3).unwrap();

    store.update_quantity("m1", "1", 0).unwrap();

    let partition = store.get_partition("m1");
    assert!(partition.line("1").is_none());
    assert!(partition.merchant.is_some());
    assert_eq!(store.get_total("m1"), dec("3.00"));
}

#[test]
fn test_updating_missing_line_is_an_error() {
    let (mut store, _) = memory_store();
    store.add_item("m1", &product(1, "Burger", "10.00"), None).unwrap();

    let err = store.update_quantity("m1", "2", 1).unwrap_err();

    assert!(matches!(err, CartError::LineNotFound { .. }));
    assert!(!err.mutation_retained());
    assert_eq!(store.get_total("m1"), dec("10.00"));
}

// =============================================================================
// Shared Handle and Checkout
// =============================================================================

#[test]
fn test_components_share_one_store() {
    let (store, storage) = memory_store();
    let cart = SharedCart::from_store(store);
    let product_page = cart.clone();
    let header_badge = cart.clone();

    product_page
        .with(|store| store.add_item("m1", &product(1, "Burger", "10.00"), None))
        .unwrap();
    product_page
        .with(|store| store.add_item("m1", &product(2, "Fries", "3.00"), None))
        .unwrap();

    assert_eq!(header_badge.lock().item_count("m1"), 2);

    // A reload sees both writes, not just the last component's copy.
    let reloaded = SharedCart::open(storage);
    assert_eq!(reloaded.lock().item_count("m1"), 2);
}

#[test]
fn test_checkout_flow() {
    let (mut store, _) = memory_store();
    let joes = merchant("m1", "Joe's");
    store
        .add_item("m1", &product_with_percentage(1, "Burger", "10.00", "20"), Some(&joes))
        .unwrap();
    store.add_item("m1", &product(2, "Fries", "3.00"), Some(&joes)).unwrap();
    store.add_item("m2", &product(9, "Taco", "2.00"), None).unwrap();

    let view = store.view("m1", CurrencyCode::USD);
    assert_eq!(view.subtotal, "$11.00");
    assert_eq!(view.savings.as_deref(), Some("$2.00"));

    let draft = store.checkout_draft("m1").unwrap();
    assert_eq!(draft.items.len(), 2);
    assert_eq!(draft.total, dec("11.00"));

    // Order placed: the merchant's cart goes away, the other stays.
    store.clear_merchant("m1").unwrap();
    assert!(matches!(
        store.checkout_draft("m1"),
        Err(CartError::EmptyCart(_))
    ));
    assert_eq!(store.item_count("m2"), 1);
}
