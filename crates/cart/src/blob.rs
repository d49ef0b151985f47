//! Persisted blob codec.
//!
//! The whole store is one JSON object keyed by merchant id:
//!
//! ```json
//! {
//!   "m1": {
//!     "items": {
//!       "1": { "id": "1", "name": "Burger", "price": 10.0, "final_price": 8.0,
//!              "image_url": null, "quantity": 2, "active_promotions": [] }
//!     },
//!     "company": { "id": "m1", "name": "Joe's" }
//!   }
//! }
//! ```
//!
//! Blobs written by older clients may lack `final_price` or contain lines that
//! no longer satisfy the cart's invariants; [`decode`] repairs or drops those.
//! Damage is contained to the record it appears in: an unreadable line drops
//! that line, an unreadable partition drops that partition.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

use merchant_cart_core::{
    MerchantId, ProductId, PromotionRef, authoritative_promotion, effective_price,
};

use crate::catalog::MAX_UNIT_PRICE;
use crate::error::PersistenceError;
use crate::model::{LineItem, MerchantCart, MerchantRef};

type Partitions = BTreeMap<MerchantId, MerchantCart>;

#[derive(Debug, Serialize)]
struct StoredPartition {
    items: BTreeMap<String, StoredLine>,
    company: Option<MerchantRef>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredLine {
    #[serde(default)]
    id: Option<ProductId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, serialize_with = "serialize_opt_float")]
    price: Option<Decimal>,
    #[serde(
        default,
        serialize_with = "serialize_opt_float",
        skip_serializing_if = "Option::is_none"
    )]
    final_price: Option<Decimal>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    quantity: i64,
    #[serde(default)]
    active_promotions: Option<Vec<PromotionRef>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn serialize_opt_float<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(amount) => rust_decimal::serde::float::serialize(amount, serializer),
        None => serializer.serialize_none(),
    }
}

/// Serialize the store into the persisted blob.
pub fn encode(partitions: &Partitions) -> Result<String, PersistenceError> {
    let stored: BTreeMap<&str, StoredPartition> = partitions
        .iter()
        .filter(|(_, cart)| !cart.is_empty())
        .map(|(merchant_id, cart)| (merchant_id.as_str(), to_stored(cart)))
        .collect();

    serde_json::to_string(&stored).map_err(PersistenceError::Encode)
}

/// Parse a persisted blob, restoring the cart invariants.
///
/// Only a blob that is not a JSON object at all is an error. Within it, lines
/// that cannot be read, lack a usable price or have a quantity below 1 are
/// dropped, a missing or out-of-range `final_price` is recomputed, and
/// partitions left without lines are dropped.
pub fn decode(blob: &str) -> Result<Partitions, PersistenceError> {
    let stored: Map<String, Value> =
        serde_json::from_str(blob).map_err(PersistenceError::Corrupted)?;

    let mut partitions = Partitions::new();
    for (key, value) in stored {
        let merchant_id = MerchantId::from(key);
        let Value::Object(fields) = value else {
            warn!(%merchant_id, "Dropping stored partition that is not an object");
            continue;
        };
        let cart = from_stored(&merchant_id, fields);
        if cart.is_empty() {
            continue;
        }
        partitions.insert(merchant_id, cart);
    }

    Ok(partitions)
}

fn to_stored(cart: &MerchantCart) -> StoredPartition {
    let items = cart
        .lines
        .iter()
        .map(|(product_id, line)| {
            let stored = StoredLine {
                id: Some(product_id.clone()),
                name: Some(line.name.clone()),
                price: Some(line.unit_price),
                final_price: Some(line.effective_unit_price),
                image_url: line.image_ref.clone(),
                quantity: i64::from(line.quantity),
                active_promotions: Some(line.applied_promotions.clone()),
                extra: line.extra.clone(),
            };
            (product_id.as_str().to_owned(), stored)
        })
        .collect();

    StoredPartition {
        items,
        company: cart.merchant.clone(),
        extra: cart.extra.clone(),
    }
}

/// Rebuild a partition from its stored fields. Fields other than `items` and
/// `company` are kept as the partition's extras.
fn from_stored(merchant_id: &MerchantId, mut fields: Map<String, Value>) -> MerchantCart {
    let items = match fields.remove("items") {
        Some(Value::Object(items)) => items,
        Some(Value::Null) | None => Map::new(),
        Some(_) => {
            warn!(%merchant_id, "Stored items are not an object, dropping them");
            Map::new()
        }
    };

    let mut lines = BTreeMap::new();
    for (key, value) in items {
        let product_id = ProductId::from(key);
        let stored = match serde_json::from_value::<StoredLine>(value) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(%merchant_id, %product_id, error = %e, "Dropping unreadable stored line");
                continue;
            }
        };
        if let Some(line) = line_from_stored(merchant_id, &product_id, stored) {
            lines.insert(product_id, line);
        }
    }

    if lines.is_empty() {
        return MerchantCart::default();
    }

    let merchant = fields
        .remove("company")
        .and_then(|value| merchant_from_stored(merchant_id, value))
        .unwrap_or_else(|| MerchantRef::new(merchant_id.clone(), ""));

    MerchantCart {
        merchant: Some(merchant),
        lines,
        extra: fields,
    }
}

fn merchant_from_stored(merchant_id: &MerchantId, value: Value) -> Option<MerchantRef> {
    if value.is_null() {
        return None;
    }
    serde_json::from_value(value)
        .inspect_err(|e| warn!(%merchant_id, error = %e, "Unreadable stored company, using id only"))
        .ok()
}

fn line_from_stored(
    merchant_id: &MerchantId,
    product_id: &ProductId,
    stored: StoredLine,
) -> Option<LineItem> {
    if let Some(id) = stored.id.as_ref().filter(|id| *id != product_id) {
        warn!(%merchant_id, %product_id, stored_id = %id, "Stored line id differs from its key, using key");
    }

    let Some(unit_price) = stored
        .price
        .filter(|price| *price >= Decimal::ZERO && *price <= MAX_UNIT_PRICE)
    else {
        warn!(%merchant_id, %product_id, "Dropping stored line without a valid price");
        return None;
    };

    let Ok(quantity) = u32::try_from(stored.quantity.min(i64::from(u32::MAX))) else {
        warn!(%merchant_id, %product_id, quantity = stored.quantity, "Dropping stored line with negative quantity");
        return None;
    };
    if quantity == 0 {
        warn!(%merchant_id, %product_id, "Dropping stored line with zero quantity");
        return None;
    }

    let promotions = stored.active_promotions.unwrap_or_default();
    let computed = effective_price(unit_price, authoritative_promotion(&promotions));
    let effective_unit_price = match stored.final_price {
        Some(price) if price >= Decimal::ZERO && price <= unit_price => price,
        Some(price) => {
            warn!(%merchant_id, %product_id, %price, %unit_price, "Stored final price out of range, recomputing");
            computed
        }
        None => computed,
    };

    Some(LineItem {
        product_id: product_id.clone(),
        name: stored.name.unwrap_or_default(),
        unit_price,
        effective_unit_price,
        image_ref: stored.image_url,
        quantity,
        applied_promotions: promotions,
        extra: stored.extra,
    })
}
