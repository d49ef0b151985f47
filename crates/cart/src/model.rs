//! In-memory cart model: merchant partitions and their lines.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use merchant_cart_core::{
    MerchantId, ProductId, PromotionRef, authoritative_promotion, effective_price, round2,
};

/// The merchant a partition belongs to.
///
/// Stored as the partition's `company` entry; fields other than `id` and
/// `name` are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantRef {
    pub id: MerchantId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MerchantRef {
    /// Create a merchant reference with no extra fields.
    #[must_use]
    pub fn new(id: impl Into<MerchantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// One product in a merchant's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    /// Catalog price when the line was first added.
    pub unit_price: Decimal,
    /// `unit_price` after the first of `applied_promotions`; never above `unit_price`.
    pub effective_unit_price: Decimal,
    pub image_ref: Option<String>,
    /// Always at least 1; a line that would drop below is removed instead.
    pub quantity: u32,
    pub applied_promotions: Vec<PromotionRef>,
    /// Persisted fields this crate does not interpret.
    pub extra: Map<String, Value>,
}

impl LineItem {
    /// Create a line with quantity 1, priced with the first promotion.
    #[must_use]
    pub fn new(
        product_id: ProductId,
        name: String,
        unit_price: Decimal,
        image_ref: Option<String>,
        promotions: Vec<PromotionRef>,
    ) -> Self {
        let effective_unit_price = effective_price(unit_price, authoritative_promotion(&promotions));
        Self {
            product_id,
            name,
            unit_price,
            effective_unit_price,
            image_ref,
            quantity: 1,
            applied_promotions: promotions,
            extra: Map::new(),
        }
    }

    /// Replace the promotion snapshot and recompute the effective price.
    pub fn apply_promotions(&mut self, promotions: Vec<PromotionRef>) {
        self.effective_unit_price =
            effective_price(self.unit_price, authoritative_promotion(&promotions));
        self.applied_promotions = promotions;
    }

    /// `effective_unit_price * quantity`, rounded to cents.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        round2(self.exact_total())
    }

    /// Amount saved on this line compared to catalog price, rounded to cents.
    #[must_use]
    pub fn savings(&self) -> Decimal {
        round2(self.exact_savings())
    }

    fn exact_total(&self) -> Decimal {
        times_quantity(self.effective_unit_price, self.quantity)
    }

    fn exact_savings(&self) -> Decimal {
        times_quantity(self.unit_price - self.effective_unit_price, self.quantity)
    }

    /// The promotion currently pricing this line, if any.
    #[must_use]
    pub fn promotion(&self) -> Option<&PromotionRef> {
        authoritative_promotion(&self.applied_promotions)
    }
}

/// All lines a shopper holds for one merchant.
///
/// A partition without lines has no merchant; the store never keeps one
/// around, so an empty `MerchantCart` only appears as the answer to a lookup
/// of a merchant with no cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerchantCart {
    pub merchant: Option<MerchantRef>,
    pub lines: BTreeMap<ProductId, LineItem>,
    /// Persisted partition fields this crate does not interpret.
    pub extra: Map<String, Value>,
}

impl MerchantCart {
    /// Whether the partition has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Look up a line by product id.
    #[must_use]
    pub fn line(&self, product_id: &str) -> Option<&LineItem> {
        self.lines.get(product_id)
    }

    /// Sum of every line's effective price times its quantity, rounded once.
    #[must_use]
    pub fn total(&self) -> Decimal {
        round2(saturating_sum(self.lines.values().map(LineItem::exact_total)))
    }

    /// Sum of catalog price minus effective price over all lines, rounded once.
    #[must_use]
    pub fn savings(&self) -> Decimal {
        round2(saturating_sum(self.lines.values().map(LineItem::exact_savings)))
    }

    /// Total quantity across lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.values().map(|line| u64::from(line.quantity)).sum()
    }
}

// Amounts saturate at `Decimal::MAX` instead of overflowing. Prices are capped
// on the way in, so only a hand-edited cart can get there.

fn times_quantity(price: Decimal, quantity: u32) -> Decimal {
    price
        .checked_mul(Decimal::from(quantity))
        .unwrap_or(Decimal::MAX)
}

fn saturating_sum(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).unwrap_or(Decimal::MAX)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(id: &str, price: &str, quantity: u32, promotions: Vec<PromotionRef>) -> LineItem {
        let mut line = LineItem::new(ProductId::new(id), id.to_string(), dec(price), None, promotions);
        line.quantity = quantity;
        line
    }

    #[test]
    fn test_new_line_uses_first_promotion() {
        let line = line(
            "1",
            "10.00",
            1,
            vec![
                PromotionRef::percentage("a", dec("20"), "20% off"),
                PromotionRef::fixed_amount("b", dec("9"), "9 off"),
            ],
        );
        assert_eq!(line.effective_unit_price, dec("8.00"));
        assert_eq!(line.promotion().unwrap().id.as_str(), "a");
    }

    #[test]
    fn test_apply_promotions_recomputes_from_unit_price() {
        let mut line = line("1", "10.00", 2, vec![PromotionRef::percentage("a", dec("50"), "")]);
        assert_eq!(line.effective_unit_price, dec("5.00"));

        line.apply_promotions(vec![PromotionRef::fixed_amount("b", dec("1"), "")]);
        assert_eq!(line.effective_unit_price, dec("9.00"));

        line.apply_promotions(Vec::new());
        assert_eq!(line.effective_unit_price, dec("10.00"));
        assert!(line.applied_promotions.is_empty());
    }

    #[test]
    fn test_totals() {
        let mut cart = MerchantCart::default();
        for l in [
            line("1", "10.00", 2, Vec::new()),
            line("2", "3.33", 3, Vec::new()),
            line("3", "5.00", 1, vec![PromotionRef::fixed_amount("p", dec("1.25"), "")]),
        ] {
            cart.lines.insert(l.product_id.clone(), l);
        }

        assert_eq!(cart.total(), dec("33.74"));
        assert_eq!(cart.savings(), dec("1.25"));
        assert_eq!(cart.item_count(), 6);
        assert!(cart.line("2").is_some());
        assert!(cart.line("4").is_none());
    }

    #[test]
    fn test_total_rounds_once() {
        let mut cart = MerchantCart::default();
        for id in ["1", "2"] {
            let mut l = line(id, "0.01", 1, Vec::new());
            l.effective_unit_price = dec("0.005");
            cart.lines.insert(l.product_id.clone(), l);
        }

        assert_eq!(cart.lines["1"].line_total(), dec("0.01"));
        assert_eq!(cart.total(), dec("0.01"));
        assert_eq!(cart.savings(), dec("0.01"));
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let mut cart = MerchantCart::default();
        for id in ["1", "2"] {
            let l = line(id, "1", u32::MAX, Vec::new());
            let l = LineItem {
                unit_price: Decimal::MAX,
                effective_unit_price: Decimal::MAX,
                ..l
            };
            cart.lines.insert(l.product_id.clone(), l);
        }

        assert_eq!(cart.lines["1"].line_total(), Decimal::MAX);
        assert_eq!(cart.total(), Decimal::MAX);
        assert_eq!(cart.savings(), Decimal::ZERO);
    }

    #[test]
    fn test_empty_cart() {
        let cart = MerchantCart::default();
        assert!(cart.is_empty());
        assert!(cart.merchant.is_none());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }
}
