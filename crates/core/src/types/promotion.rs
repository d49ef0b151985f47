//! Promotions and promotion-aware pricing.
//!
//! [`effective_price`] is the only place a discount is ever applied. Adding a
//! product, repricing a line, and normalizing a loaded cart all go through it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::PromotionId;
use super::price::round2;

/// How a promotion's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// `discount_value` is a percentage of the base price (20 means 20% off).
    Percentage,
    /// `discount_value` is subtracted from the base price.
    FixedAmount,
}

/// A promotion as advertised by the catalog and snapshotted onto a cart line.
///
/// Fields the cart does not understand are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRef {
    pub id: PromotionId,
    pub discount_type: DiscountType,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub discount_value: Decimal,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PromotionRef {
    /// Create a promotion with no extra fields.
    #[must_use]
    pub fn new(
        id: impl Into<PromotionId>,
        discount_type: DiscountType,
        discount_value: Decimal,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            discount_type,
            discount_value,
            title: title.into(),
            extra: Map::new(),
        }
    }

    /// Shorthand for a percentage-off promotion.
    #[must_use]
    pub fn percentage(id: impl Into<PromotionId>, percent: Decimal, title: impl Into<String>) -> Self {
        Self::new(id, DiscountType::Percentage, percent, title)
    }

    /// Shorthand for a fixed-amount-off promotion.
    #[must_use]
    pub fn fixed_amount(id: impl Into<PromotionId>, amount: Decimal, title: impl Into<String>) -> Self {
        Self::new(id, DiscountType::FixedAmount, amount, title)
    }
}

/// The promotion that prices a product: the first one the catalog lists.
///
/// The catalog orders active promotions itself; no "best discount" search is
/// done here.
#[must_use]
pub fn authoritative_promotion(promotions: &[PromotionRef]) -> Option<&PromotionRef> {
    promotions.first()
}

/// Unit price after applying `promotion` to `base`, rounded half-up to cents.
///
/// The result always lies in `[0, base]` for a non-negative base: negative
/// discount values count as no discount, and a percentage above 100 or a fixed
/// amount above the base floors at zero.
///
/// ```
/// use merchant_cart_core::{PromotionRef, effective_price};
/// use rust_decimal::Decimal;
///
/// let base = Decimal::new(1000, 2); // 10.00
/// let promo = PromotionRef::percentage("p1", Decimal::from(20), "20% off");
/// assert_eq!(effective_price(base, Some(&promo)), Decimal::new(800, 2));
/// assert_eq!(effective_price(base, None), base);
/// ```
#[must_use]
pub fn effective_price(base: Decimal, promotion: Option<&PromotionRef>) -> Decimal {
    let Some(promotion) = promotion else {
        return base;
    };

    let value = promotion.discount_value.max(Decimal::ZERO);
    let discounted = match promotion.discount_type {
        DiscountType::Percentage => {
            let kept = Decimal::ONE - value.min(Decimal::ONE_HUNDRED) / Decimal::ONE_HUNDRED;
            base.checked_mul(kept).unwrap_or(base)
        }
        DiscountType::FixedAmount => base.checked_sub(value).unwrap_or(Decimal::ZERO),
    };

    round2(discounted.max(Decimal::ZERO)).min(base)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_no_promotion_returns_base() {
        assert_eq!(effective_price(dec("12.34"), None), dec("12.34"));
    }

    #[test]
    fn test_percentage_discount() {
        let promo = PromotionRef::percentage("1", dec("20"), "Spring");
        assert_eq!(effective_price(dec("10.00"), Some(&promo)), dec("8.00"));
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 9.99 * 0.85 = 8.4915
        let promo = PromotionRef::percentage("1", dec("15"), "");
        assert_eq!(effective_price(dec("9.99"), Some(&promo)), dec("8.49"));
        // 0.25 * 0.5 = 0.125
        let promo = PromotionRef::percentage("1", dec("50"), "");
        assert_eq!(effective_price(dec("0.25"), Some(&promo)), dec("0.13"));
    }

    #[test]
    fn test_fixed_amount_discount() {
        let promo = PromotionRef::fixed_amount("2", dec("2.50"), "Lunch deal");
        assert_eq!(effective_price(dec("10.00"), Some(&promo)), dec("7.50"));
    }

    #[test]
    fn test_fixed_amount_floors_at_zero() {
        let promo = PromotionRef::fixed_amount("2", dec("15"), "Free");
        assert_eq!(effective_price(dec("10.00"), Some(&promo)), Decimal::ZERO);
    }

    #[test]
    fn test_out_of_range_values_stay_within_base() {
        let over = PromotionRef::percentage("3", dec("150"), "");
        assert_eq!(effective_price(dec("10"), Some(&over)), Decimal::ZERO);

        let negative = PromotionRef::fixed_amount("4", dec("-5"), "");
        assert_eq!(effective_price(dec("10"), Some(&negative)), dec("10"));

        let negative_pct = PromotionRef::percentage("5", dec("-10"), "");
        assert_eq!(effective_price(dec("10"), Some(&negative_pct)), dec("10"));
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let huge_pct = PromotionRef::percentage("6", Decimal::from(1_000_000), "");
        assert_eq!(effective_price(Decimal::MAX, Some(&huge_pct)), Decimal::ZERO);

        let tenth = PromotionRef::percentage("7", dec("10"), "");
        let price = effective_price(Decimal::MAX, Some(&tenth));
        assert!(price >= Decimal::ZERO);

        let huge_fixed = PromotionRef::fixed_amount("8", Decimal::MAX, "");
        assert_eq!(effective_price(Decimal::MAX, Some(&huge_fixed)), Decimal::ZERO);
        assert_eq!(effective_price(Decimal::ZERO, Some(&huge_fixed)), Decimal::ZERO);
    }

    #[test]
    fn test_monotonic_over_grid() {
        let bases = ["0", "0.01", "0.99", "1", "9.99", "10", "123.45"];
        let values = ["0", "0.5", "1", "10", "33.33", "99.99", "100", "250"];
        for base in bases {
            for value in values {
                for promo in [
                    PromotionRef::percentage("p", dec(value), ""),
                    PromotionRef::fixed_amount("f", dec(value), ""),
                ] {
                    let price = effective_price(dec(base), Some(&promo));
                    assert!(price <= dec(base), "{price} > {base} for {promo:?}");
                    assert!(price >= Decimal::ZERO, "{price} negative for {promo:?}");
                }
            }
        }
    }

    #[test]
    fn test_authoritative_is_first_listed() {
        let promos = vec![
            PromotionRef::fixed_amount("a", dec("1"), "small"),
            PromotionRef::percentage("b", dec("90"), "large"),
        ];
        assert_eq!(authoritative_promotion(&promos).unwrap().id.as_str(), "a");
        assert!(authoritative_promotion(&[]).is_none());
    }

    #[test]
    fn test_deserialize_backend_shape() {
        let json = r#"{"id": 7, "discount_type": "FIXED_AMOUNT", "discount_value": "1.50",
                       "title": "Promo", "starts_at": "2024-01-01"}"#;
        let promo: PromotionRef = serde_json::from_str(json).unwrap();
        assert_eq!(promo.id.as_str(), "7");
        assert_eq!(promo.discount_type, DiscountType::FixedAmount);
        assert_eq!(promo.discount_value, dec("1.50"));
        assert_eq!(promo.extra.get("starts_at").unwrap(), "2024-01-01");

        let back = serde_json::to_value(&promo).unwrap();
        assert_eq!(back["starts_at"], "2024-01-01");
        assert_eq!(back["discount_value"], 1.5);
    }
}
