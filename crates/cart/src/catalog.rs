//! Catalog objects handed to the cart by the product listing pages.
//!
//! These mirror the backend's product payload loosely: every field is optional
//! on the wire so a malformed product can be rejected with a precise
//! [`ProductError`] instead of a deserialization failure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use merchant_cart_core::{MerchantId, ProductId, PromotionRef};

use crate::model::MerchantRef;

/// Highest unit price the cart accepts.
///
/// Keeps `price * quantity` within `Decimal` range for any `u32` quantity.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Reasons a product cannot be added to the cart.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// The product has no id (or an empty one).
    #[error("product is missing an id")]
    MissingId,
    /// The product has no price.
    #[error("product {0} is missing a price")]
    MissingPrice(ProductId),
    /// The product's price is below zero.
    #[error("product {id} has a negative price ({price})")]
    NegativePrice { id: ProductId, price: Decimal },
    /// The product's price is above [`MAX_UNIT_PRICE`].
    #[error("product {id} has a price above the cart limit ({price})")]
    PriceOutOfRange { id: ProductId, price: Decimal },
}

/// The `company` field of a product: either the full merchant or only its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompanyField {
    Full(MerchantRef),
    Id(MerchantId),
}

impl CompanyField {
    /// Merchant reference for this field, with an empty name if only the id is known.
    #[must_use]
    pub fn to_merchant_ref(&self) -> MerchantRef {
        match self {
            Self::Full(merchant) => merchant.clone(),
            Self::Id(id) => MerchantRef::new(id.clone(), ""),
        }
    }
}

/// A product as listed by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Promotions in the order the catalog ranks them; the first one prices the line.
    #[serde(default)]
    pub active_promotions: Vec<PromotionRef>,
    #[serde(default)]
    pub company: Option<CompanyField>,
}

impl Product {
    /// Create a product with an id, name and price and nothing else.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            price: Some(price),
            ..Self::default()
        }
    }

    /// Append an active promotion.
    #[must_use]
    pub fn with_promotion(mut self, promotion: PromotionRef) -> Self {
        self.active_promotions.push(promotion);
        self
    }

    /// Set the image URL.
    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Set the owning merchant.
    #[must_use]
    pub fn with_company(mut self, merchant: MerchantRef) -> Self {
        self.company = Some(CompanyField::Full(merchant));
        self
    }

    /// Check the product can be priced, returning its id and catalog price.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is missing or blank, or the price is missing,
    /// negative or above [`MAX_UNIT_PRICE`].
    pub fn validate(&self) -> Result<(ProductId, Decimal), ProductError> {
        let id = self
            .id
            .clone()
            .filter(|id| !id.is_blank())
            .ok_or(ProductError::MissingId)?;
        let price = self
            .price
            .ok_or_else(|| ProductError::MissingPrice(id.clone()))?;

        if price < Decimal::ZERO {
            return Err(ProductError::NegativePrice { id, price });
        }
        if price > MAX_UNIT_PRICE {
            return Err(ProductError::PriceOutOfRange { id, price });
        }

        Ok((id, price))
    }
}
