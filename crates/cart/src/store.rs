//! The merchant-partitioned cart store.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use rust_decimal::Decimal;
use tracing::{debug, error, info, instrument, warn};

use merchant_cart_core::{CurrencyCode, MerchantId, ProductId, PromotionRef};

use crate::blob;
use crate::catalog::{CompanyField, Product};
use crate::checkout::{OrderDraft, OrderLine};
use crate::error::{CartError, PersistenceError, Result};
use crate::model::{LineItem, MerchantCart, MerchantRef};
use crate::storage::CartStorage;
use crate::view::CartView;

/// All of a shopper's carts, one partition per merchant.
///
/// Every mutation rewrites the whole persisted blob before returning. If that
/// write fails the mutation stays in memory, the store is marked dirty and
/// [`CartError::Persistence`] is returned; [`CartStore::flush`] retries.
///
/// Keep exactly one store per session and share it through
/// [`SharedCart`](crate::SharedCart); two stores over the same storage
/// overwrite each other's writes.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    partitions: BTreeMap<MerchantId, MerchantCart>,
    dirty: bool,
}

impl<S: CartStorage> CartStore<S> {
    /// Materialize the store from `storage`.
    ///
    /// Unreadable or corrupted state is logged and replaced by an empty cart;
    /// loading never fails.
    #[must_use]
    pub fn load(storage: S) -> Self {
        let partitions = match storage.read() {
            Ok(Some(raw)) => match blob::decode(&raw) {
                Ok(partitions) => partitions,
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable cart");
                    BTreeMap::new()
                }
            },
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!(error = %e, "Cart storage unavailable, starting empty");
                BTreeMap::new()
            }
        };

        debug!(partitions = partitions.len(), "Cart loaded");

        Self {
            storage,
            partitions,
            dirty: false,
        }
    }

    /// Add one unit of `product` to the merchant's cart.
    ///
    /// An existing line gets its quantity bumped and its promotions re-snapshotted
    /// from `product`; its catalog price is kept. A new line starts at quantity 1.
    ///
    /// The partition's merchant is `merchant` if given, otherwise the one already
    /// on the partition, then the product's `company`, then a reference with only
    /// `merchant_id`.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidProduct`] if the product has no id or price; the
    ///   store is unchanged.
    /// - [`CartError::Persistence`] if the blob could not be written; the line
    ///   was still added.
    #[instrument(skip_all, fields(merchant_id = %merchant_id.as_ref()))]
    pub fn add_item(
        &mut self,
        merchant_id: impl AsRef<str>,
        product: &Product,
        merchant: Option<&MerchantRef>,
    ) -> Result<LineItem> {
        let (product_id, unit_price) = product.validate()?;
        let merchant_id = MerchantId::from(merchant_id.as_ref());

        let partition = self.partitions.entry(merchant_id.clone()).or_default();

        let resolved = match merchant {
            Some(merchant) => merchant.clone(),
            None => partition
                .merchant
                .clone()
                .or_else(|| product.company.as_ref().map(CompanyField::to_merchant_ref))
                .unwrap_or_else(|| MerchantRef::new(merchant_id.clone(), "")),
        };
        if resolved.id != merchant_id {
            warn!(merchant_ref = %resolved.id, "Merchant reference does not match partition key");
        }
        partition.merchant = Some(resolved);

        let line = match partition.lines.entry(product_id.clone()) {
            Entry::Occupied(mut entry) => {
                let line = entry.get_mut();
                line.quantity = line.quantity.saturating_add(1);
                line.apply_promotions(product.active_promotions.clone());
                line.clone()
            }
            Entry::Vacant(entry) => entry
                .insert(LineItem::new(
                    product_id.clone(),
                    product.name.clone(),
                    unit_price,
                    product.image_url.clone(),
                    product.active_promotions.clone(),
                ))
                .clone(),
        };

        debug!(
            %product_id,
            quantity = line.quantity,
            effective_unit_price = %line.effective_unit_price,
            "Item added to cart"
        );

        self.persist()?;
        Ok(line)
    }

    /// Remove a line, deleting the partition if it was the last one.
    ///
    /// Removing a line that does not exist is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] if the blob could not be written; the
    /// line was still removed.
    #[instrument(skip_all, fields(merchant_id = %merchant_id.as_ref(), product_id = %product_id.as_ref()))]
    pub fn remove_item(
        &mut self,
        merchant_id: impl AsRef<str>,
        product_id: impl AsRef<str>,
    ) -> Result<()> {
        let merchant_id = merchant_id.as_ref();
        let Some(partition) = self.partitions.get_mut(merchant_id) else {
            return Ok(());
        };
        if partition.lines.remove(product_id.as_ref()).is_none() {
            return Ok(());
        }

        if partition.lines.is_empty() {
            self.partitions.remove(merchant_id);
            debug!("Last line removed, partition deleted");
        } else {
            debug!("Line removed");
        }

        self.persist()?;
        Ok(())
    }

    /// Set a line's quantity to exactly `quantity`.
    ///
    /// A quantity of zero or less removes the line (and is a no-op if the line
    /// does not exist).
    ///
    /// # Errors
    ///
    /// - [`CartError::LineNotFound`] if `quantity >= 1` and the line does not
    ///   exist; the store is unchanged.
    /// - [`CartError::Persistence`] if the blob could not be written; the new
    ///   quantity is still in effect.
    #[instrument(skip_all, fields(merchant_id = %merchant_id.as_ref(), product_id = %product_id.as_ref(), quantity = quantity))]
    pub fn update_quantity(
        &mut self,
        merchant_id: impl AsRef<str>,
        product_id: impl AsRef<str>,
        quantity: i64,
    ) -> Result<()> {
        if quantity <= 0 {
            return self.remove_item(merchant_id, product_id);
        }

        let line = self.line_mut(merchant_id.as_ref(), product_id.as_ref())?;
        line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        debug!("Quantity updated");

        self.persist()?;
        Ok(())
    }

    /// Replace a line's promotion snapshot and recompute its effective price.
    ///
    /// Used when the catalog reports new promotions for a product already in
    /// the cart.
    ///
    /// # Errors
    ///
    /// - [`CartError::LineNotFound`] if the line does not exist.
    /// - [`CartError::Persistence`] if the blob could not be written; the new
    ///   price is still in effect.
    #[instrument(skip_all, fields(merchant_id = %merchant_id.as_ref(), product_id = %product_id.as_ref()))]
    pub fn reprice_line(
        &mut self,
        merchant_id: impl AsRef<str>,
        product_id: impl AsRef<str>,
        promotions: &[PromotionRef],
    ) -> Result<LineItem> {
        let line = self.line_mut(merchant_id.as_ref(), product_id.as_ref())?;
        line.apply_promotions(promotions.to_vec());
        let line = line.clone();
        debug!(effective_unit_price = %line.effective_unit_price, "Line repriced");

        self.persist()?;
        Ok(line)
    }

    /// Delete the merchant's partition unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] if the blob could not be written; the
    /// partition was still deleted.
    #[instrument(skip_all, fields(merchant_id = %merchant_id.as_ref()))]
    pub fn clear_merchant(&mut self, merchant_id: impl AsRef<str>) -> Result<()> {
        if self.partitions.remove(merchant_id.as_ref()).is_none() {
            return Ok(());
        }
        info!("Merchant cart cleared");

        self.persist()?;
        Ok(())
    }

    /// Delete every partition and remove the persisted entry.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] if the entry could not be removed; the
    /// in-memory store is still empty.
    #[instrument(skip_all)]
    pub fn clear_all(&mut self) -> Result<()> {
        self.partitions.clear();
        info!("All carts cleared");

        match self.storage.clear() {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                error!(error = %e, "Failed to clear persisted cart");
                Err(e.into())
            }
        }
    }

    /// Write the store out again if an earlier write failed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] if the write fails again.
    pub fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.persist()?;
        }
        Ok(())
    }

    /// Whether the in-memory store has changes the storage does not.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Sum of `effective_unit_price * quantity` over the merchant's lines.
    ///
    /// Zero for a merchant with no cart.
    #[must_use]
    pub fn get_total(&self, merchant_id: impl AsRef<str>) -> Decimal {
        self.partition(merchant_id)
            .map_or(Decimal::ZERO, MerchantCart::total)
    }

    /// Copy of the merchant's partition, empty if the merchant has no cart.
    #[must_use]
    pub fn get_partition(&self, merchant_id: impl AsRef<str>) -> MerchantCart {
        self.partition(merchant_id).cloned().unwrap_or_default()
    }

    /// Borrow the merchant's partition, if it exists.
    #[must_use]
    pub fn partition(&self, merchant_id: impl AsRef<str>) -> Option<&MerchantCart> {
        self.partitions.get(merchant_id.as_ref())
    }

    /// Total quantity across the merchant's lines.
    #[must_use]
    pub fn item_count(&self, merchant_id: impl AsRef<str>) -> u64 {
        self.partition(merchant_id)
            .map_or(0, MerchantCart::item_count)
    }

    /// Merchants that currently have a cart, in key order.
    pub fn merchants(&self) -> impl Iterator<Item = &MerchantId> {
        self.partitions.keys()
    }

    /// Display projection of the merchant's cart.
    #[must_use]
    pub fn view(&self, merchant_id: impl AsRef<str>, currency: CurrencyCode) -> CartView {
        self.partition(merchant_id).map_or_else(
            || CartView::empty(currency),
            |cart| CartView::from_partition(cart, currency),
        )
    }

    /// Order request body for checking out the merchant's cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyCart`] if the merchant has no cart.
    pub fn checkout_draft(&self, merchant_id: impl AsRef<str>) -> Result<OrderDraft> {
        let merchant_id = merchant_id.as_ref();
        let cart = self
            .partition(merchant_id)
            .filter(|cart| !cart.is_empty())
            .ok_or_else(|| CartError::EmptyCart(MerchantId::from(merchant_id)))?;

        let company = cart
            .merchant
            .as_ref()
            .map_or_else(|| MerchantId::from(merchant_id), |m| m.id.clone());

        Ok(OrderDraft {
            company,
            items: cart
                .lines
                .values()
                .map(|line| OrderLine {
                    product: line.product_id.clone(),
                    quantity: line.quantity,
                })
                .collect(),
            total: cart.total(),
        })
    }

    /// The storage backend.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn line_mut(&mut self, merchant_id: &str, product_id: &str) -> Result<&mut LineItem> {
        self.partitions
            .get_mut(merchant_id)
            .and_then(|partition| partition.lines.get_mut(product_id))
            .ok_or_else(|| CartError::LineNotFound {
                merchant_id: MerchantId::from(merchant_id),
                product_id: ProductId::from(product_id),
            })
    }

    fn persist(&mut self) -> std::result::Result<(), PersistenceError> {
        let written = blob::encode(&self.partitions).and_then(|raw| self.storage.write(&raw));
        match written {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                error!(error = %e, "Failed to persist cart, changes kept in memory");
                Err(e)
            }
        }
    }
}
