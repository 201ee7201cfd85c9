//! Shopping cart snapshot.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::floor_to_cents;
use super::product::ProductCatalog;

/// Product quantities in the cart.
///
/// ## Invariants
///
/// - Every stored quantity is positive; setting a quantity of zero removes
///   the product instead of keeping a zero entry.
/// - Entries are ordered by product id, so the persisted form is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot(BTreeMap<ProductId, u32>);

impl CartSnapshot {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Drop zero-quantity entries, e.g. after loading from storage.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.0.retain(|_, quantity| *quantity > 0);
        self
    }

    /// Add one unit of a product, creating the entry at 1 if absent.
    ///
    /// Returns the new quantity.
    pub fn increment(&mut self, id: &ProductId) -> u32 {
        let quantity = self.0.entry(id.clone()).or_insert(0);
        *quantity = quantity.saturating_add(1);
        *quantity
    }

    /// Set a product's quantity; zero removes the entry.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.0.remove(id);
        } else {
            self.0.insert(id.clone(), quantity);
        }
    }

    /// Remove a product. Returns `true` if it was in the cart.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        self.0.remove(id).is_some()
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Quantity of a product (zero if absent).
    #[must_use]
    pub fn quantity(&self, id: &ProductId) -> u32 {
        self.0.get(id).copied().unwrap_or(0)
    }

    /// Whether the product is in the cart.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.0.contains_key(id)
    }

    /// Total number of units across all products.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.0.values().map(|&quantity| u64::from(quantity)).sum()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(product, quantity)` pairs in product id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, u32)> {
        self.0.iter().map(|(id, &quantity)| (id, quantity))
    }

    /// Total price of the cart, floored to cents.
    ///
    /// Products the catalog can't price contribute nothing.
    #[must_use]
    pub fn amount<C: ProductCatalog + ?Sized>(&self, catalog: &C) -> Decimal {
        let total = self
            .0
            .iter()
            .filter_map(|(id, &quantity)| {
                catalog
                    .price_of(id)
                    .map(|price| price.saturating_mul(Decimal::from(quantity)))
            })
            .fold(Decimal::ZERO, Decimal::saturating_add);
        floor_to_cents(total)
    }
}

impl FromIterator<(ProductId, u32)> for CartSnapshot {
    fn from_iter<I: IntoIterator<Item = (ProductId, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect()).normalized()
    }
}
