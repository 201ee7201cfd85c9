//! Wishlist snapshot.

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Wishlisted products in the order they were added.
///
/// Toggle semantics keep the list free of duplicates; duplicates found in
/// persisted data are dropped by [`WishlistSnapshot::normalized`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WishlistSnapshot(Vec<ProductId>);

impl WishlistSnapshot {
    /// Create an empty wishlist.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Drop repeated ids, keeping the first occurrence.
    #[must_use]
    pub fn normalized(self) -> Self {
        let mut unique: Vec<ProductId> = Vec::with_capacity(self.0.len());
        for id in self.0 {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Self(unique)
    }

    /// Add the product if absent, remove it if present.
    ///
    /// Returns `true` if the product is in the wishlist afterwards.
    pub fn toggle(&mut self, id: &ProductId) -> bool {
        if let Some(position) = self.0.iter().position(|existing| existing == id) {
            self.0.remove(position);
            false
        } else {
            self.0.push(id.clone());
            true
        }
    }

    /// Whether the product is wishlisted.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.0.contains(id)
    }

    /// Number of wishlisted products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the wishlist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Empty the wishlist.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterate over wishlisted products in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ProductId> {
        self.0.iter()
    }
}

impl FromIterator<ProductId> for WishlistSnapshot {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        Self(iter.into_iter().collect()).normalized()
    }
}
