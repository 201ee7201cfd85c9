//! Marketplace product records and catalog lookups.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A product as exposed by the marketplace API.
///
/// Only the id and `price` are needed for cart totals; everything else is
/// display data. Records may carry `_id`, `id` or both; `_id` is preferred
/// and is the key written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductWire")]
pub struct ProductRecord {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Deserialize)]
struct ProductWire {
    #[serde(default, rename = "_id")]
    underscore_id: Option<ProductId>,
    #[serde(default)]
    id: Option<ProductId>,
    price: Decimal,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

impl TryFrom<ProductWire> for ProductRecord {
    type Error = &'static str;

    fn try_from(wire: ProductWire) -> Result<Self, Self::Error> {
        let id = wire
            .underscore_id
            .or(wire.id)
            .ok_or("missing field `_id`")?;
        Ok(Self {
            id,
            price: wire.price,
            name: wire.name,
            category: wire.category,
            image: wire.image,
        })
    }
}

/// Price lookup used to compute cart totals.
pub trait ProductCatalog {
    /// Unit price of a product, or `None` if the catalog doesn't know it.
    fn price_of(&self, id: &ProductId) -> Option<Decimal>;
}

impl ProductCatalog for HashMap<ProductId, ProductRecord> {
    fn price_of(&self, id: &ProductId) -> Option<Decimal> {
        self.get(id).map(|product| product.price)
    }
}

impl ProductCatalog for HashMap<ProductId, Decimal> {
    fn price_of(&self, id: &ProductId) -> Option<Decimal> {
        self.get(id).copied()
    }
}

impl ProductCatalog for [ProductRecord] {
    fn price_of(&self, id: &ProductId) -> Option<Decimal> {
        self.iter()
            .find(|product| &product.id == id)
            .map(|product| product.price)
    }
}

impl ProductCatalog for Vec<ProductRecord> {
    fn price_of(&self, id: &ProductId) -> Option<Decimal> {
        self.as_slice().price_of(id)
    }
}
