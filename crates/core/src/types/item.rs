//! Catalog items, catalog pages and item details.

use serde::{Deserialize, Serialize};

use super::id::ItemId;
use super::price::MinorUnits;

/// Item flags relevant to availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFeatures {
    #[serde(default)]
    pub is_blocked_for_sale: bool,
}

/// Item prices, all in minor currency units.
///
/// `cost` is the price the customer pays (promotional when a promotion is
/// running), `cost_regular` the undiscounted price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPrices {
    #[serde(default)]
    pub cost: MinorUnits,
    #[serde(default)]
    pub cost_regular: MinorUnits,
}

/// One entry of a catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    /// Units in stock at the selected store.
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub features: ItemFeatures,
    #[serde(default)]
    pub prices: ItemPrices,
    #[serde(default)]
    pub brand: Option<String>,
}

impl CatalogItem {
    /// In stock and not blocked for sale.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.count > 0 && !self.features.is_blocked_for_sale
    }
}

/// One page of a category listing.
///
/// `total` is the number of items in the category, which may exceed the
/// number of items on the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub items: Vec<CatalogItem>,
    #[serde(default)]
    pub total: u64,
}

/// A descriptive attribute from the item detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemAttribute {
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl ItemAttribute {
    /// The attribute value as display text.
    ///
    /// Strings are returned unquoted, `null` as `None`, anything else in its
    /// JSON form.
    #[must_use]
    pub fn value_text(&self) -> Option<String> {
        match &self.value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Full item detail.
///
/// Only the attributes are needed; every other field may be absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDetail {
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<ItemAttribute>,
}
