//! Matched product records, the output of a cross-city search.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ItemId;
use super::item::CatalogItem;

/// Brand of a matched product.
///
/// Serialized as a plain string; the two sentinels have fixed spellings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Brand {
    /// Brand attribute found on the item detail.
    Named(String),
    /// Item detail was fetched but carries no brand attribute.
    Unbranded,
    /// Item detail could not be fetched.
    Unknown,
}

impl Brand {
    pub const UNBRANDED: &'static str = "no brand";
    pub const UNKNOWN: &'static str = "unknown brand";

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Unbranded => Self::UNBRANDED,
            Self::Unknown => Self::UNKNOWN,
        }
    }
}

impl std::fmt::Display for Brand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Brand {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::UNBRANDED => Self::Unbranded,
            Self::UNKNOWN => Self::Unknown,
            _ => Self::Named(value),
        }
    }
}

impl From<Brand> for String {
    fn from(brand: Brand) -> Self {
        match brand {
            Brand::Named(name) => name,
            other => other.as_str().to_owned(),
        }
    }
}

/// A product available in both cities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedProduct {
    pub id: ItemId,
    pub name: String,
    pub brand: Brand,
    /// Regular price in major units.
    #[serde(with = "rust_decimal::serde::float")]
    pub regular_price: Decimal,
    /// Promotional (current) price in major units.
    #[serde(with = "rust_decimal::serde::float")]
    pub promo_price: Decimal,
}

impl MatchedProduct {
    /// Build a record from a catalog item, converting prices to major units.
    #[must_use]
    pub fn from_item(item: &CatalogItem, brand: Brand) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            brand,
            regular_price: item.prices.cost_regular.to_major(),
            promo_price: item.prices.cost.to_major(),
        }
    }
}
