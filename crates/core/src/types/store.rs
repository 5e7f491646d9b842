//! Pickup stores.

use serde::{Deserialize, Serialize};

use super::id::StoreId;

/// Market type tag of a hypermarket (largest assortment).
pub const HYPERMARKET: &str = "HM";

/// A pickup store as returned by the store search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    /// Full postal address, including the city name.
    pub address_full: String,
    /// Store format tag (e.g. `HM`).
    #[serde(default)]
    pub market_type: String,
}

impl Store {
    /// Whether the store's address mentions the given city.
    #[must_use]
    pub fn is_in_city(&self, city: &str) -> bool {
        self.address_full.contains(city)
    }
}

/// Result of the store search: the store list plus whatever metadata the
/// backend sends alongside it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreList {
    #[serde(default)]
    pub items: Vec<Store>,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}
