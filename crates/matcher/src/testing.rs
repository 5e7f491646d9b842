//! In-memory catalog for matcher tests.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use crosscity_client::{ApiError, CatalogApi};
use crosscity_core::{
    CatalogItem, CatalogPage, Category, CategoryId, ItemAttribute, ItemDetail, ItemFeatures,
    ItemId, ItemPrices, MinorUnits, Store, StoreId, StoreList,
};

pub fn store(id: i64, address: &str, market_type: &str) -> Store {
    Store {
        id: StoreId::new(id),
        address_full: address.to_string(),
        market_type: market_type.to_string(),
    }
}

pub fn category(id: i64, slug: &str, level: u32) -> Category {
    Category {
        id: CategoryId::new(id),
        name: slug.to_string(),
        level,
        slug: slug.to_string(),
        parent_id: None,
    }
}

/// An available item priced at `id` roubles (promo) and `id + 10` (regular).
pub fn item(id: i64, count: i64) -> CatalogItem {
    CatalogItem {
        id: ItemId::new(id),
        name: format!("Товар {id}"),
        count,
        features: ItemFeatures::default(),
        prices: ItemPrices {
            cost: MinorUnits::new(id * 100),
            cost_regular: MinorUnits::new((id + 10) * 100),
        },
        brand: None,
    }
}

pub fn items(ids: RangeInclusive<i64>, count: i64) -> Vec<CatalogItem> {
    ids.map(|id| item(id, count)).collect()
}

/// A page whose total equals its item count.
pub fn page(items: Vec<CatalogItem>) -> CatalogPage {
    let total = items.len() as u64;
    CatalogPage { items, total }
}

pub fn detail(id: i64, brand: &str) -> ItemDetail {
    ItemDetail {
        id: Some(ItemId::new(id)),
        name: format!("Товар {id}"),
        attributes: vec![ItemAttribute {
            alias: Some("brand".to_string()),
            name: Some("Бренд".to_string()),
            slug: None,
            value: serde_json::Value::String(brand.to_string()),
        }],
    }
}

/// Catalog fake: categories and listings are scoped to the selected store,
/// like the real backend.
#[derive(Default)]
pub struct FakeCatalog {
    stores: Vec<Store>,
    categories: HashMap<StoreId, Vec<Category>>,
    pages: HashMap<(StoreId, CategoryId), CatalogPage>,
    details: HashMap<ItemId, ItemDetail>,
    selected: Mutex<Option<StoreId>>,
    detail_failures: AtomicU32,
    detail_failure_status: u16,
    select_calls: AtomicU32,
    detail_calls: AtomicU32,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stores(mut self, stores: Vec<Store>) -> Self {
        self.stores = stores;
        self
    }

    pub fn with_categories(mut self, store_id: i64, categories: Vec<Category>) -> Self {
        self.categories.insert(StoreId::new(store_id), categories);
        self
    }

    pub fn with_page(mut self, store_id: i64, category_id: i64, page: CatalogPage) -> Self {
        self.pages
            .insert((StoreId::new(store_id), CategoryId::new(category_id)), page);
        self
    }

    pub fn with_detail(mut self, detail: ItemDetail) -> Self {
        let id = detail.id.expect("detail fixture has an id");
        self.details.insert(id, detail);
        self
    }

    /// Fail the next `count` detail lookups with `status`.
    pub fn failing_details(mut self, count: u32, status: u16) -> Self {
        self.detail_failures = AtomicU32::new(count);
        self.detail_failure_status = status;
        self
    }

    pub fn select_calls(&self) -> u32 {
        self.select_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> u32 {
        self.detail_calls.load(Ordering::SeqCst)
    }

    fn selected(&self) -> Result<StoreId, ApiError> {
        self.selected
            .lock()
            .expect("selected store lock")
            .ok_or_else(|| ApiError::Status {
                status: 400,
                body: "no store selected".to_string(),
            })
    }
}

impl CatalogApi for FakeCatalog {
    async fn stores(&self) -> Result<StoreList, ApiError> {
        Ok(StoreList {
            items: self.stores.clone(),
            metadata: serde_json::Map::new(),
        })
    }

    async fn select_store(&self, store_id: StoreId) -> Result<(), ApiError> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        *self.selected.lock().expect("selected store lock") = Some(store_id);
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let store_id = self.selected()?;
        Ok(self.categories.get(&store_id).cloned().unwrap_or_default())
    }

    async fn catalog_items(&self, category_id: CategoryId) -> Result<CatalogPage, ApiError> {
        let store_id = self.selected()?;
        Ok(self
            .pages
            .get(&(store_id, category_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn catalog_item(&self, item_id: ItemId) -> Result<ItemDetail, ApiError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .detail_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ApiError::Status {
                status: self.detail_failure_status,
                body: "try again later".to_string(),
            });
        }

        Ok(self.details.get(&item_id).cloned().unwrap_or(ItemDetail {
            id: Some(item_id),
            name: String::new(),
            attributes: Vec::new(),
        }))
    }
}
