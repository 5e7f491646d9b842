//! The catalog operations the matcher depends on.

use std::future::Future;

use crosscity_core::{CatalogPage, Category, CategoryId, ItemDetail, ItemId, StoreId, StoreList};

use crate::client::CatalogClient;
use crate::error::ApiError;

/// Read access to the catalog, scoped by a selected store.
///
/// Implemented by [`CatalogClient`]; tests substitute in-memory fakes.
pub trait CatalogApi {
    /// All pickup stores.
    fn stores(&self) -> impl Future<Output = Result<StoreList, ApiError>> + Send;

    /// Scope subsequent category and catalog calls to `store_id`.
    fn select_store(&self, store_id: StoreId) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Categories of the selected store.
    fn categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send;

    /// First page of a category at the selected store.
    fn catalog_items(
        &self,
        category_id: CategoryId,
    ) -> impl Future<Output = Result<CatalogPage, ApiError>> + Send;

    /// Full detail of one item.
    fn catalog_item(
        &self,
        item_id: ItemId,
    ) -> impl Future<Output = Result<ItemDetail, ApiError>> + Send;
}

impl CatalogApi for CatalogClient {
    async fn stores(&self) -> Result<StoreList, ApiError> {
        self.get_stores().await
    }

    async fn select_store(&self, store_id: StoreId) -> Result<(), ApiError> {
        CatalogClient::select_store(self, store_id)
            .await
            .map(|_| ())
    }

    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_categories().await
    }

    async fn catalog_items(&self, category_id: CategoryId) -> Result<CatalogPage, ApiError> {
        self.get_catalog_items(category_id).await
    }

    async fn catalog_item(&self, item_id: ItemId) -> Result<ItemDetail, ApiError> {
        self.get_catalog_item(item_id).await
    }
}

impl<T: CatalogApi + Sync> CatalogApi for &T {
    fn stores(&self) -> impl Future<Output = Result<StoreList, ApiError>> + Send {
        (**self).stores()
    }

    fn select_store(&self, store_id: StoreId) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).select_store(store_id)
    }

    fn categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send {
        (**self).categories()
    }

    fn catalog_items(
        &self,
        category_id: CategoryId,
    ) -> impl Future<Output = Result<CatalogPage, ApiError>> + Send {
        (**self).catalog_items(category_id)
    }

    fn catalog_item(
        &self,
        item_id: ItemId,
    ) -> impl Future<Output = Result<ItemDetail, ApiError>> + Send {
        (**self).catalog_item(item_id)
    }
}
