//! Catalog backend HTTP client.
//!
//! Provides typed access to store search, store selection, categories and
//! catalog items. Every request is signed immediately before it is sent.

use std::sync::Arc;

use chrono::Utc;
use crosscity_core::{
    CatalogPage, Category, CategoryId, ItemDetail, ItemId, StoreId, StoreList,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::headers::{Credentials, SignedRequest};
use crate::session::{SessionToken, bootstrap};

/// Number of items requested per catalog page.
pub const PAGE_SIZE: u32 = 100;

/// Catalog backend client.
///
/// # Authentication
///
/// A session token is requested on the first authenticated call and cached in
/// memory for the lifetime of the client. It is not refreshed on expiry; call
/// [`CatalogClient::invalidate_session`] to force a new bootstrap.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    config: ClientConfig,
    credentials: Credentials,
    /// In-memory session cache
    session: RwLock<Option<SessionToken>>,
}

/// JSON-RPC envelope used by the site endpoint.
#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectedStore {
    #[serde(default)]
    address_full: Option<String>,
}

#[derive(Deserialize)]
struct CategoriesResponse {
    #[serde(default)]
    categories: Vec<Category>,
}

impl CatalogClient {
    /// Create a new client with freshly generated device credentials.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().build()?;
        let credentials = Credentials::generate(&config);

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                config,
                credentials,
                session: RwLock::new(None),
            }),
        })
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Request a new session token and cache it, replacing any cached token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Authentication` if the response has no token, or
    /// `ApiError::Status` on a non-2xx response.
    pub async fn get_session_token(&self) -> Result<SessionToken, ApiError> {
        let mut session = self.inner.session.write().await;
        let token = self.bootstrap().await?;
        *session = Some(token.clone());
        Ok(token)
    }

    /// Return the cached session token, bootstrapping one if none is cached.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogClient::get_session_token`].
    pub async fn ensure_session(&self) -> Result<SessionToken, ApiError> {
        if let Some(token) = self.inner.session.read().await.as_ref() {
            return Ok(token.clone());
        }

        let mut session = self.inner.session.write().await;
        // Another caller may have bootstrapped while we waited for the lock
        if let Some(token) = session.as_ref() {
            return Ok(token.clone());
        }

        let token = self.bootstrap().await?;
        *session = Some(token.clone());
        Ok(token)
    }

    /// Whether a session token is cached.
    pub async fn has_session(&self) -> bool {
        self.inner.session.read().await.is_some()
    }

    /// Drop the cached session token.
    pub async fn invalidate_session(&self) {
        *self.inner.session.write().await = None;
    }

    async fn bootstrap(&self) -> Result<SessionToken, ApiError> {
        let token = bootstrap(
            &self.inner.client,
            &self.inner.config.site_url,
            &self.inner.credentials,
        )
        .await?;
        info!("obtained new session token");
        Ok(token)
    }

    // =========================================================================
    // Request Execution
    // =========================================================================

    /// Send a signed, authenticated request and parse the JSON response.
    async fn send<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        let text = self.send_raw(method, url, body).await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::Parse(format!("Failed to parse response from {url}: {e}")))
    }

    /// Send a signed, authenticated request and return the body unparsed.
    ///
    /// Only a non-2xx status is an error; any 2xx body is accepted.
    async fn send_raw(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<String, ApiError> {
        let session = self.ensure_session().await?;

        let headers = SignedRequest::new(&self.inner.credentials, Some(&session), url, Utc::now())
            .headers()?;

        debug!(%method, url, "sending request");
        let mut request = self.inner.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }

    fn catalog_url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.config.catalog_url)
    }

    fn site_url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.config.site_url)
    }

    // =========================================================================
    // Stores
    // =========================================================================

    /// List all pickup stores.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn get_stores(&self) -> Result<StoreList, ApiError> {
        let url = self.catalog_url("/v1/stores/pickup/search");
        let stores: StoreList = self
            .send(reqwest::Method::POST, &url, Some(&serde_json::json!({})))
            .await?;
        debug!(count = stores.items.len(), "received stores");
        Ok(stores)
    }

    /// Switch delivery mode to pickup from the given store.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the backend's status and body on failure.
    #[instrument(skip(self))]
    pub async fn set_delivery(&self, store_id: StoreId) -> Result<(), ApiError> {
        let url = self.site_url("/jrpc/deliveryModeSet");
        let body = rpc_body(
            "deliveryModeSet",
            serde_json::json!({ "type": "shop", "storeId": store_id }),
        );

        let response = self
            .send_raw(reqwest::Method::POST, &url, Some(&body))
            .await?;
        debug!(%response, "delivery mode set");
        Ok(())
    }

    /// Confirm the selected pickup store.
    ///
    /// Returns the store's full address as confirmed by the backend, if the
    /// reply carries one. A 2xx reply without it is still a success.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the backend's status and body on failure.
    #[instrument(skip(self))]
    pub async fn set_store(&self, store_id: StoreId) -> Result<Option<String>, ApiError> {
        let url = self.site_url("/jrpc/pickupStoreSelectedSet");
        let body = rpc_body(
            "pickupStoreSelectedSet",
            serde_json::json!({ "storeId": store_id }),
        );

        let response = self
            .send_raw(reqwest::Method::POST, &url, Some(&body))
            .await?;
        let address = confirmed_address(&response);

        if let Some(address) = &address {
            info!(%store_id, address, "store selected");
        }
        Ok(address)
    }

    /// Scope subsequent category and catalog calls to a store.
    ///
    /// Sets the delivery mode, then confirms the store.
    ///
    /// # Errors
    ///
    /// Returns the first failing call's error.
    pub async fn select_store(&self, store_id: StoreId) -> Result<Option<String>, ApiError> {
        self.set_delivery(store_id).await?;
        self.set_store(store_id).await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List the categories of the selected store.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        let url = self.catalog_url("/v1/catalog/categories");
        let response: CategoriesResponse = self.send(reqwest::Method::GET, &url, None).await?;
        Ok(response.categories)
    }

    /// First page of a category, most popular first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn get_catalog_items(
        &self,
        category_id: CategoryId,
    ) -> Result<CatalogPage, ApiError> {
        let url = self.catalog_url("/v1/catalog/items");
        let body = serde_json::json!({
            "categoryId": category_id,
            "filters": {
                "multicheckbox": [],
                "checkbox": [],
                "range": []
            },
            "sort": {
                "type": "popular",
                "order": "desc"
            },
            "limit": PAGE_SIZE,
            "offset": 0
        });

        let page: CatalogPage = self.send(reqwest::Method::POST, &url, Some(&body)).await?;
        debug!(items = page.items.len(), total = page.total, "received catalog page");
        Ok(page)
    }

    /// Full detail of a single item.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn get_catalog_item(&self, item_id: ItemId) -> Result<ItemDetail, ApiError> {
        let url = self.catalog_url(&format!("/v1/catalog/items/{item_id}"));
        self.send(reqwest::Method::GET, &url, None).await
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("site_url", &self.inner.config.site_url)
            .field("catalog_url", &self.inner.config.catalog_url)
            .field("device_id", &self.inner.credentials.device_id)
            .finish_non_exhaustive()
    }
}

/// Store address from a `pickupStoreSelectedSet` reply, if it carries one.
fn confirmed_address(response: &str) -> Option<String> {
    serde_json::from_str::<RpcResponse<SelectedStore>>(response)
        .ok()?
        .result?
        .address_full
}

/// JSON-RPC 2.0 request body; the id is the current time in milliseconds.
fn rpc_body(method: &str, params: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "id": Utc::now().timestamp_millis(),
        "params": params
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_body_shape() {
        let body = rpc_body("deliveryModeSet", serde_json::json!({ "storeId": 1453 }));
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["method"], "deliveryModeSet");
        assert_eq!(body["params"]["storeId"], 1453);
        assert!(body["id"].is_i64());
    }

    #[test]
    fn test_confirmed_address() {
        let address = "Москва, Ленинградское ш., 1";
        let reply = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "addressFull": address },
        })
        .to_string();
        assert_eq!(confirmed_address(&reply).as_deref(), Some(address));
        assert_eq!(confirmed_address(r#"{"jsonrpc": "2.0", "id": 1, "result": {}}"#), None);
        assert_eq!(confirmed_address(""), None);
        assert_eq!(confirmed_address("OK"), None);
    }

    #[tokio::test]
    async fn test_new_client_has_no_session() {
        let client = CatalogClient::new(ClientConfig::default()).expect("client");
        assert!(!client.has_session().await);
        assert!(format!("{client:?}").contains("device_id: \"A-"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let client = CatalogClient::new(ClientConfig::default()).expect("client");
        let debug = format!("{client:?}");
        assert!(debug.contains("device_id"));
        assert!(!debug.contains("b4fad1ebab4532185b653330d593b472"));
    }
}
