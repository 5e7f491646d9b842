//! Integration tests for crosscity.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p crosscity-integration-tests
//! ```
//!
//! The tests start an in-process mock of both backend endpoints (session
//! bootstrap, JSON-RPC store selection, store search, categories and catalog
//! items) on an ephemeral port and point a real `CatalogClient` at it. No
//! network access is needed.
//!
//! Like the real backend, the mock scopes category and catalog calls to the
//! store selected last and rejects calls without a session token.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use crosscity_client::ClientConfig;
use crosscity_client::session::SESSION_PATH;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub qrator_token: Option<String>,
    pub timestamp: Option<String>,
    pub session_token: Option<String>,
}

/// Builder for the mock backend's catalog.
#[derive(Debug, Default)]
pub struct MockBackend {
    stores: Vec<Value>,
    categories: HashMap<i64, Vec<Value>>,
    pages: HashMap<(i64, i64), Vec<Value>>,
    brands: HashMap<i64, String>,
    detail_failures: u32,
    detail_failure_status: u16,
    empty_rpc_replies: bool,
}

impl MockBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn store(mut self, id: i64, address: &str, market_type: &str) -> Self {
        self.stores.push(json!({
            "id": id,
            "addressFull": address,
            "marketType": market_type,
            "name": format!("Гипермаркет {id}"),
        }));
        self
    }

    #[must_use]
    pub fn category(mut self, store_id: i64, id: i64, slug: &str, level: u32) -> Self {
        self.categories.entry(store_id).or_default().push(json!({
            "id": id,
            "name": slug,
            "slug": slug,
            "level": level,
        }));
        self
    }

    /// Listing of a category at a store; the total equals the item count.
    #[must_use]
    pub fn items(mut self, store_id: i64, category_id: i64, items: Vec<Value>) -> Self {
        self.pages.insert((store_id, category_id), items);
        self
    }

    #[must_use]
    pub fn brand(mut self, item_id: i64, brand: &str) -> Self {
        self.brands.insert(item_id, brand.to_string());
        self
    }

    /// Fail the next `count` item detail requests with `status`.
    #[must_use]
    pub const fn failing_details(mut self, count: u32, status: u16) -> Self {
        self.detail_failures = count;
        self.detail_failure_status = status;
        self
    }

    /// Answer both store selection calls with an empty `200 OK` body.
    #[must_use]
    pub const fn empty_rpc_replies(mut self) -> Self {
        self.empty_rpc_replies = true;
        self
    }

    /// Serve the mock on an ephemeral local port.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(self) -> std::io::Result<RunningMock> {
        let state = Arc::new(MockState {
            stores: self.stores,
            categories: self.categories,
            pages: self.pages,
            brands: self.brands,
            detail_failures: AtomicU32::new(self.detail_failures),
            detail_failure_status: self.detail_failure_status,
            empty_rpc_replies: self.empty_rpc_replies,
            session_requests: AtomicU32::new(0),
            issued_tokens: Mutex::new(Vec::new()),
            selected: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        });

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(RunningMock {
            addr,
            state,
            server,
        })
    }
}

/// A running mock backend. The server stops when this is dropped.
pub struct RunningMock {
    addr: SocketAddr,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl RunningMock {
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration with both endpoints pointed at the mock.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default().with_base_url(&self.base_url())
    }

    /// Number of session bootstrap calls received.
    #[must_use]
    pub fn session_requests(&self) -> u32 {
        self.state.session_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }

    /// Number of requests received for `path`.
    #[must_use]
    pub fn count(&self, path: &str) -> usize {
        lock(&self.state.requests)
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

impl Drop for RunningMock {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A catalog listing entry.
#[must_use]
pub fn catalog_item(id: i64, name: &str, count: i64, cost: i64, cost_regular: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "count": count,
        "features": { "isBlockedForSale": false },
        "prices": { "cost": cost, "costRegular": cost_regular },
    })
}

// =============================================================================
// Server
// =============================================================================

struct MockState {
    stores: Vec<Value>,
    categories: HashMap<i64, Vec<Value>>,
    pages: HashMap<(i64, i64), Vec<Value>>,
    brands: HashMap<i64, String>,
    detail_failures: AtomicU32,
    detail_failure_status: u16,
    empty_rpc_replies: bool,
    session_requests: AtomicU32,
    issued_tokens: Mutex<Vec<String>>,
    selected: Mutex<Option<i64>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

type SharedState = Arc<MockState>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route(SESSION_PATH, get(session))
        .route("/jrpc/deliveryModeSet", post(delivery_mode_set))
        .route("/jrpc/pickupStoreSelectedSet", post(pickup_store_selected_set))
        .route("/v1/stores/pickup/search", post(stores))
        .route("/v1/catalog/categories", get(categories))
        .route("/v1/catalog/items", post(items))
        .route("/v1/catalog/items/{id}", get(item))
        .with_state(state)
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

impl MockState {
    fn record(&self, path: &str, headers: &HeaderMap) {
        lock(&self.requests).push(RecordedRequest {
            path: path.to_string(),
            qrator_token: header(headers, "qrator-token"),
            timestamp: header(headers, "timestamp"),
            session_token: header(headers, "sessiontoken"),
        });
    }

    /// Record the request and check its session token.
    fn authorize(&self, path: &str, headers: &HeaderMap) -> Result<(), Response> {
        self.record(path, headers);
        let token = header(headers, "sessiontoken");
        let known = token.is_some_and(|t| lock(&self.issued_tokens).contains(&t));
        if known {
            Ok(())
        } else {
            Err((StatusCode::UNAUTHORIZED, "invalid session").into_response())
        }
    }

    fn selected_store(&self) -> Result<i64, Response> {
        lock(&self.selected)
            .ok_or_else(|| (StatusCode::BAD_REQUEST, "no store selected").into_response())
    }
}

async fn session(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record(SESSION_PATH, &headers);
    if !query
        .get("request")
        .is_some_and(|r| r.contains("siteSettingsGet"))
    {
        return (StatusCode::BAD_REQUEST, "missing request").into_response();
    }

    let n = state.session_requests.fetch_add(1, Ordering::SeqCst) + 1;
    let token = format!("session-{n}");
    lock(&state.issued_tokens).push(token.clone());
    Json(json!({ "Head": { "SessionToken": token } })).into_response()
}

fn store_id_param(body: &Value) -> Option<i64> {
    body.pointer("/params/storeId").and_then(Value::as_i64)
}

async fn delivery_mode_set(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = state.authorize("/jrpc/deliveryModeSet", &headers) {
        return rejection;
    }
    if store_id_param(&body).is_none() {
        return (StatusCode::BAD_REQUEST, "storeId required").into_response();
    }
    if state.empty_rpc_replies {
        return StatusCode::OK.into_response();
    }
    Json(json!({ "jsonrpc": "2.0", "id": body["id"], "result": {} })).into_response()
}

async fn pickup_store_selected_set(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = state.authorize("/jrpc/pickupStoreSelectedSet", &headers) {
        return rejection;
    }
    let Some(store_id) = store_id_param(&body) else {
        return (StatusCode::BAD_REQUEST, "storeId required").into_response();
    };
    let Some(store) = state.stores.iter().find(|s| s["id"] == store_id) else {
        return (StatusCode::NOT_FOUND, "unknown store").into_response();
    };

    *lock(&state.selected) = Some(store_id);
    if state.empty_rpc_replies {
        return StatusCode::OK.into_response();
    }
    Json(json!({
        "jsonrpc": "2.0",
        "id": body["id"],
        "result": { "addressFull": store["addressFull"] },
    }))
    .into_response()
}

async fn stores(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Err(rejection) = state.authorize("/v1/stores/pickup/search", &headers) {
        return rejection;
    }
    Json(json!({ "items": state.stores, "total": state.stores.len() })).into_response()
}

async fn categories(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Err(rejection) = state.authorize("/v1/catalog/categories", &headers) {
        return rejection;
    }
    let store_id = match state.selected_store() {
        Ok(id) => id,
        Err(rejection) => return rejection,
    };
    let categories = state.categories.get(&store_id).cloned().unwrap_or_default();
    Json(json!({ "categories": categories })).into_response()
}

async fn items(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = state.authorize("/v1/catalog/items", &headers) {
        return rejection;
    }
    let store_id = match state.selected_store() {
        Ok(id) => id,
        Err(rejection) => return rejection,
    };
    let Some(category_id) = body["categoryId"].as_i64() else {
        return (StatusCode::BAD_REQUEST, "categoryId required").into_response();
    };
    let limit = body["limit"]
        .as_u64()
        .and_then(|l| usize::try_from(l).ok())
        .unwrap_or(usize::MAX);

    let listing = state
        .pages
        .get(&(store_id, category_id))
        .cloned()
        .unwrap_or_default();
    let total = listing.len();
    let page: Vec<Value> = listing.into_iter().take(limit).collect();
    Json(json!({ "items": page, "total": total })).into_response()
}

async fn item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(rejection) = state.authorize("/v1/catalog/items/{id}", &headers) {
        return rejection;
    }

    let failing = state
        .detail_failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
        .is_ok();
    if failing {
        let status = StatusCode::from_u16(state.detail_failure_status)
            .unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
        return (status, "slow down").into_response();
    }

    let attributes = state.brands.get(&id).map_or_else(Vec::new, |brand| {
        vec![json!({ "alias": "brand", "name": "Бренд", "slug": "brand", "value": brand })]
    });
    Json(json!({ "id": id, "name": format!("Товар {id}"), "attributes": attributes }))
        .into_response()
}
