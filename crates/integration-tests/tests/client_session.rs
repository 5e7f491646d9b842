//! Session and signing behaviour of `CatalogClient` against the mock backend.

use crosscity_client::session::SESSION_PATH;
use crosscity_client::{ApiError, CatalogClient, sign};
use crosscity_core::StoreId;
use crosscity_integration_tests::MockBackend;

const SIGNING_SALT: &str = "b4fad1ebab4532185b653330d593b472";

async fn mock() -> crosscity_integration_tests::RunningMock {
    MockBackend::new()
        .store(1, "Москва, Ленинградское ш., 1", "HM")
        .store(2, "Санкт-Петербург, Пулковское ш., 2", "HM")
        .category(1, 11, "milk", 1)
        .start()
        .await
        .expect("mock backend")
}

#[tokio::test]
async fn test_session_is_requested_once() {
    let mock = mock().await;
    let client = CatalogClient::new(mock.client_config()).expect("client");

    assert!(!client.has_session().await);
    let first = client.get_stores().await.expect("stores");
    let second = client.get_stores().await.expect("stores");

    assert_eq!(first.items.len(), 2);
    assert_eq!(second.items.len(), 2);
    assert_eq!(second.metadata.get("total"), Some(&serde_json::json!(2)));
    assert!(client.has_session().await);
    assert_eq!(mock.session_requests(), 1);
}

#[tokio::test]
async fn test_session_is_refetched_after_invalidation() {
    let mock = mock().await;
    let client = CatalogClient::new(mock.client_config()).expect("client");

    client.get_stores().await.expect("stores");
    client.invalidate_session().await;
    client.get_stores().await.expect("stores");

    assert_eq!(mock.session_requests(), 2);

    let tokens: Vec<Option<String>> = mock
        .requests()
        .into_iter()
        .filter(|r| r.path == "/v1/stores/pickup/search")
        .map(|r| r.session_token)
        .collect();
    assert_eq!(
        tokens,
        vec![Some("session-1".to_string()), Some("session-2".to_string())]
    );
}

#[tokio::test]
async fn test_every_request_is_signed() {
    let mock = mock().await;
    let client = CatalogClient::new(mock.client_config()).expect("client");

    client.select_store(StoreId::new(1)).await.expect("select");
    client.get_categories().await.expect("categories");

    let base = mock.base_url();
    let requests = mock.requests();
    assert_eq!(requests.len(), 4);

    for request in requests {
        let timestamp: i64 = request
            .timestamp
            .as_deref()
            .expect("timestamp header")
            .parse()
            .expect("numeric timestamp");
        let expected = sign(SIGNING_SALT, &format!("{base}{}", request.path), timestamp);
        assert_eq!(request.qrator_token, Some(expected.token), "{}", request.path);

        // only the bootstrap call goes out without a session
        assert_eq!(request.session_token.is_none(), request.path == SESSION_PATH);
    }
}

#[tokio::test]
async fn test_select_store_returns_confirmed_address() {
    let mock = mock().await;
    let client = CatalogClient::new(mock.client_config()).expect("client");

    let address = client.select_store(StoreId::new(2)).await.expect("select");

    assert_eq!(address.as_deref(), Some("Санкт-Петербург, Пулковское ш., 2"));
    assert_eq!(mock.count("/jrpc/deliveryModeSet"), 1);
    assert_eq!(mock.count("/jrpc/pickupStoreSelectedSet"), 1);
}

#[tokio::test]
async fn test_select_store_accepts_empty_success_reply() {
    let mock = MockBackend::new()
        .store(1, "Москва, Ленинградское ш., 1", "HM")
        .category(1, 11, "milk", 1)
        .empty_rpc_replies()
        .start()
        .await
        .expect("mock backend");
    let client = CatalogClient::new(mock.client_config()).expect("client");

    let address = client.select_store(StoreId::new(1)).await.expect("select");
    assert_eq!(address, None);

    let categories = client.get_categories().await.expect("categories");
    assert_eq!(categories.len(), 1);
    assert_eq!(mock.count("/jrpc/deliveryModeSet"), 1);
    assert_eq!(mock.count("/jrpc/pickupStoreSelectedSet"), 1);
}

#[tokio::test]
async fn test_non_success_status_is_propagated() {
    let mock = mock().await;
    let client = CatalogClient::new(mock.client_config()).expect("client");

    let err = client
        .select_store(StoreId::new(99))
        .await
        .expect_err("unknown store");
    assert!(matches!(err, ApiError::Status { status: 404, ref body } if body == "unknown store"));

    // categories are scoped to a selected store
    let err = client
        .get_categories()
        .await
        .expect_err("no store selected");
    assert_eq!(err.status(), Some(400));
}
