//! Full discovery, match, enrich and write cycle against the mock backend.

use std::time::Duration;

use crosscity_client::{CatalogClient, RetryPolicy};
use crosscity_core::{Brand, ItemId};
use crosscity_integration_tests::{MockBackend, RunningMock, catalog_item};
use crosscity_matcher::{
    JsonFileWriter, MatchError, Matcher, MatcherConfig, Pacing, ResultWriter, StorePick, Strategy,
};
use rust_decimal::Decimal;
use serde_json::Value;

const MOSCOW: i64 = 1453;
const PITER: i64 = 2072;

fn listing(ids: std::ops::RangeInclusive<i64>) -> Vec<Value> {
    ids.map(|id| catalog_item(id, &format!("Товар {id}"), 5, 10_000 + id, 20_000 + id))
        .collect()
}

/// One hypermarket per city, one shared category: 150 and 120 items, 110 shared.
fn two_city_backend(failing_details: u32) -> MockBackend {
    MockBackend::new()
        .store(MOSCOW, "Москва, Ленинградское ш., 1", "HM")
        .store(77, "Москва, ул. Арбат, 7", "SM")
        .store(PITER, "Санкт-Петербург, Пулковское ш., 2", "HM")
        .category(MOSCOW, 11, "moloko-syr-yajca", 1)
        .category(PITER, 21, "moloko-syr-yajca", 1)
        .items(MOSCOW, 11, listing(1..=150))
        .items(PITER, 21, listing(41..=160))
        .brand(41, "Простоквашино")
        .failing_details(failing_details, 429)
}

async fn two_city_mock(failing_details: u32) -> RunningMock {
    two_city_backend(failing_details)
        .start()
        .await
        .expect("mock backend")
}

fn config() -> MatcherConfig {
    MatcherConfig {
        strategy: Strategy::SinglePass,
        store_pick: StorePick::First,
        pacing: Pacing::none(),
        brand_retry: RetryPolicy {
            max_attempts: 7,
            backoff_factor: 2,
            unit: Duration::from_millis(1),
        },
        ..MatcherConfig::default()
    }
}

#[tokio::test]
async fn test_single_pass_end_to_end() {
    let mock = two_city_mock(0).await;
    let client = CatalogClient::new(mock.client_config()).expect("client");

    let products = Matcher::new(client, config()).run().await.expect("run");

    assert_eq!(products.len(), 110);
    let ids: Vec<i64> = products.iter().map(|p| p.id.as_i64()).collect();
    assert_eq!(ids, (41..=150).collect::<Vec<_>>());

    let first = products.first().expect("first");
    assert_eq!(first.id, ItemId::new(41));
    assert_eq!(first.name, "Товар 41");
    assert_eq!(first.brand, Brand::Named("Простоквашино".into()));
    assert_eq!(first.promo_price, Decimal::new(10_041, 2));
    assert_eq!(first.regular_price, Decimal::new(20_041, 2));

    let last = products.last().expect("last");
    assert_eq!(last.brand, Brand::Unbranded);
    assert_eq!(last.promo_price, Decimal::new(10_150, 2));

    assert_eq!(mock.session_requests(), 1);
    assert_eq!(mock.count("/v1/catalog/items/{id}"), 110);
}

#[tokio::test]
async fn test_exhaustive_end_to_end() {
    let mock = two_city_mock(0).await;
    let client = CatalogClient::new(mock.client_config()).expect("client");
    let config = MatcherConfig {
        strategy: Strategy::Exhaustive,
        ..config()
    };

    let products = Matcher::new(client, config).run().await.expect("run");

    assert_eq!(products.len(), 110);
}

#[tokio::test]
async fn test_run_accepts_empty_store_selection_replies() {
    let mock = two_city_backend(0)
        .empty_rpc_replies()
        .start()
        .await
        .expect("mock backend");
    let client = CatalogClient::new(mock.client_config()).expect("client");

    let products = Matcher::new(client, config()).run().await.expect("run");

    assert_eq!(products.len(), 110);
    // categories: A, B; listings: A, B
    assert_eq!(mock.count("/jrpc/deliveryModeSet"), 4);
}

#[tokio::test]
async fn test_brand_lookup_retries_rate_limits() {
    let mock = two_city_mock(3).await;
    let client = CatalogClient::new(mock.client_config()).expect("client");

    let products = Matcher::new(client, config()).run().await.expect("run");

    assert_eq!(
        products.first().map(|p| p.brand.clone()),
        Some(Brand::Named("Простоквашино".into()))
    );
    assert_eq!(mock.count("/v1/catalog/items/{id}"), 113);
}

#[tokio::test]
async fn test_exhausted_brand_lookup_is_unknown() {
    let mock = two_city_mock(7).await;
    let client = CatalogClient::new(mock.client_config()).expect("client");

    let products = Matcher::new(client, config()).run().await.expect("run");

    assert_eq!(products.len(), 110);
    assert_eq!(products.first().map(|p| p.brand.clone()), Some(Brand::Unknown));
    assert_eq!(
        products.get(1).map(|p| p.brand.clone()),
        Some(Brand::Unbranded)
    );
}

#[tokio::test]
async fn test_market_type_filter_leaves_city_without_store() {
    let mock = two_city_mock(0).await;
    let client = CatalogClient::new(mock.client_config()).expect("client");
    let config = MatcherConfig {
        market_type: Some("SM".to_string()),
        ..config()
    };

    let err = Matcher::new(client, config)
        .run()
        .await
        .expect_err("no SM in second city");
    let piter = "Санкт-Петербург";
    assert!(matches!(err, MatchError::NoStores { ref city } if city == piter));
}

#[tokio::test]
async fn test_results_written_as_json() {
    let mock = two_city_mock(0).await;
    let client = CatalogClient::new(mock.client_config()).expect("client");
    let products = Matcher::new(client, config()).run().await.expect("run");

    let path = std::env::temp_dir().join(format!("crosscity-e2e-{}.json", uuid::Uuid::new_v4()));
    JsonFileWriter::new(&path).write(&products).expect("write");
    let text = std::fs::read_to_string(&path).expect("read");
    std::fs::remove_file(&path).ok();

    let written: Vec<Value> = serde_json::from_str(&text).expect("json");
    assert_eq!(written.len(), 110);
    let first = written.first().expect("first record");
    assert_eq!(first["id"], 41);
    assert_eq!(first["name"], "Товар 41");
    assert_eq!(first["brand"], "Простоквашино");
    assert_eq!(first["regular_price"], 200.41);
    assert_eq!(first["promo_price"], 100.41);
    assert!(text.contains("    {\n        \"id\": 41"));
}
