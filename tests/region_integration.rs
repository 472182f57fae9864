//! Integration tests for the region resolver with Wiremock
//!
//! Drives the reqwest-backed resolver against mock HTTP servers with real
//! delays for the timeout and retry scenarios.

use region_client::adapters::outbound::{
    DashMapRegionStore, DashMapTelemetry, ManualClock, ReqwestFetcher, SqliteRegionStore,
    SystemClock,
};
use region_client::{
    Clock, CountryCode, FetchOutcome, FetchResult, RegionConfig, RegionError, RegionService,
    RegionStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESPONSE_DELAY: Duration = Duration::from_millis(500);
const RESPONSE_TIMEOUT: Duration = Duration::from_millis(100);

fn config(region_url: &str) -> RegionConfig {
    RegionConfig {
        region_url: region_url.to_string(),
        location_url: None,
        update_interval: Duration::from_secs(3600),
        retry_timeout: Duration::ZERO,
        request_timeout: RESPONSE_TIMEOUT,
        max_attempts: 4,
    }
}

fn service_with(
    config: RegionConfig,
    store: Arc<dyn RegionStore>,
    clock: Arc<dyn Clock>,
) -> (RegionService, Arc<DashMapTelemetry>) {
    let telemetry = Arc::new(DashMapTelemetry::new());
    let service = RegionService::new(
        config,
        Arc::new(ReqwestFetcher::new()),
        store,
        telemetry.clone(),
        clock,
    );
    (service, telemetry)
}

fn service(config: RegionConfig) -> (RegionService, Arc<DashMapTelemetry>) {
    service_with(
        config,
        Arc::new(DashMapRegionStore::new()),
        Arc::new(SystemClock),
    )
}

fn region_body(code: &str) -> serde_json::Value {
    serde_json::json!({ "country_code": code })
}

fn data_url(code: &str) -> String {
    format!(r#"data:application/json,{{"country_code": "{}"}}"#, code)
}

/// Region service answers with a JSON country code
#[tokio::test]
async fn test_basic_fetch_notifies_subscribers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(region_body("UK")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (service, telemetry) = service(config(&format!("{}/", mock_server.uri())));

    let notified = Arc::new(parking_lot::Mutex::new(None));
    let slot = notified.clone();
    service.subscribe(move |region| *slot.lock() = Some(region.clone()));

    let outcome = service.fetch_region().await;

    let uk = CountryCode::parse("UK").unwrap();
    assert_eq!(outcome, FetchOutcome::Success(uk.clone()));
    assert_eq!(service.home(), Some(uk.clone()));
    assert_eq!(*notified.lock(), Some(uk));
    assert_eq!(telemetry.fetch_result_count(FetchResult::Success), 1);
}

/// Unreachable endpoint is classified as no result
#[tokio::test]
async fn test_invalid_url() {
    let (service, telemetry) = service(config("http://localhost:0"));

    let outcome = service.fetch_region().await;

    assert_eq!(outcome, FetchOutcome::Failed(FetchResult::NoResult));
    assert_eq!(service.home(), None);
    assert_eq!(telemetry.snapshot(), [0, 1, 0]);
}

/// Truncated JSON is classified as no result
#[tokio::test]
async fn test_invalid_json() {
    let (service, telemetry) = service(config(r#"data:application/json,{"country_code""#));

    let outcome = service.fetch_region().await;

    assert_eq!(outcome, FetchOutcome::Failed(FetchResult::NoResult));
    assert_eq!(telemetry.snapshot(), [0, 1, 0]);
}

/// Non-2xx status is classified as no result and retried
#[tokio::test]
async fn test_server_error_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(4)
        .mount(&mock_server)
        .await;

    let (service, telemetry) = service(config(&mock_server.uri()));

    let outcome = service.fetch_region().await;

    assert_eq!(outcome, FetchOutcome::Failed(FetchResult::NoResult));
    assert_eq!(service.retry_count(), 4);
    assert_eq!(telemetry.total_fetch_results(), 1);
}

/// Response slower than the request deadline is classified as timeout
#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(region_body("UK"))
                .set_delay(RESPONSE_DELAY),
        )
        .mount(&mock_server)
        .await;

    let (service, telemetry) = service(config(&mock_server.uri()));

    let outcome = service.fetch_region().await;

    assert_eq!(outcome, FetchOutcome::Failed(FetchResult::Timeout));
    assert_eq!(service.home(), None);
    assert_eq!(telemetry.snapshot(), [0, 0, 1]);
}

/// Every attempt times out: four requests, home untouched, one outcome
#[tokio::test]
async fn test_max_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(RESPONSE_DELAY))
        .expect(4)
        .mount(&mock_server)
        .await;

    let (service, telemetry) = service(RegionConfig {
        retry_timeout: RESPONSE_TIMEOUT,
        ..config(&mock_server.uri())
    });

    let outcome = service.fetch_region().await;

    assert_eq!(outcome, FetchOutcome::Failed(FetchResult::Timeout));
    assert_eq!(service.home(), None);
    assert_eq!(telemetry.total_fetch_results(), 1);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
}

/// First attempt times out, second succeeds
#[tokio::test]
async fn test_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(RESPONSE_DELAY))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(region_body("UK")))
        .mount(&mock_server)
        .await;

    let (service, telemetry) = service(RegionConfig {
        retry_timeout: RESPONSE_TIMEOUT,
        ..config(&mock_server.uri())
    });

    let outcome = service.fetch_region().await;

    assert_eq!(outcome, FetchOutcome::Success(CountryCode::parse("UK").unwrap()));
    assert_eq!(service.retry_count(), 0);
    assert_eq!(telemetry.snapshot(), [1, 0, 0]);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

/// Region is only refreshed once the update interval has elapsed
#[tokio::test]
async fn test_update_interval() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(region_body("FR")))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(region_body("DE")))
        .mount(&mock_server)
        .await;

    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let (service, telemetry) = service_with(
        RegionConfig {
            update_interval: Duration::from_secs(1),
            ..config(&mock_server.uri())
        },
        Arc::new(DashMapRegionStore::new()),
        clock.clone(),
    );

    service.fetch_region().await;
    assert_eq!(service.home(), CountryCode::parse("FR"));

    assert_eq!(service.fetch_region().await, FetchOutcome::Skipped);
    assert_eq!(service.fetch_region().await, FetchOutcome::Skipped);
    assert_eq!(service.home(), CountryCode::parse("FR"));

    clock.advance(Duration::from_secs(1));
    assert_eq!(
        service.fetch_region().await,
        FetchOutcome::Success(CountryCode::parse("DE").unwrap())
    );
    assert_eq!(service.home(), CountryCode::parse("DE"));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(telemetry.fetch_result_count(FetchResult::Success), 2);
}

/// A region persisted in SQLite is restored by a new resolver
#[tokio::test]
async fn test_region_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("region.db");
    let clock = Arc::new(ManualClock::new(1_700_000_000));

    {
        let store = Arc::new(SqliteRegionStore::open(&db_path).unwrap());
        let (service, _) = service_with(config(&data_url("AU")), store, clock.clone());
        assert!(service.fetch_region().await.is_success());
    }

    let store = Arc::new(SqliteRegionStore::open(&db_path).unwrap());
    let (service, _) = service_with(config("http://localhost:0"), store, clock.clone());
    service.restore().await;

    assert_eq!(service.home(), CountryCode::parse("AU"));
    assert_eq!(service.last_update(), Some(1_700_000_000));

    // First call of the new process still goes to the network
    assert_eq!(
        service.fetch_region().await,
        FetchOutcome::Failed(FetchResult::NoResult)
    );
    assert_eq!(service.home(), CountryCode::parse("AU"));
}

/// Concurrent callers share a single network sequence
#[tokio::test]
async fn test_concurrent_fetches_single_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(region_body("UK"))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let (service, telemetry) = service(RegionConfig {
        request_timeout: Duration::from_secs(5),
        ..config(&mock_server.uri())
    });

    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    service.subscribe(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    let (a, b, c) = tokio::join!(
        service.fetch_region(),
        service.fetch_region(),
        service.fetch_region()
    );

    assert!(a.is_success() && b.is_success() && c.is_success());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(telemetry.total_fetch_results(), 1);
}

/// Location lookup decodes the position record
#[tokio::test]
async fn test_location() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "location": { "lat": -1, "lng": 1 },
            "accuracy": 100
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (service, telemetry) = service(RegionConfig {
        location_url: Some(format!("{}/geo", mock_server.uri())),
        ..config("http://localhost:0")
    });

    let location = service.get_location().await.unwrap();

    assert_eq!(location.latitude, -1.0);
    assert_eq!(location.longitude, 1.0);
    assert_eq!(location.accuracy_meters, 100.0);
    assert_eq!(telemetry.total_fetch_results(), 0);
    assert_eq!(service.home(), None);
}

/// Location lookup is a single attempt bounded by the request deadline
#[tokio::test]
async fn test_location_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(RESPONSE_DELAY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (service, _) = service(RegionConfig {
        location_url: Some(mock_server.uri()),
        ..config("http://localhost:0")
    });

    let err = service.get_location().await.unwrap_err();
    assert!(matches!(err, RegionError::Timeout));
}
