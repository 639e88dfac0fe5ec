//! Delivery of sink records to a telemetry collector.

use std::sync::Arc;
use std::time::Duration;

use storefront_facade::config::ObservabilityConfig;
use storefront_facade::facade::{LatencyModel, NoFaults};
use storefront_facade::lifecycle::Shutdown;
use storefront_facade::observability::collector::{CollectorSettings, CollectorSink};
use storefront_facade::observability::{telemetry, Telemetry};
use storefront_facade::Api;

mod common;

fn no_proxy_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_facade_records_reach_collector() {
    let (addr, mut bodies) = common::start_mock_collector().await;

    let config = ObservabilityConfig {
        environment: "test".into(),
        batch_size: 100,
        flush_interval_ms: 60_000,
        ..Default::default()
    };
    let settings = CollectorSettings::from_config(&format!("http://{addr}/collect"), &config).unwrap();
    let shutdown = Shutdown::new();
    let (sink, worker) = CollectorSink::spawn(settings, no_proxy_client(), shutdown.subscribe()).unwrap();

    let api = Api::builder()
        .latency(LatencyModel::none())
        .fault_policy(NoFaults)
        .telemetry(Arc::new(Telemetry::with_sink(Arc::new(sink))))
        .build();
    api.products.get_all().await.unwrap();
    assert!(api.orders.delete(404).await.is_err());

    // Below batch size and interval: only the shutdown flush ships them.
    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .unwrap()
        .unwrap();

    let body = tokio::time::timeout(Duration::from_secs(5), bodies.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(body["meta"]["app"]["environment"], "test");
    assert!(body["meta"]["session"]["id"].is_string());

    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0]["kind"], "log");
    assert_eq!(events[0]["fields"][0], "API Request");
    assert_eq!(events[1]["fields"][0], "API Response Success");
    assert_eq!(events[3]["kind"], "error");
    assert_eq!(events[3]["attributes"]["code"], "NOT_FOUND");
    assert!(events.iter().all(|e| e["timestamp"].is_string()));
}

#[tokio::test]
async fn test_full_batch_is_flushed_immediately() {
    let (addr, mut bodies) = common::start_mock_collector().await;

    let config = ObservabilityConfig {
        batch_size: 2,
        flush_interval_ms: 60_000,
        ..Default::default()
    };
    let settings = CollectorSettings::from_config(&format!("http://{addr}/collect"), &config).unwrap();
    let shutdown = Shutdown::new();
    let (sink, _worker) = CollectorSink::spawn(settings, no_proxy_client(), shutdown.subscribe()).unwrap();

    let api = Api::builder()
        .latency(LatencyModel::none())
        .fault_policy(NoFaults)
        .telemetry(Arc::new(Telemetry::with_sink(Arc::new(sink))))
        .build();
    api.users.get_by_id(1).await.unwrap();

    let body = tokio::time::timeout(Duration::from_secs(5), bodies.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(body["events"].as_array().unwrap().len(), 2);

    shutdown.trigger();
}

#[tokio::test]
async fn test_missing_collector_url_keeps_current_sink() {
    let telemetry = Arc::new(Telemetry::new());
    let guard = telemetry::init_with(telemetry.clone(), &ObservabilityConfig::default());
    assert!(!guard.is_collecting());
    guard.shutdown(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_invalid_collector_url_is_not_fatal() {
    let config = ObservabilityConfig {
        collector_url: Some("not a url".into()),
        ..Default::default()
    };
    let guard = telemetry::init_with(Arc::new(Telemetry::new()), &config);
    assert!(!guard.is_collecting());
}
