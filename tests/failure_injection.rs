//! Failure injection tests for the facade.

use std::sync::Arc;
use std::time::Duration;

use storefront_facade::config::{AppConfig, FaultConfig};
use storefront_facade::facade::{LatencyModel, NoFaults, Operation, OperationContext, ProbabilisticFaults};
use storefront_facade::model::{EntityKind, NewProduct, NewUser};
use storefront_facade::observability::{MemorySink, SinkEvent, Telemetry};
use storefront_facade::{Api, ApiError};

mod common;

#[tokio::test]
async fn test_user_delete_failure_rate_matches_probability() {
    let p = 0.3;
    let mut faults = FaultConfig::default();
    faults.users.delete = p;

    let api = Api::builder()
        .latency(LatencyModel::none())
        .fault_policy(ProbabilisticFaults::new(faults))
        .build();

    let trials = 2000;
    let mut failures = 0;
    for i in 0..trials {
        // Delete a freshly created user so only injected faults can fail.
        let created = api
            .users
            .create(NewUser {
                name: format!("user-{i}"),
                email: format!("user-{i}@example.com"),
                role: "user".into(),
            })
            .await
            .unwrap()
            .into_data();
        match api.users.delete(created.id).await {
            Ok(_) => {}
            Err(ApiError::SimulatedFailure { .. }) => failures += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let observed = failures as f64 / trials as f64;
    assert!(
        (observed - p).abs() < 0.05,
        "observed failure rate {observed} too far from {p}"
    );
}

#[tokio::test]
async fn test_other_operations_never_fail_by_default() {
    let api = Api::builder()
        .latency(LatencyModel::none())
        .fault_policy(ProbabilisticFaults::new(FaultConfig::default()))
        .build();

    for _ in 0..200 {
        assert!(api.products.get_all().await.is_ok());
        assert!(api.orders.get_by_id(1).await.is_ok());
    }
}

#[tokio::test]
async fn test_error_event_emitted_before_caller_sees_failure() {
    let sink = Arc::new(MemorySink::new());
    let api = Api::builder()
        .latency(LatencyModel::none())
        .fault_policy(|ctx: &OperationContext| ctx.operation == Operation::Create)
        .telemetry(Arc::new(Telemetry::with_sink(sink.clone())))
        .build();

    let draft = NewProduct {
        name: "Monitor".into(),
        description: "27 inch".into(),
        price: 329.0,
        category: "Electronics".into(),
        stock: 4,
    };
    let err = api.products.create(draft).await.unwrap_err();

    assert_eq!(err.to_string(), "Simulated API Error: Something went wrong!");
    assert_eq!(sink.len(), 2);

    let events = sink.events();
    match &events[1] {
        SinkEvent::Error(report) => {
            assert_eq!(report.message, "API Error: 500 /products - Simulated API Error: Something went wrong!");
            assert_eq!(report.attributes["code"], "SIMULATED_FAILURE");
            assert_eq!(report.attributes["entity"], "product");
            assert_eq!(report.attributes["operation"], "create");
        }
        other => panic!("expected error event, got {other:?}"),
    }

    // Nothing was inserted.
    assert_eq!(api.products.store().len(), 3);
}

#[tokio::test]
async fn test_fault_policy_sees_target() {
    let api = Api::builder()
        .latency(LatencyModel::none())
        .fault_policy(|ctx: &OperationContext| ctx.entity == EntityKind::Order && ctx.target == Some(2))
        .build();

    assert!(api.orders.get_by_id(1).await.is_ok());
    assert!(matches!(
        api.orders.get_by_id(2).await,
        Err(ApiError::SimulatedFailure { .. })
    ));
}

#[tokio::test]
async fn test_not_found_reported_to_sink() {
    let sink = Arc::new(MemorySink::new());
    let api = common::quiet_api(sink.clone());

    let err = api.orders.delete(77).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].label(), "API Error: 404 /orders/77 - order 77 not found");
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_call_emits_only_cancelled_event() {
    let sink = Arc::new(MemorySink::new());
    let api = Api::builder()
        .latency(LatencyModel::fixed(Duration::from_millis(800)))
        .fault_policy(NoFaults)
        .telemetry(Arc::new(Telemetry::with_sink(sink.clone())))
        .build();

    let token = tokio_util::sync::CancellationToken::new();
    token.cancel();

    let err = api.products.cancel_on(token).get_all().await.unwrap_err();
    assert!(matches!(err, ApiError::Cancelled { ref operation } if operation == "GET /products"));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].label(), "API Request");
    assert_eq!(events[1].label(), "API Request Cancelled");
    assert!(!events.iter().any(SinkEvent::is_error));
}

#[tokio::test]
async fn test_reloaded_config_changes_fault_rate() {
    let api = Api::builder().latency(LatencyModel::none()).build();

    let mut config = AppConfig::default();
    config.latency.min_ms = 0;
    config.latency.max_ms = 0;
    config.faults.users.delete = 0.0;
    config.faults.products.get_all = 1.0;
    api.reconfigure(&config);

    assert!(api.products.get_all().await.is_err());
    assert!(api.users.delete(3).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_reconfigure_applies_only_to_calls_started_after() {
    let api = Api::builder()
        .latency(LatencyModel::fixed(Duration::from_secs(1)))
        .fault_policy(NoFaults)
        .build();

    let in_flight = {
        let api = api.clone();
        tokio::spawn(async move {
            api.users
                .create(NewUser {
                    name: "Early".into(),
                    email: "early@example.com".into(),
                    role: "user".into(),
                })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut config = AppConfig::default();
    config.latency.min_ms = 0;
    config.latency.max_ms = 0;
    config.faults.users.create = 1.0;
    api.reconfigure(&config);

    assert!(in_flight.await.unwrap().is_ok());

    let late = api
        .users
        .create(NewUser {
            name: "Late".into(),
            email: "late@example.com".into(),
            role: "user".into(),
        })
        .await;
    assert!(matches!(late, Err(ApiError::SimulatedFailure { .. })));
}
