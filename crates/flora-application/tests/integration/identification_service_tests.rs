//! Identification service scenarios

use std::sync::Arc;
use std::time::Duration;

use flora_application::resilience::CircuitBreakerConfig;
use flora_application::use_cases::CachePolicy;
use flora_domain::error::Error;
use flora_domain::events::{DomainEvent, ResultOrigin};
use flora_domain::ports::EventBusProvider;
use flora_domain::value_objects::{
    CircuitStatus, Completeness, IdentificationPayload, ProviderFailure, ProviderFailureKind,
};
use flora_providers::events::TokioEventBusProvider;
use futures::StreamExt;

use crate::test_utils::{
    CountingCacheProvider, FailingCacheProvider, FailingLockProvider,
    MockIdentificationProvider, ServiceBuilder, primary_payload, request, secondary_payload,
};

fn healthy_pair() -> (Arc<MockIdentificationProvider>, Arc<MockIdentificationProvider>) {
    (
        MockIdentificationProvider::succeeding("plant_id", primary_payload()),
        MockIdentificationProvider::succeeding("plant_net", secondary_payload()),
    )
}

#[tokio::test]
async fn test_both_providers_succeed() {
    let (primary, secondary) = healthy_pair();
    let store = CountingCacheProvider::new();
    let service = ServiceBuilder::new(primary.clone(), secondary.clone())
        .store(store.clone())
        .build();

    let result = service.identify(&request(b"leaf-1")).await.expect("identified");

    assert_eq!(result.completeness, Completeness::Complete);
    assert!(result.plant_detected);
    let top = result.top_suggestion().expect("top suggestion");
    assert_eq!(top.scientific_name, "Monstera deliciosa");
    assert_eq!(top.taxonomy.order.as_deref(), Some("Alismatales"));
    assert_eq!(result.sources.len(), 2);
    assert!(result.sources.iter().all(|s| s.succeeded()));

    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn test_repeat_request_is_served_from_cache() {
    let (primary, secondary) = healthy_pair();
    let service = ServiceBuilder::new(primary.clone(), secondary.clone()).build();

    let first = service.identify(&request(b"leaf-1")).await.expect("first");
    let second = service.identify(&request(b"leaf-1")).await.expect("second");

    assert_eq!(first, second);
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
    assert_eq!(service.cache_stats().hits, 1);
}

#[tokio::test]
async fn test_primary_timeout_gives_partial_result() {
    let (primary, secondary) = healthy_pair();
    primary.set_delay(Duration::from_millis(500));
    let store = CountingCacheProvider::new();
    let service = ServiceBuilder::new(primary.clone(), secondary.clone())
        .store(store.clone())
        .timeout(Duration::from_millis(100))
        .build();

    let result = service.identify(&request(b"leaf-2")).await.expect("partial");

    assert_eq!(result.completeness, Completeness::Partial);
    assert_eq!(
        result.sources[0].failure.as_ref().map(|f| f.kind),
        Some(ProviderFailureKind::Timeout)
    );
    assert_eq!(
        result.top_suggestion().map(|s| s.scientific_name.as_str()),
        Some("monstera deliciosa")
    );

    let circuits = service.circuit_snapshots();
    assert_eq!(circuits[0].consecutive_failures, 1);
    assert_eq!(circuits[0].status, CircuitStatus::Closed);
    assert_eq!(circuits[1].consecutive_failures, 0);
    // partial results are cached with their own TTL
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn test_both_failing_is_service_unavailable() {
    let primary = MockIdentificationProvider::failing(
        "plant_id",
        ProviderFailure::server_error("502 Bad Gateway"),
    );
    let secondary = MockIdentificationProvider::failing(
        "plant_net",
        ProviderFailure::rate_limited("quota exceeded"),
    );
    let store = CountingCacheProvider::new();
    let service = ServiceBuilder::new(primary.clone(), secondary.clone())
        .store(store.clone())
        .build();

    let err = service.identify(&request(b"leaf-3")).await.expect_err("total failure");
    assert!(err.is_service_unavailable());
    let Error::TotalFailure { failures } = err else {
        panic!("expected total failure");
    };
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[1].failure.kind, ProviderFailureKind::RateLimited);

    assert_eq!(store.writes(), 0, "failures are never cached");

    service.identify(&request(b"leaf-3")).await.expect_err("still failing");
    assert_eq!(primary.calls(), 2);
    assert_eq!(secondary.calls(), 2);
}

#[tokio::test]
async fn test_open_circuit_skips_provider() {
    let primary = MockIdentificationProvider::failing(
        "plant_id",
        ProviderFailure::server_error("500"),
    );
    let secondary = MockIdentificationProvider::succeeding("plant_net", secondary_payload());
    let service = ServiceBuilder::new(primary.clone(), secondary.clone())
        .primary_circuit(CircuitBreakerConfig::new(1, Duration::from_secs(60), 2))
        .build();

    service.identify(&request(b"leaf-4")).await.expect("partial");
    assert_eq!(service.circuit_snapshots()[0].status, CircuitStatus::Open);

    let result = service.identify(&request(b"leaf-5")).await.expect("partial");
    assert_eq!(primary.calls(), 1, "open circuit must not reach the adapter");
    assert_eq!(
        result.sources[0].failure.as_ref().map(|f| f.kind),
        Some(ProviderFailureKind::CircuitOpen)
    );
    assert_eq!(service.circuit_snapshots()[0].rejected_calls, 1);
}

#[tokio::test]
async fn test_invalid_input_does_not_trip_circuit() {
    let primary = MockIdentificationProvider::failing(
        "plant_id",
        ProviderFailure::invalid_input("unsupported image"),
    );
    let secondary = MockIdentificationProvider::succeeding("plant_net", secondary_payload());
    let service = ServiceBuilder::new(primary.clone(), secondary)
        .primary_circuit(CircuitBreakerConfig::new(1, Duration::from_secs(60), 2))
        .build();

    service.identify(&request(b"leaf-6")).await.expect("partial");
    let snapshot = &service.circuit_snapshots()[0];
    assert_eq!(snapshot.status, CircuitStatus::Closed);
    assert_eq!(snapshot.total_failures, 0);
}

#[tokio::test]
async fn test_panicking_adapter_counts_as_server_error() {
    let primary = MockIdentificationProvider::panicking("plant_id");
    let secondary = MockIdentificationProvider::succeeding("plant_net", secondary_payload());
    let service = ServiceBuilder::new(primary, secondary).build();

    let result = service.identify(&request(b"leaf-7")).await.expect("partial");
    assert_eq!(
        result.sources[0].failure.as_ref().map(|f| f.kind),
        Some(ProviderFailureKind::ServerError)
    );
    assert_eq!(service.circuit_snapshots()[0].consecutive_failures, 1);
}

#[tokio::test]
async fn test_exhausted_pool_degrades_secondary() {
    let (primary, secondary) = healthy_pair();
    let service = ServiceBuilder::new(primary, secondary.clone())
        .pool_size(1)
        .build();

    let result = service.identify(&request(b"leaf-8")).await.expect("primary answered");
    assert_eq!(result.completeness, Completeness::Complete);
    assert_eq!(
        result.sources[1].failure.as_ref().map(|f| f.kind),
        Some(ProviderFailureKind::PoolExhausted)
    );
    assert_eq!(secondary.calls(), 0);
    assert_eq!(service.circuit_snapshots()[1].total_failures, 0);
    assert_eq!(service.pool_stats().rejected, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identical_requests_call_providers_once() {
    let (primary, secondary) = healthy_pair();
    primary.set_delay(Duration::from_millis(50));
    secondary.set_delay(Duration::from_millis(50));
    let service = Arc::new(ServiceBuilder::new(primary.clone(), secondary.clone()).build());

    let mut tasks = Vec::new();
    for _ in 0..50 {
        let service = Arc::clone(&service);
        tasks.push(tokio::spawn(async move {
            service.identify(&request(b"same-leaf")).await
        }));
    }

    for task in tasks {
        let result = task.await.expect("join").expect("identified");
        assert_eq!(result.completeness, Completeness::Complete);
    }
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_lock_store_outage_still_answers() {
    let (primary, secondary) = healthy_pair();
    let service = ServiceBuilder::new(primary, secondary)
        .locks(Arc::new(FailingLockProvider))
        .build();

    let result = service.identify(&request(b"leaf-9")).await.expect("direct fill");
    assert_eq!(result.completeness, Completeness::Complete);
    assert_eq!(service.cache_stats().direct_fills, 1);
}

#[tokio::test]
async fn test_cache_store_outage_still_answers() {
    let (primary, secondary) = healthy_pair();
    let service = ServiceBuilder::new(primary.clone(), secondary)
        .store(Arc::new(FailingCacheProvider))
        .build();

    service.identify(&request(b"leaf-10")).await.expect("first");
    service.identify(&request(b"leaf-10")).await.expect("second");
    assert_eq!(primary.calls(), 2, "nothing could be cached");
}

#[tokio::test]
async fn test_no_plant_detected_is_success() {
    let nothing = IdentificationPayload {
        plant_detected: false,
        ..IdentificationPayload::default()
    };
    let primary = MockIdentificationProvider::succeeding("plant_id", nothing.clone());
    let secondary = MockIdentificationProvider::succeeding("plant_net", nothing);
    let service = ServiceBuilder::new(primary, secondary).build();

    let result = service.identify(&request(b"a-rock")).await.expect("success");
    assert!(!result.plant_detected);
    assert!(result.suggestions.is_empty());
}

#[tokio::test]
async fn test_disabled_cache_policy_skips_writes() {
    let (primary, secondary) = healthy_pair();
    let store = CountingCacheProvider::new();
    let service = ServiceBuilder::new(primary.clone(), secondary)
        .store(store.clone())
        .policy(CachePolicy::disabled())
        .build();

    service.identify(&request(b"leaf-11")).await.expect("first");
    service.identify(&request(b"leaf-11")).await.expect("second");
    assert_eq!(store.writes(), 0);
    assert_eq!(primary.calls(), 2);
}

#[tokio::test]
async fn test_events_report_origin() {
    let bus = Arc::new(TokioEventBusProvider::new());
    let mut events = bus.subscribe_events().await.expect("subscribe");
    let (primary, secondary) = healthy_pair();
    let service = ServiceBuilder::new(primary, secondary)
        .events(bus.clone())
        .build();

    service.identify(&request(b"leaf-12")).await.expect("first");
    service.identify(&request(b"leaf-12")).await.expect("second");

    let origins: Vec<ResultOrigin> = events
        .by_ref()
        .take(2)
        .filter_map(|event| async move {
            match event {
                DomainEvent::IdentificationCompleted { origin, .. } => Some(origin),
                _ => None,
            }
        })
        .collect()
        .await;
    assert_eq!(origins, vec![ResultOrigin::Providers, ResultOrigin::Cache]);
}

#[tokio::test]
async fn test_recovered_primary_is_used_again() {
    let primary = MockIdentificationProvider::failing(
        "plant_id",
        ProviderFailure::timeout("slow"),
    );
    let secondary = MockIdentificationProvider::succeeding("plant_net", secondary_payload());
    let service = ServiceBuilder::new(primary.clone(), secondary)
        .policy(CachePolicy::disabled())
        .build();

    let partial = service.identify(&request(b"leaf-13")).await.expect("partial");
    assert!(partial.is_partial());

    primary.set_outcome(Ok(primary_payload()));
    let complete = service.identify(&request(b"leaf-13")).await.expect("complete");
    assert_eq!(complete.completeness, Completeness::Complete);
    assert_eq!(service.circuit_snapshots()[0].consecutive_failures, 0);
}
