//! End-to-end checks of the engine wired to the in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta};
use throttle_core::clock::ManualClock;
use throttle_core::domain::{ClientConfig, LimitState};
use throttle_core::services::{ClientService, ConfigStore, ConfigStoreOptions, RateLimiterEngine};
use throttle_core::strategy::StrategyRegistry;
use throttle_core::DomainError;

use crate::{InMemoryCache, InMemoryClientRepository, InMemoryCounterStore};

// Aligned to a 60 second boundary.
const T0: i64 = 1_700_000_040;

struct Harness {
    configs: Arc<ConfigStore>,
    clients: ClientService,
    engine: Arc<RateLimiterEngine>,
    clock: Arc<ManualClock>,
}

fn harness(algorithm: &str) -> Harness {
    let clock = Arc::new(ManualClock::at_epoch_secs(T0));
    let counters = Arc::new(InMemoryCounterStore::with_clock(clock.clone()));
    let configs = Arc::new(ConfigStore::new(
        Arc::new(InMemoryClientRepository::new()),
        Arc::new(InMemoryCache::new()),
        ConfigStoreOptions::default(),
    ));
    let registry = StrategyRegistry::new(counters, clock.clone());
    let engine = RateLimiterEngine::new(
        configs.clone(),
        &registry,
        algorithm,
        Duration::from_millis(500),
    )
    .unwrap();

    Harness {
        configs: configs.clone(),
        clients: ClientService::new(configs),
        engine: Arc::new(engine),
        clock,
    }
}

#[tokio::test]
async fn test_fixed_window_scenario() {
    let h = harness("fixed-window");
    h.clients.register("svc-a", 3, 60).await.unwrap();

    let mut results = Vec::new();
    for _ in 0..4 {
        results.push(h.engine.verify("svc-a").await.unwrap());
        h.clock.advance(TimeDelta::milliseconds(250));
    }

    let summary: Vec<_> = results
        .iter()
        .map(|r| (r.state, r.total_requests))
        .collect();
    assert_eq!(
        summary,
        vec![
            (LimitState::Allow, 1),
            (LimitState::Allow, 2),
            (LimitState::Allow, 3),
            (LimitState::Deny, 4),
        ]
    );
    let expires_at = DateTime::from_timestamp(T0 + 60, 0).unwrap();
    assert!(results.iter().all(|r| r.expires_at == expires_at));
}

#[tokio::test]
async fn test_fixed_window_resets_after_boundary() {
    let h = harness("fixed-window");
    h.clients.register("svc-a", 2, 10).await.unwrap();

    let mut last = 0;
    for _ in 0..5 {
        let result = h.engine.verify("svc-a").await.unwrap();
        assert!(result.total_requests > last);
        last = result.total_requests;
    }

    h.clock.advance(TimeDelta::seconds(11));
    let result = h.engine.verify("svc-a").await.unwrap();
    assert_eq!(result.total_requests, 1);
    assert!(result.is_allowed());
}

#[tokio::test]
async fn test_rolling_window_scenario() {
    let h = harness("rolling-window");
    h.clients.register("svc-a", 10, 60).await.unwrap();

    for _ in 0..10 {
        assert!(h.engine.verify("svc-a").await.unwrap().is_allowed());
    }

    h.clock.set(DateTime::from_timestamp(T0 + 65, 0).unwrap());
    let result = h.engine.verify("svc-a").await.unwrap();
    assert_eq!(result.state, LimitState::Deny);
}

#[tokio::test]
async fn test_update_applies_to_next_verification() {
    let h = harness("fixed-window");
    h.clients.register("svc-a", 1, 60).await.unwrap();

    assert!(h.engine.verify("svc-a").await.unwrap().is_allowed());
    assert!(!h.engine.verify("svc-a").await.unwrap().is_allowed());

    h.clients.update("svc-a", 10, 60).await.unwrap();

    let found = h.clients.get("svc-a").await.unwrap();
    assert_eq!(found.limit, 10);
    assert!(h.engine.verify("svc-a").await.unwrap().is_allowed());
}

#[tokio::test]
async fn test_delete_blocks_verification() {
    let h = harness("rolling-window");
    h.clients.register("svc-a", 5, 60).await.unwrap();
    h.engine.verify("svc-a").await.unwrap();

    h.clients.delete("svc-a").await.unwrap();

    assert!(matches!(
        h.clients.get("svc-a").await.unwrap_err(),
        DomainError::NotFound(_)
    ));
    assert!(matches!(
        h.engine.verify("svc-a").await.unwrap_err(),
        DomainError::NotFound(_)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_verifications_respect_limit() {
    for algorithm in ["fixed-window", "rolling-window"] {
        let h = harness(algorithm);
        h.clients.register("svc-a", 25, 60).await.unwrap();

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let engine = h.engine.clone();
                tokio::spawn(async move { engine.verify("svc-a").await.unwrap() })
            })
            .collect();

        let allowed = futures::future::join_all(handles)
            .await
            .into_iter()
            .filter(|r| r.as_ref().unwrap().is_allowed())
            .count();

        assert_eq!(allowed, 25, "algorithm {algorithm}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_clients_are_limited_independently() {
    let h = harness("fixed-window");
    for name in ["svc-a", "svc-b", "svc-c"] {
        h.clients.register(name, 5, 60).await.unwrap();
    }

    let handles: Vec<_> = ["svc-a", "svc-b", "svc-c"]
        .into_iter()
        .flat_map(|name| std::iter::repeat_n(name, 8))
        .map(|name| {
            let engine = h.engine.clone();
            tokio::spawn(async move { (name, engine.verify(name).await.unwrap()) })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    for name in ["svc-a", "svc-b", "svc-c"] {
        let allowed = results
            .iter()
            .filter(|(n, r)| *n == name && r.is_allowed())
            .count();
        assert_eq!(allowed, 5, "client {name}");
    }
}

#[tokio::test]
async fn test_huge_duration_is_rejected_at_registration() {
    let h = harness("fixed-window");

    let err = h
        .clients
        .register("svc-big", 5, 10_000_000_000_000)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_unrepresentable_window_fails_verification() {
    for algorithm in ["fixed-window", "rolling-window"] {
        let h = harness(algorithm);
        // Rows written before the duration bound existed skip validation.
        let mut client = ClientConfig::new("svc-big", 5, 60).unwrap();
        client.duration = 10_000_000_000_000;
        h.configs.create(client).await.unwrap();

        let err = h.engine.verify("svc-big").await.unwrap_err();
        assert!(
            matches!(err, DomainError::LimitCheckFailed(_)),
            "algorithm {algorithm}"
        );
    }
}
