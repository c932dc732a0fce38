//! In-memory counter store.
//!
//! Counters live in a sharded map: an increment locks only the shard holding
//! its key, so different clients are counted in parallel while increments on
//! the same key are serialized.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

use throttle_core::clock::{Clock, SystemClock};
use throttle_core::ports::{CounterError, CounterSnapshot, CounterStore};

struct CounterEntry {
    count: u64,
    expires_at: DateTime<Utc>,
}

/// Process-local counter store.
///
/// Note: Counts are per-process, not shared across instances.
pub struct InMemoryCounterStore {
    counters: DashMap<String, CounterEntry>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Use the same clock as the strategies so expiry and window arithmetic agree.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            counters: DashMap::new(),
            clock,
        }
    }

    /// Drop expired counters. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.counters.len();
        self.counters.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.counters.len())
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<CounterSnapshot, CounterError> {
        let ttl = TimeDelta::from_std(ttl).map_err(|e| CounterError::Backend(e.to_string()))?;
        let now = self.clock.now();
        let fresh_expiry = now
            .checked_add_signed(ttl)
            .ok_or_else(|| CounterError::Backend("counter expiry out of range".to_string()))?;

        // The entry guard holds the shard lock for the whole read-modify-write.
        let mut entry = self
            .counters
            .entry(key.to_string())
            .or_insert_with(|| CounterEntry {
                count: 0,
                expires_at: fresh_expiry,
            });

        if entry.expires_at <= now {
            entry.count = 0;
            entry.expires_at = fresh_expiry;
        }
        entry.count += 1;

        let remaining = (entry.expires_at - now)
            .to_std()
            .map_err(|e| CounterError::Backend(e.to_string()))?;

        Ok(CounterSnapshot {
            count: entry.count,
            ttl: remaining,
        })
    }

    async fn get(&self, key: &str) -> Result<u64, CounterError> {
        let now = self.clock.now();
        Ok(self
            .counters
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.count)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use throttle_core::clock::ManualClock;

    fn store() -> (InMemoryCounterStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_epoch_secs(1_700_000_000));
        (InMemoryCounterStore::with_clock(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_increment_sets_expiry_once() {
        let (store, clock) = store();

        let first = store.increment("k", Duration::from_secs(60)).await.unwrap();
        assert_eq!(first.count, 1);
        assert_eq!(first.ttl, Duration::from_secs(60));

        clock.advance(TimeDelta::seconds(15));
        let second = store.increment("k", Duration::from_secs(60)).await.unwrap();
        assert_eq!(second.count, 2);
        assert_eq!(second.ttl, Duration::from_secs(45));
    }

    #[tokio::test]
    async fn test_expired_counter_restarts() {
        let (store, clock) = store();
        store.increment("k", Duration::from_secs(10)).await.unwrap();
        store.increment("k", Duration::from_secs(10)).await.unwrap();

        clock.advance(TimeDelta::seconds(10));
        assert_eq!(store.get("k").await.unwrap(), 0);

        let snapshot = store.increment("k", Duration::from_secs(10)).await.unwrap();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.ttl, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_unrepresentable_expiry_is_an_error() {
        let (store, _clock) = store();

        let result = store
            .increment("k", Duration::from_secs(10_000_000_000_000))
            .await;
        assert!(matches!(result, Err(CounterError::Backend(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_is_zero() {
        let (store, _clock) = store();
        assert_eq!(store.get("missing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (store, clock) = store();
        store.increment("short", Duration::from_secs(1)).await.unwrap();
        store.increment("long", Duration::from_secs(100)).await.unwrap();

        clock.advance(TimeDelta::seconds(5));
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("long").await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_increments_are_atomic() {
        let store = Arc::new(InMemoryCounterStore::new());

        let handles: Vec<_> = (0..200)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .increment("shared", Duration::from_secs(60))
                        .await
                        .unwrap()
                        .count
                })
            })
            .collect();

        let mut counts: Vec<u64> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        counts.sort_unstable();

        assert_eq!(counts, (1..=200).collect::<Vec<_>>());
    }
}
