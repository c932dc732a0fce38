//! Counter store port.

use async_trait::async_trait;
use std::time::Duration;

/// Shared store holding per-key request counts and their expiry.
///
/// Implementations must make [`CounterStore::increment`] a single atomic step:
/// two concurrent callers on the same key never observe the same count, and a
/// counter is never left without an expiry.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment `key` by one and return the new count with its remaining
    /// time-to-live. A counter without an expiry (freshly created, or one
    /// that lost it) gets `ttl` in the same step; an existing expiry is kept.
    async fn increment(&self, key: &str, ttl: Duration) -> Result<CounterSnapshot, CounterError>;

    /// Current count for `key`, zero when absent or expired.
    async fn get(&self, key: &str) -> Result<u64, CounterError>;
}

/// Counter state observed right after an increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub count: u64,
    pub ttl: Duration,
}

/// Counter store errors.
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Operation timed out")]
    Timeout,
}
