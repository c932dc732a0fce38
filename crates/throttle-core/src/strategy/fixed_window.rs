//! Fixed window counter.
//!
//! One counter per key, reset `duration` seconds after the first request of a
//! window. Traffic is not smoothed inside the window: a client can spend its
//! whole quota right after a reset and is then blocked until the next one, so
//! up to twice the limit may pass around a window boundary.
//!
//! `expires_at` is derived from the remaining ttl reported by the counter
//! store, which a remote store measures on its own clock. The result is
//! rounded up to the whole second so millisecond jitter between the two clocks
//! does not move it within a window. Jitter can still flip it by one second
//! when the real expiry falls within a few milliseconds of a second boundary.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

use super::{Algorithm, Strategy};
use crate::clock::Clock;
use crate::domain::{LimitRequest, LimitResult};
use crate::ports::{CounterError, CounterStore};

pub struct FixedWindow {
    counters: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
}

impl FixedWindow {
    pub fn new(counters: Arc<dyn CounterStore>, clock: Arc<dyn Clock>) -> Self {
        Self { counters, clock }
    }

    fn counter_key(key: &str) -> String {
        format!("fw:{key}")
    }
}

fn ceil_to_second(at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if at.timestamp_subsec_nanos() == 0 {
        return Some(at);
    }
    DateTime::from_timestamp(at.timestamp().checked_add(1)?, 0)
}

#[async_trait]
impl Strategy for FixedWindow {
    fn algorithm(&self) -> Algorithm {
        Algorithm::FixedWindow
    }

    async fn run(&self, request: &LimitRequest) -> Result<LimitResult, CounterError> {
        let window = Duration::from_secs(request.duration);
        let now = self.clock.now();

        // Increment and first-time expiry happen in one atomic store call, so a
        // counter can never be left without a reset.
        let snapshot = self
            .counters
            .increment(&Self::counter_key(&request.key), window)
            .await?;

        let ttl = TimeDelta::from_std(snapshot.ttl)
            .map_err(|e| CounterError::Backend(format!("invalid ttl: {e}")))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .and_then(ceil_to_second)
            .ok_or_else(|| CounterError::Backend("window end out of range".to_string()))?;

        tracing::trace!(
            key = %request.key,
            count = snapshot.count,
            limit = request.limit,
            %expires_at,
            "Fixed window evaluated"
        );

        Ok(LimitResult::decide(snapshot.count, request.limit, expires_at))
    }
}
