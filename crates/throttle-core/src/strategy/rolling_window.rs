//! Rolling window counter.
//!
//! Approximates a sliding window with two fixed-window counters: the current
//! window's count plus the previous window's count weighted by how much of the
//! previous window still overlaps the sliding interval. Memory stays at two
//! counters per key regardless of traffic. The estimate is an approximation,
//! not an exact sliding log.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;

use super::{Algorithm, Strategy};
use crate::clock::Clock;
use crate::domain::{LimitRequest, LimitResult, LimitState};
use crate::ports::{CounterError, CounterStore};

pub struct RollingWindow {
    counters: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
}

impl RollingWindow {
    pub fn new(counters: Arc<dyn CounterStore>, clock: Arc<dyn Clock>) -> Self {
        Self { counters, clock }
    }

    fn counter_key(key: &str, window_start_secs: i64) -> String {
        format!("rw:{key}:{window_start_secs}")
    }
}

#[async_trait]
impl Strategy for RollingWindow {
    fn algorithm(&self) -> Algorithm {
        Algorithm::RollingWindow
    }

    async fn run(&self, request: &LimitRequest) -> Result<LimitResult, CounterError> {
        let duration_secs = i64::try_from(request.duration)
            .map_err(|_| CounterError::Backend("window duration out of range".to_string()))?;
        let duration_ms = duration_secs.saturating_mul(1000);

        let now_ms = self.clock.now().timestamp_millis();
        let window_start_ms = now_ms.div_euclid(duration_ms) * duration_ms;
        let window_start = window_start_ms / 1000;

        // The current counter lives for two windows so it can still be read as
        // the previous window after rollover.
        let current = self
            .counters
            .increment(
                &Self::counter_key(&request.key, window_start),
                Duration::from_secs(request.duration.saturating_mul(2)),
            )
            .await?
            .count;
        let previous = self
            .counters
            .get(&Self::counter_key(
                &request.key,
                window_start - duration_secs,
            ))
            .await?;

        let elapsed_fraction = (now_ms - window_start_ms) as f64 / duration_ms as f64;
        let estimate = previous as f64 * (1.0 - elapsed_fraction) + current as f64;

        let expires_at = window_start_ms
            .checked_add(duration_ms)
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| CounterError::Backend("window end out of range".to_string()))?;

        let state = if estimate > request.limit as f64 {
            LimitState::Deny
        } else {
            LimitState::Allow
        };

        tracing::trace!(
            key = %request.key,
            previous,
            current,
            estimate,
            limit = request.limit,
            "Rolling window evaluated"
        );

        Ok(LimitResult {
            state,
            total_requests: estimate.round() as u64,
            expires_at,
            limit: request.limit,
        })
    }
}
