use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ClientConfig;

/// A single verification attempt handed to a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitRequest {
    pub key: String,
    pub limit: u64,
    /// Window length in seconds.
    pub duration: u64,
}

impl From<&ClientConfig> for LimitRequest {
    fn from(client: &ClientConfig) -> Self {
        Self {
            key: client.name.clone(),
            limit: client.limit,
            duration: client.duration,
        }
    }
}

/// Decision taken by a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitState {
    Allow,
    Deny,
}

/// Outcome of a verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitResult {
    pub state: LimitState,
    /// Requests observed in the current window, including this one.
    pub total_requests: u64,
    /// When the current window (or count) resets.
    pub expires_at: DateTime<Utc>,
    pub limit: u64,
}

impl LimitResult {
    /// Build a result, denying when `total_requests` exceeds `limit`.
    pub fn decide(total_requests: u64, limit: u64, expires_at: DateTime<Utc>) -> Self {
        let state = if total_requests > limit {
            LimitState::Deny
        } else {
            LimitState::Allow
        };

        Self {
            state,
            total_requests,
            expires_at,
            limit,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.state == LimitState::Allow
    }
}
