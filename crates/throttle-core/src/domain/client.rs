use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Longest accepted window, in seconds (ten years).
pub const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Largest accepted quota. Quotas are persisted as signed 64-bit integers.
pub const MAX_LIMIT: u64 = i64::MAX as u64;

/// Quota configuration for a named client.
///
/// `limit` is the number of requests allowed per window and `duration` is the
/// window length in seconds. Both are strictly positive and bounded by
/// [`MAX_LIMIT`] and [`MAX_DURATION_SECS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub id: Uuid,
    pub name: String,
    pub limit: u64,
    pub duration: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientConfig {
    /// Create a new client configuration with generated ID and timestamps.
    pub fn new(name: impl Into<String>, limit: u64, duration: u64) -> Result<Self, DomainError> {
        let name = name.into();
        Self::validate(&name, limit, duration)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            limit,
            duration,
            created_at: now,
            updated_at: now,
        })
    }

    /// Return a copy carrying a new quota, keeping identity and creation time.
    pub fn with_quota(&self, limit: u64, duration: u64) -> Result<Self, DomainError> {
        Self::validate(&self.name, limit, duration)?;

        Ok(Self {
            limit,
            duration,
            updated_at: Utc::now(),
            ..self.clone()
        })
    }

    pub(crate) fn validate(name: &str, limit: u64, duration: u64) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::Validation("name must not be empty".to_string()));
        }
        if limit == 0 {
            return Err(DomainError::Validation("limit must be positive".to_string()));
        }
        if limit > MAX_LIMIT {
            return Err(DomainError::Validation(format!(
                "limit must not exceed {MAX_LIMIT}"
            )));
        }
        if duration == 0 {
            return Err(DomainError::Validation(
                "duration must be positive".to_string(),
            ));
        }
        if duration > MAX_DURATION_SECS {
            return Err(DomainError::Validation(format!(
                "duration must not exceed {MAX_DURATION_SECS} seconds"
            )));
        }
        Ok(())
    }
}
