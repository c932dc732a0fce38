//! Domain entities - the core business objects.

mod client;
mod limit;

pub use client::{ClientConfig, MAX_DURATION_SECS, MAX_LIMIT};
pub use limit::{LimitRequest, LimitResult, LimitState};
