//! Rate limiting algorithms.
//!
//! Every strategy shares one [`CounterStore`](crate::ports::CounterStore) and
//! one [`Clock`](crate::clock::Clock). Which strategy serves traffic is chosen
//! once at startup through the [`StrategyRegistry`].

mod fixed_window;
mod registry;
mod rolling_window;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::domain::{LimitRequest, LimitResult};
use crate::error::DomainError;
use crate::ports::CounterError;

pub use fixed_window::FixedWindow;
pub use registry::StrategyRegistry;
pub use rolling_window::RollingWindow;

/// An interchangeable allow/deny algorithm.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Which algorithm this strategy implements.
    fn algorithm(&self) -> Algorithm;

    /// Count this request against its key and decide whether it is allowed.
    async fn run(&self, request: &LimitRequest) -> Result<LimitResult, CounterError>;
}

/// The closed set of supported algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    FixedWindow,
    RollingWindow,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::FixedWindow, Algorithm::RollingWindow];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::FixedWindow => "fixed-window",
            Algorithm::RollingWindow => "rolling-window",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnsupportedAlgorithm(s.to_string()))
    }
}
