//! Verification engine.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{LimitRequest, LimitResult};
use crate::error::DomainError;
use crate::services::ConfigStore;
use crate::strategy::{Algorithm, Strategy, StrategyRegistry};

/// Resolves a client's quota and runs the active strategy against it.
///
/// Results are never cached: each call increments and observes the live
/// counter state.
pub struct RateLimiterEngine {
    configs: Arc<ConfigStore>,
    strategy: Arc<dyn Strategy>,
    timeout: Duration,
}

impl RateLimiterEngine {
    /// Bind the engine to the strategy registered for `algorithm`.
    ///
    /// An unknown identifier is a configuration error and is returned here,
    /// before any traffic is served.
    pub fn new(
        configs: Arc<ConfigStore>,
        registry: &StrategyRegistry,
        algorithm: &str,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let strategy = registry.resolve(algorithm)?;
        tracing::info!(algorithm = %strategy.algorithm(), "Rate limiting strategy selected");

        Ok(Self {
            configs,
            strategy,
            timeout,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.strategy.algorithm()
    }

    /// Count one request for `name` and decide whether it is allowed.
    pub async fn verify(&self, name: &str) -> Result<LimitResult, DomainError> {
        let client = self.configs.get(name).await?;
        let request = LimitRequest::from(&client);

        let result = tokio::time::timeout(self.timeout, self.strategy.run(&request))
            .await
            .map_err(|_| DomainError::LimitCheckFailed("counter store timed out".to_string()))?
            .map_err(|e| {
                tracing::error!(client = %name, error = %e, "Limit check failed");
                DomainError::LimitCheckFailed(e.to_string())
            })?;

        tracing::debug!(
            client = %name,
            state = ?result.state,
            total_requests = result.total_requests,
            limit = result.limit,
            "Limit verified"
        );

        Ok(result)
    }
}
