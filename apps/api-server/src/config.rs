//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

#[cfg(feature = "postgres")]
use throttle_infra::DatabaseConfig;
#[cfg(feature = "redis")]
use throttle_infra::RedisCounterConfig;

/// Application configuration. Read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Rate limiting algorithm identifier, e.g. `fixed-window`.
    pub algorithm: String,
    /// Upper bound for each store, cache and counter call.
    pub store_timeout: Duration,
    /// Prefix for client configuration cache keys.
    pub client_cache_prefix: String,
    /// How often expired in-memory counters are dropped.
    pub counter_purge_interval: Duration,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "redis")]
    pub redis: Option<RedisCounterConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            algorithm: env::var("RATE_LIMIT_ALGORITHM")
                .unwrap_or_else(|_| "fixed-window".to_string()),
            store_timeout: Duration::from_millis(
                env::var("STORE_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(500),
            ),
            client_cache_prefix: env::var("CLIENT_CACHE_PREFIX")
                .unwrap_or_else(|_| "client".to_string()),
            counter_purge_interval: Duration::from_secs(
                env::var("COUNTER_PURGE_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: env::var("REDIS_URL")
                .ok()
                .map(|_| RedisCounterConfig::from_env()),
        }
    }
}
