//! Application state - shared across all handlers.

use std::sync::Arc;

use throttle_core::DomainError;
use throttle_core::clock::{Clock, SystemClock};
use throttle_core::ports::{Cache, ClientRepository, CounterStore};
use throttle_core::services::{ClientService, ConfigStore, ConfigStoreOptions, RateLimiterEngine};
use throttle_core::strategy::StrategyRegistry;
use throttle_infra::{InMemoryCache, InMemoryClientRepository, InMemoryCounterStore};

#[cfg(feature = "postgres")]
use throttle_infra::{DatabaseConnections, PostgresClientRepository};
#[cfg(feature = "redis")]
use throttle_infra::{RedisCache, RedisCounterStore};

use crate::config::AppConfig;

/// Failures that prevent the server from serving traffic.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Algorithm(#[from] DomainError),

    #[error("Database unavailable: {0}")]
    Database(String),

    #[error("Redis unavailable: {0}")]
    Redis(String),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub clients: Arc<ClientService>,
    pub limiter: Arc<RateLimiterEngine>,
    /// Set when counters are process-local and need periodic purging.
    pub local_counters: Option<Arc<InMemoryCounterStore>>,
}

struct Backends {
    repo: Arc<dyn ClientRepository>,
    cache: Arc<dyn Cache>,
    counters: Arc<dyn CounterStore>,
    local_counters: Option<Arc<InMemoryCounterStore>>,
}

impl AppState {
    /// Build the application state with the implementations the configuration asks for.
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        let repo = build_repository(config).await?;
        let backends = build_shared_stores(config, repo).await?;
        let state = Self::assemble(config, backends)?;

        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// State backed entirely by in-memory stores.
    #[cfg(test)]
    pub(crate) fn in_memory(config: &AppConfig) -> Result<Self, StartupError> {
        Self::assemble(config, memory_backends(Arc::new(InMemoryClientRepository::new())))
    }

    fn assemble(config: &AppConfig, backends: Backends) -> Result<Self, StartupError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let configs = Arc::new(ConfigStore::new(
            backends.repo,
            backends.cache,
            ConfigStoreOptions {
                timeout: config.store_timeout,
                key_prefix: config.client_cache_prefix.clone(),
            },
        ));

        let registry = StrategyRegistry::new(backends.counters, clock);
        let limiter = RateLimiterEngine::new(
            configs.clone(),
            &registry,
            &config.algorithm,
            config.store_timeout,
        )?;

        Ok(Self {
            clients: Arc::new(ClientService::new(configs)),
            limiter: Arc::new(limiter),
            local_counters: backends.local_counters,
        })
    }
}

fn memory_backends(repo: Arc<dyn ClientRepository>) -> Backends {
    let counters = Arc::new(InMemoryCounterStore::new());
    Backends {
        repo,
        cache: Arc::new(InMemoryCache::new()),
        counters: counters.clone(),
        local_counters: Some(counters),
    }
}

#[cfg(feature = "postgres")]
async fn build_repository(config: &AppConfig) -> Result<Arc<dyn ClientRepository>, StartupError> {
    let Some(db_config) = config.database.as_ref() else {
        tracing::warn!("DATABASE_URL not set. Clients are kept in memory only.");
        return Ok(Arc::new(InMemoryClientRepository::new()));
    };

    let connections = DatabaseConnections::init(db_config)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;

    Ok(Arc::new(PostgresClientRepository::new(connections.main)))
}

#[cfg(not(feature = "postgres"))]
async fn build_repository(_config: &AppConfig) -> Result<Arc<dyn ClientRepository>, StartupError> {
    tracing::info!("Running without postgres feature - using in-memory client repository");
    Ok(Arc::new(InMemoryClientRepository::new()))
}

#[cfg(feature = "redis")]
async fn build_shared_stores(
    config: &AppConfig,
    repo: Arc<dyn ClientRepository>,
) -> Result<Backends, StartupError> {
    let Some(redis_config) = config.redis.as_ref() else {
        tracing::warn!("REDIS_URL not set. Cache and counters are process-local.");
        return Ok(memory_backends(repo));
    };

    let connected = async {
        let cache = RedisCache::new(&redis_config.redis)
            .await
            .map_err(|e| e.to_string())?;
        let counters = RedisCounterStore::new(redis_config.clone())
            .await
            .map_err(|e| e.to_string())?;
        Ok::<_, String>((cache, counters))
    }
    .await;

    match connected {
        Ok((cache, counters)) => Ok(Backends {
            repo,
            cache: Arc::new(cache),
            counters: Arc::new(counters),
            local_counters: None,
        }),
        Err(e) if redis_config.redis.fallback_to_memory => {
            tracing::warn!(
                "Failed to connect to Redis: {}. Using in-memory cache and counters.",
                e
            );
            Ok(memory_backends(repo))
        }
        Err(e) => Err(StartupError::Redis(e)),
    }
}

#[cfg(not(feature = "redis"))]
async fn build_shared_stores(
    _config: &AppConfig,
    repo: Arc<dyn ClientRepository>,
) -> Result<Backends, StartupError> {
    tracing::info!("Running without redis feature - using in-memory cache and counters");
    Ok(memory_backends(repo))
}
