//! Cache-fronted access to client configuration.
//!
//! Reads go cache, then persistent store, then repopulate the cache. Writes go
//! to the persistent store first and then unconditionally overwrite (or delete)
//! the cache entry. Cache entries carry no expiry: their validity is owned by
//! the write path.
//!
//! Writes for one client name are serialized, and so is the repopulation of a
//! missed cache entry. Without the latter a slow read could put a stale copy
//! back into the cache after a concurrent update already refreshed it.

use std::collections::hash_map::DefaultHasher;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::domain::ClientConfig;
use crate::error::{DomainError, RepoError};
use crate::ports::{Cache, CacheError, ClientRepository};

const WRITE_LOCK_STRIPES: usize = 64;

/// Config store tuning.
#[derive(Debug, Clone)]
pub struct ConfigStoreOptions {
    /// Upper bound for every persistent store and cache call.
    pub timeout: Duration,
    /// Prefix for cache keys.
    pub key_prefix: String,
}

impl Default for ConfigStoreOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(500),
            key_prefix: "client".to_string(),
        }
    }
}

/// Hybrid cache + persistent store accessor for [`ClientConfig`].
pub struct ConfigStore {
    repo: Arc<dyn ClientRepository>,
    cache: Arc<dyn Cache>,
    options: ConfigStoreOptions,
    write_locks: Vec<Mutex<()>>,
}

impl ConfigStore {
    pub fn new(
        repo: Arc<dyn ClientRepository>,
        cache: Arc<dyn Cache>,
        options: ConfigStoreOptions,
    ) -> Self {
        Self {
            repo,
            cache,
            options,
            write_locks: (0..WRITE_LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Resolve a client, cache first.
    pub async fn get(&self, name: &str) -> Result<ClientConfig, DomainError> {
        let key = self.cache_key(name);
        if let Some(client) = self.read_cache(&key).await {
            return Ok(client);
        }

        let _guard = self.write_lock(name).lock().await;

        // Another caller may have repopulated the entry while we waited.
        if let Some(client) = self.read_cache(&key).await {
            return Ok(client);
        }

        let client = self
            .bounded(self.repo.find_by_name(name))
            .await
            .map_err(|e| store_error(e, name))?
            .ok_or_else(|| DomainError::NotFound(name.to_string()))?;

        self.write_cache(&key, &client).await;
        Ok(client)
    }

    /// Persist a new client and cache it. Fails with `Conflict` if the name exists.
    pub async fn create(&self, client: ClientConfig) -> Result<ClientConfig, DomainError> {
        let _guard = self.write_lock(&client.name).lock().await;

        let name = client.name.clone();
        let saved = self
            .bounded(self.repo.insert(client))
            .await
            .map_err(|e| store_error(e, &name))?;

        self.write_cache(&self.cache_key(&name), &saved).await;
        Ok(saved)
    }

    /// Replace the quota of an existing client and refresh its cache entry.
    pub async fn update_quota(
        &self,
        name: &str,
        limit: u64,
        duration: u64,
    ) -> Result<ClientConfig, DomainError> {
        let _guard = self.write_lock(name).lock().await;

        // Read the store, not the cache: it is the source of truth for writes.
        let current = self
            .bounded(self.repo.find_by_name(name))
            .await
            .map_err(|e| store_error(e, name))?
            .ok_or_else(|| DomainError::NotFound(name.to_string()))?;

        let updated = current.with_quota(limit, duration)?;
        let saved = self
            .bounded(self.repo.update(updated))
            .await
            .map_err(|e| store_error(e, name))?;

        let key = self.cache_key(name);
        if !self.write_cache(&key, &saved).await {
            // A stale entry would keep serving the old quota; drop it so the
            // next read falls through to the store.
            self.delete_cache(&key).await;
        }

        Ok(saved)
    }

    /// Delete a client from the store, then from the cache.
    pub async fn remove(&self, name: &str) -> Result<(), DomainError> {
        let _guard = self.write_lock(name).lock().await;

        self.bounded(self.repo.delete(name))
            .await
            .map_err(|e| store_error(e, name))?;

        // Not retried: a leftover entry stays stale until overwritten.
        self.delete_cache(&self.cache_key(name)).await;
        Ok(())
    }

    fn cache_key(&self, name: &str) -> String {
        format!("{}:{}", self.options.key_prefix, name)
    }

    fn write_lock(&self, name: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        &self.write_locks[(hasher.finish() as usize) % self.write_locks.len()]
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, RepoError>>,
    ) -> Result<T, RepoError> {
        tokio::time::timeout(self.options.timeout, fut)
            .await
            .map_err(|_| RepoError::Connection("operation timed out".to_string()))?
    }

    async fn bounded_cache<T>(
        &self,
        fut: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.options.timeout, fut)
            .await
            .map_err(|_| CacheError::Connection("operation timed out".to_string()))?
    }

    /// Cache lookup. Errors and undecodable values count as a miss.
    async fn read_cache(&self, key: &str) -> Option<ClientConfig> {
        let raw = match self.bounded_cache(self.cache.get(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %key, "Client cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Client cache read failed, using store");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Overwrite a cache entry without expiry. Returns whether it was written.
    async fn write_cache(&self, key: &str, client: &ClientConfig) -> bool {
        let value = match serde_json::to_string(client) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to encode client for cache");
                return false;
            }
        };

        match self.bounded_cache(self.cache.set(key, &value)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Client cache write failed");
                false
            }
        }
    }

    async fn delete_cache(&self, key: &str) {
        if let Err(e) = self.bounded_cache(self.cache.delete(key)).await {
            tracing::warn!(key = %key, error = %e, "Client cache invalidation failed");
        }
    }
}

fn store_error(err: RepoError, name: &str) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::NotFound(name.to_string()),
        RepoError::Constraint(_) => DomainError::Conflict(name.to_string()),
        RepoError::Connection(msg) | RepoError::Query(msg) => {
            tracing::error!(client = %name, error = %msg, "Client store unavailable");
            DomainError::StoreUnavailable(msg)
        }
    }
}
