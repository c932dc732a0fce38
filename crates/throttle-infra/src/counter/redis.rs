//! Redis counter store.
//!
//! Increment and first-time expiry run as one Lua script, so Redis executes
//! them atomically: a counter can neither miss its expiry nor have it pushed
//! back by a later request.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

use throttle_core::ports::{CounterError, CounterSnapshot, CounterStore};

use crate::cache::RedisConfig;

/// Redis counter store configuration.
#[derive(Debug, Clone)]
pub struct RedisCounterConfig {
    /// Redis connection config
    pub redis: RedisConfig,
    /// Key prefix for counter keys
    pub key_prefix: String,
}

impl Default for RedisCounterConfig {
    fn default() -> Self {
        Self {
            redis: RedisConfig::default(),
            key_prefix: "ratelimit".to_string(),
        }
    }
}

impl RedisCounterConfig {
    pub fn from_env() -> Self {
        Self {
            redis: RedisConfig::from_env(),
            key_prefix: std::env::var("COUNTER_KEY_PREFIX")
                .unwrap_or_else(|_| "ratelimit".to_string()),
        }
    }
}

/// Redis-backed shared counter store.
pub struct RedisCounterStore {
    conn: ConnectionManager,
    config: RedisCounterConfig,
    /// Lua script for atomic increment with expiry
    script: Script,
}

impl RedisCounterStore {
    pub async fn new(config: RedisCounterConfig) -> Result<Self, CounterError> {
        let conn = config
            .redis
            .connect()
            .await
            .map_err(CounterError::Backend)?;

        // Returns: [current_count, pttl_remaining]
        let script = Script::new(
            r#"
            local key = KEYS[1]
            local window_ms = tonumber(ARGV[1])

            local current = redis.call('INCR', key)
            local ttl = redis.call('PTTL', key)
            if ttl < 0 then
                redis.call('PEXPIRE', key, window_ms)
                ttl = window_ms
            end

            return {current, ttl}
            "#,
        );

        tracing::info!(url = %config.redis.url, "Connected to Redis counter store");

        Ok(Self {
            conn,
            config,
            script,
        })
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}:{}", self.config.key_prefix, key)
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<CounterSnapshot, CounterError> {
        let redis_key = self.make_key(key);
        let mut conn = self.conn.clone();

        let result: Vec<i64> = self
            .script
            .key(&redis_key)
            .arg(ttl.as_millis().max(1) as u64)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| CounterError::Backend(e.to_string()))?;

        let (count, ttl_ms) = match result.as_slice() {
            [count, ttl_ms] => (*count, *ttl_ms),
            _ => {
                return Err(CounterError::Backend(format!(
                    "unexpected script reply: {result:?}"
                )));
            }
        };

        Ok(CounterSnapshot {
            count: count.max(0) as u64,
            ttl: Duration::from_millis(ttl_ms.max(1) as u64),
        })
    }

    async fn get(&self, key: &str) -> Result<u64, CounterError> {
        let mut conn = self.conn.clone();
        let count: Option<u64> = conn
            .get(self.make_key(key))
            .await
            .map_err(|e| CounterError::Backend(e.to_string()))?;
        Ok(count.unwrap_or(0))
    }
}
