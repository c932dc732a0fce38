//! # Throttle Infrastructure
//!
//! Concrete implementations of the ports defined in `throttle-core`.
//! This crate contains the client repository, the client cache and the
//! shared counter store.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL client repository via SeaORM
//! - `redis` - Redis client cache and counter store

pub mod cache;
pub mod counter;
pub mod database;

#[cfg(test)]
mod tests;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use counter::InMemoryCounterStore;
pub use database::InMemoryClientRepository;

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
#[cfg(feature = "redis")]
pub use counter::{RedisCounterConfig, RedisCounterStore};

// Re-exports - PostgreSQL
#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, DatabaseConnections, PostgresClientRepository};
