//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod cache;
mod counter;
mod repository;

pub use cache::{Cache, CacheError};
pub use counter::{CounterError, CounterSnapshot, CounterStore};
pub use repository::ClientRepository;
