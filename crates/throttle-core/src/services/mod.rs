//! Application services built on top of the ports.

mod clients;
mod config_store;
mod limiter;

pub use clients::ClientService;
pub use config_store::{ConfigStore, ConfigStoreOptions};
pub use limiter::RateLimiterEngine;
