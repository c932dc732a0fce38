//! # Throttle Core
//!
//! The domain layer of the Throttle rate-limiting service.
//! This crate holds the limiting algorithms, the configuration store policy and
//! the verification engine. Infrastructure is reached only through the traits
//! in [`ports`].

pub mod clock;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod strategy;

#[cfg(test)]
mod testing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::DomainError;
