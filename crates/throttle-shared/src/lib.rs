//! # Throttle Shared
//!
//! Request/response types of the rate limiting API, shared by the server and
//! any Rust client of it.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
