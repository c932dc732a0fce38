//! Domain-level error types.

use thiserror::Error;

/// Domain errors - failures surfaced to callers of the engine and the
/// client administration operations.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Client not found: {0}")]
    NotFound(String),

    #[error("Client already exists: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Unsupported rate limiting algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Limit check failed: {0}")]
    LimitCheckFailed(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
