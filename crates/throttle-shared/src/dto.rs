//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Request to register a new client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterClientRequest {
    pub name: String,
    pub limit: u64,
    /// Window length in seconds.
    pub duration: u64,
}

/// Request to change a client's quota.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateClientRequest {
    pub limit: u64,
    pub duration: u64,
}

/// A registered client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientResponse {
    pub id: String,
    pub name: String,
    pub limit: u64,
    pub duration: u64,
}

/// Outcome of a write that returns no entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
}

/// Outcome of a limit verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyLimitResponse {
    pub allowed: bool,
    pub total_requests: i64,
    /// Unix timestamp, in seconds, at which the current window resets.
    pub expires_at: i64,
}
