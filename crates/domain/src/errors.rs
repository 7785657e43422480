//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Salesbridge
///
/// The four ERP-facing variants mirror the failure modes of the upstream
/// service: `Authentication` (the login call itself failed),
/// `SessionExpired` (a cached token was rejected twice in a row),
/// `TransientService` (timeouts or repeated 5xx after the retry budget),
/// and `Upstream` (any other non-2xx response).
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SalesbridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Service temporarily unavailable: {0}")]
    TransientService(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Salesbridge operations
pub type Result<T> = std::result::Result<T, SalesbridgeError>;
