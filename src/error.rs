//! Error types for the workspace client
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use thiserror::Error;

// == Relay Error Enum ==
/// Unified error type for the workspace client.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Required configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The tool server is still warming up
    #[error("Tool server not ready: {0}")]
    Transient(String),

    /// The tool server never became ready
    #[error("Gave up after {attempts} attempts: {message}")]
    RetriesExhausted {
        /// Total calls made, the first one included
        attempts: u32,
        /// Last error text reported by the server
        message: String,
    },

    /// A tool call came back flagged as an error
    #[error("Tool error: {0}")]
    Tool(String),

    /// The token lacks a required scope
    #[error("Missing scope: {needed}")]
    MissingScope {
        /// Scope named by the API, if it said
        needed: String,
    },

    /// The endpoint does not accept this kind of token
    #[error("Token type not allowed for this method")]
    InvalidTokenType,

    /// The API asked us to slow down
    #[error("Rate limited{}", .retry_after.map(|d| format!(", retry after {}s", d.as_secs())).unwrap_or_default())]
    RateLimited {
        /// Server-provided wait, if any
        retry_after: Option<Duration>,
    },

    /// Any other API-level rejection
    #[error("API error: {0}")]
    Api(String),

    /// The request did not finish before its deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level HTTP failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed response or JSON-RPC failure
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Subprocess I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Protocol(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the workspace client.
pub type Result<T> = std::result::Result<T, RelayError>;
