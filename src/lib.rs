//! Slackline - messaging workspace client
//!
//! Reads are served through a namespaced TTL cache; tool calls that hit the
//! tool server's warm-up window are retried with exponential backoff.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod transport;

pub use api::WorkspaceClient;
pub use config::Config;
pub use error::{RelayError, Result};
