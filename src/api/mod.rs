//! API Module
//!
//! Workspace operations built on the cache, the retrying tool invoker and
//! the HTTP client.
//!
//! # Operations
//! - Reads: channels, history, thread replies, users, user profile, search
//! - Writes: post message, reply to thread, add reaction

mod client;
pub mod tools;

pub use client::WorkspaceClient;
