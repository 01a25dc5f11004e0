//! Transport Module
//!
//! The two ways the client reaches the workspace: a tool server spoken to
//! over a subprocess's stdio, and the HTTP API.

mod http;
mod stdio;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::ToolResult;

pub use http::HttpClient;
pub use stdio::StdioToolClient;

// == Tool Transport ==
/// Something that can execute a named tool call.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    /// Calls tool `name` with `arguments` and returns the raw result
    /// envelope. An envelope flagged `is_error` is still `Ok` here.
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolResult>;
}
