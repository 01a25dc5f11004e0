//! JSON-RPC 2.0 messages exchanged with the tool server over stdio.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol revision sent during `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Outgoing request or notification.
///
/// Notifications carry no `id` and get no response.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    /// A request expecting a response with the same `id`.
    pub fn call(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: Some(id),
            method: method.into(),
            params: Some(params),
        }
    }

    /// A fire-and-forget notification.
    pub fn notification(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: None,
            method: method.into(),
            params: None,
        }
    }

    /// `initialize` handshake identifying this client.
    pub fn initialize(id: u64) -> Self {
        Self::call(
            id,
            "initialize",
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        )
    }

    /// `tools/call` for the named tool.
    pub fn tool_call(id: u64, name: &str, arguments: Value) -> Self {
        Self::call(
            id,
            "tools/call",
            serde_json::json!({ "name": name, "arguments": arguments }),
        )
    }
}

/// Incoming message. Server notifications have no `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}
