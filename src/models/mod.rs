//! Wire models for the tool-call transport
//!
//! JSON-RPC framing used on the subprocess channel and the tool result
//! envelope it carries.

pub mod rpc;
pub mod tool_result;

// Re-export commonly used types
pub use rpc::{RpcError, RpcRequest, RpcResponse};
pub use tool_result::{parse_text, ContentItem, ToolResult};
