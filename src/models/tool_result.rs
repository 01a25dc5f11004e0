//! Tool-call result envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of a `tools/call`: an error flag plus a list of typed content items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

/// One content item. Only `text` items are consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ToolResult {
    /// Successful result with a single text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            is_error: false,
            content: vec![ContentItem::text(text)],
        }
    }

    /// Error result with a single text item.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            content: vec![ContentItem::text(text)],
        }
    }

    /// Text of the first `text` item that actually carries text.
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .filter(|item| item.kind == "text")
            .find_map(|item| item.text.as_deref())
    }
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
        }
    }
}

/// Parses tool text as JSON, keeping it as a plain string when it is not.
pub fn parse_text(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
