//! Configuration Module
//!
//! Handles loading client configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{RelayError, Result};

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// API token for direct HTTP calls
    pub token: Option<String>,
    /// Base URL of the HTTP API
    pub api_base: String,
    /// Program that serves the tool-call protocol over stdio
    pub tool_command: String,
    /// Arguments for `tool_command`
    pub tool_args: Vec<String>,
    /// Namespace for cache keys
    pub cache_namespace: String,
    /// Default TTL in seconds for cached results
    pub default_ttl: u64,
    /// Deadline in seconds for each HTTP request
    pub http_timeout: u64,
    /// Retries allowed while the tool server warms up
    pub max_retries: u32,
    /// Start with the cache disabled
    pub cache_disabled: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SLACKLINE_TOKEN` - API token (no default)
    /// - `SLACKLINE_API_BASE` - API base URL (default: https://slack.com/api)
    /// - `SLACKLINE_MCP_COMMAND` - Tool server program (default: npx)
    /// - `SLACKLINE_MCP_ARGS` - Whitespace-separated tool server arguments
    /// - `SLACKLINE_CACHE_NAMESPACE` - Cache namespace (default: slackline)
    /// - `SLACKLINE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SLACKLINE_HTTP_TIMEOUT` - HTTP deadline in seconds (default: 30)
    /// - `SLACKLINE_MAX_RETRIES` - Warm-up retries (default: 6)
    /// - `SLACKLINE_NO_CACHE` - `1` or `true` disables the cache
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            token: env::var("SLACKLINE_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            api_base: env::var("SLACKLINE_API_BASE").unwrap_or(defaults.api_base),
            tool_command: env::var("SLACKLINE_MCP_COMMAND").unwrap_or(defaults.tool_command),
            tool_args: env::var("SLACKLINE_MCP_ARGS")
                .map(|v| v.split_whitespace().map(String::from).collect())
                .unwrap_or(defaults.tool_args),
            cache_namespace: env::var("SLACKLINE_CACHE_NAMESPACE")
                .unwrap_or(defaults.cache_namespace),
            default_ttl: env::var("SLACKLINE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl),
            http_timeout: env::var("SLACKLINE_HTTP_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.http_timeout),
            max_retries: env::var("SLACKLINE_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
            cache_disabled: env::var("SLACKLINE_NO_CACHE")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.cache_disabled),
        }
    }

    /// Returns the API token, or a configuration error if none is set.
    pub fn require_token(&self) -> Result<&str> {
        self.token.as_deref().ok_or_else(|| {
            RelayError::Config("SLACKLINE_TOKEN is not set".to_string())
        })
    }

    /// Default TTL as a Duration.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    /// HTTP deadline as a Duration.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            api_base: "https://slack.com/api".to_string(),
            tool_command: "npx".to_string(),
            tool_args: vec![
                "-y".to_string(),
                "@modelcontextprotocol/server-slack".to_string(),
            ],
            cache_namespace: "slackline".to_string(),
            default_ttl: 300,
            http_timeout: 30,
            max_retries: 6,
            cache_disabled: false,
        }
    }
}
