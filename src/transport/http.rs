//! Direct HTTP API calls.
//!
//! Bearer-authenticated requests against `<base>/<method>`. Responses use the
//! `{ "ok": bool, "error": "..." }` envelope. Nothing on this path is retried.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{RelayError, Result};

// == HTTP Client ==
/// Authenticated client for the workspace HTTP API.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a client with a per-request deadline.
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. `https://slack.com/api`
    /// * `token` - Bearer token
    /// * `timeout` - Deadline applied to every request
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| RelayError::Config(format!("invalid API base URL {:?}: {}", base_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url,
            token: token.into(),
            timeout,
        })
    }

    /// Creates a client from `config`. Fails before any request if no token
    /// is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config.require_token()?;
        Self::new(config.api_base.clone(), token, config.http_timeout())
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// `GET <base>/<method>?query`.
    pub async fn get(&self, method: &str, query: &[(&str, String)]) -> Result<Value> {
        debug!(method, "HTTP GET");
        self.send(self.client.get(self.url(method)).query(query)).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(RelayError::RateLimited {
                retry_after: retry_after(&response),
            });
        }
        let hint = retry_after(&response);
        let status = response.status();

        let body: Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                RelayError::Api(format!("unreadable response body (HTTP {})", status))
            } else {
                self.map_transport(e)
            }
        })?;
        check_envelope(body, hint)
    }

    fn map_transport(&self, err: reqwest::Error) -> RelayError {
        if err.is_timeout() {
            RelayError::Timeout(self.timeout)
        } else {
            RelayError::Transport(err.to_string())
        }
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Turns an `ok: false` envelope into the matching error.
fn check_envelope(body: Value, retry_after: Option<Duration>) -> Result<Value> {
    if body.get("ok").and_then(Value::as_bool) == Some(true) {
        return Ok(body);
    }

    let code = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown_error");
    Err(match code {
        "missing_scope" => RelayError::MissingScope {
            needed: body
                .get("needed")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
        },
        "not_allowed_token_type" => RelayError::InvalidTokenType,
        "ratelimited" | "rate_limited" => RelayError::RateLimited { retry_after },
        other => RelayError::Api(other.to_string()),
    })
}
