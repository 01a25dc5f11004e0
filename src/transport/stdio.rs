//! Tool server over subprocess stdio.
//!
//! Newline-delimited JSON-RPC 2.0. The process is started on the first call
//! and killed when the client is dropped.

use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use super::ToolTransport;
use crate::error::{RelayError, Result};
use crate::models::{RpcRequest, RpcResponse, ToolResult};

/// Live connection to a spawned tool server.
struct Connection {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

impl Connection {
    async fn spawn(command: &str, args: &[String]) -> Result<Self> {
        info!(command, ?args, "Starting tool server");
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RelayError::Protocol("tool server stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RelayError::Protocol("tool server stdout unavailable".to_string()))?;

        let mut conn = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
        };
        conn.handshake().await?;
        info!("Tool server ready");
        Ok(conn)
    }

    async fn handshake(&mut self) -> Result<()> {
        let id = self.take_id();
        self.request(RpcRequest::initialize(id)).await?;
        self.send(&RpcRequest::notification("notifications/initialized"))
            .await
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    async fn send(&mut self, message: &RpcRequest) -> Result<()> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Sends `request` and reads until the response with its id arrives.
    async fn request(&mut self, request: RpcRequest) -> Result<Value> {
        let id = request.id;
        self.send(&request).await?;

        loop {
            let line = self.stdout.next_line().await?.ok_or_else(|| {
                RelayError::Protocol("tool server closed its output".to_string())
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let response: RpcResponse = match serde_json::from_str(&line) {
                Ok(response) => response,
                Err(e) => {
                    debug!(error = %e, "Skipping non-JSON-RPC line from tool server");
                    continue;
                }
            };
            if response.id.is_none() || response.id != id {
                continue;
            }
            if let Some(error) = response.error {
                return Err(RelayError::Protocol(format!(
                    "{} (code {})",
                    error.message, error.code
                )));
            }
            return Ok(response.result.unwrap_or(Value::Null));
        }
    }
}

// == Stdio Tool Client ==
/// Tool transport that drives a tool server subprocess.
pub struct StdioToolClient {
    command: String,
    args: Vec<String>,
    connection: OnceCell<Mutex<Connection>>,
}

impl StdioToolClient {
    /// Prepares a client for `command args...`. Nothing is spawned yet.
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            connection: OnceCell::new(),
        }
    }

    /// Creates a client from the tool server settings in `config`.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(config.tool_command.clone(), config.tool_args.clone())
    }

    /// Whether the subprocess has been started.
    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    async fn connection(&self) -> Result<&Mutex<Connection>> {
        self.connection
            .get_or_try_init(|| async {
                Connection::spawn(&self.command, &self.args).await.map(Mutex::new)
            })
            .await
    }

    /// Stops the subprocess if it was started.
    pub async fn shutdown(&self) {
        if let Some(conn) = self.connection.get() {
            let mut conn = conn.lock().await;
            if let Err(e) = conn.child.kill().await {
                warn!(error = %e, "Failed to stop tool server");
            } else {
                info!("Tool server stopped");
            }
        }
    }
}

#[async_trait]
impl ToolTransport for StdioToolClient {
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolResult> {
        let mut conn = self.connection().await?.lock().await;
        let id = conn.take_id();
        debug!(tool = name, id, "Calling tool");
        let result = conn.request(RpcRequest::tool_call(id, name, arguments)).await?;
        Ok(serde_json::from_value(result)?)
    }
}
