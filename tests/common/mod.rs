//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use slackline::cache::{ManualClock, TtlCache};
use slackline::models::ToolResult;
use slackline::retry::{RetryPolicy, RetryingInvoker, Sleeper};
use slackline::transport::{HttpClient, ToolTransport};
use slackline::{Result, WorkspaceClient};

/// Tool transport answering from per-tool queues. The last queued result
/// for a tool is repeated once the queue is down to one.
#[derive(Clone, Default)]
pub struct FakeTools {
    replies: Arc<Mutex<HashMap<String, VecDeque<ToolResult>>>>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl FakeTools {
    pub fn reply(&self, tool: &str, result: ToolResult) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(tool.to_string())
            .or_default()
            .push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, tool: &str) -> usize {
        self.calls().iter().filter(|(name, _)| name == tool).count()
    }
}

#[async_trait]
impl ToolTransport for FakeTools {
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolResult> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments));
        let mut replies = self.replies.lock().unwrap();
        let queue = replies.entry(name.to_string()).or_default();
        let result = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        Ok(result.unwrap_or_else(|| ToolResult::error(format!("no reply scripted for {}", name))))
    }
}

/// Records requested delays instead of sleeping.
#[derive(Clone, Default)]
pub struct NoSleep {
    pub delays: Arc<Mutex<Vec<Duration>>>,
}

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

pub struct Harness {
    pub client: WorkspaceClient<FakeTools, NoSleep>,
    pub tools: FakeTools,
    pub sleeper: NoSleep,
    pub clock: Arc<ManualClock>,
}

pub fn harness(http: Option<HttpClient>) -> Harness {
    let tools = FakeTools::default();
    let sleeper = NoSleep::default();
    let clock = Arc::new(ManualClock::default());
    let cache = TtlCache::with_clock("test", Duration::from_secs(300), clock.clone());
    let invoker = RetryingInvoker::with_sleeper(tools.clone(), RetryPolicy::default(), sleeper.clone());
    Harness {
        client: WorkspaceClient::new(cache, invoker, http),
        tools,
        sleeper,
        clock,
    }
}
