//! Warm-up Retry Module
//!
//! Retries tool calls that fail because the tool server has not finished
//! loading its internal cache. Every other failure is returned at once.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{RelayError, Result};
use crate::models::parse_text;
use crate::transport::ToolTransport;

/// Error text the tool server reports while it is still warming up.
pub const WARMUP_SIGNATURE: &str = "cache not initialized";

// == Sleeper ==
/// Waits between attempts. Swapped out in tests to avoid real delays.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// == Retry Policy ==
/// Exponential backoff settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Retries after the initial call
    pub max_retries: u32,
}

impl RetryPolicy {
    /// Creates a policy.
    ///
    /// # Arguments
    /// * `base_delay` - Delay before the first retry
    /// * `max_delay` - Cap applied to every delay
    /// * `max_retries` - Retries allowed after the initial call
    pub fn new(base_delay: Duration, max_delay: Duration, max_retries: u32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_retries,
        }
    }

    /// Same backoff, different retry budget.
    pub fn with_max_retries(self, max_retries: u32) -> Self {
        Self {
            max_retries,
            ..self
        }
    }

    /// Delay before retry number `attempt_index` (0-based):
    /// `min(base_delay * 2^attempt_index, max_delay)`.
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt_index).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Longest total wait before the policy gives up.
    pub fn worst_case_wait(&self) -> Duration {
        (0..self.max_retries).map(|i| self.delay_for(i)).sum()
    }
}

impl Default for RetryPolicy {
    /// 500 ms base, 16 s cap, 6 retries.
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_millis(16_000), 6)
    }
}

// == Retry State ==
/// Progress through one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    pub attempts_remaining: u32,
    pub attempt_index: u32,
}

impl RetryState {
    fn start(policy: &RetryPolicy) -> Self {
        Self {
            attempts_remaining: policy.max_retries,
            attempt_index: 0,
        }
    }

    fn next(self) -> Self {
        Self {
            attempts_remaining: self.attempts_remaining - 1,
            attempt_index: self.attempt_index + 1,
        }
    }
}

// == Retry Loop ==
/// Runs `operation` until it succeeds, fails with anything other than
/// [`RelayError::Transient`], or runs out of retries.
///
/// Running out of retries yields [`RelayError::RetriesExhausted`] carrying
/// the last transient message.
pub async fn retry_transient<T, F, Fut, S>(
    policy: &RetryPolicy,
    sleeper: &S,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    S: Sleeper + ?Sized,
{
    let mut state = RetryState::start(policy);

    loop {
        match operation().await {
            Ok(value) => {
                if state.attempt_index > 0 {
                    debug!("Call succeeded after {} retries", state.attempt_index);
                }
                return Ok(value);
            }
            Err(RelayError::Transient(message)) if state.attempts_remaining > 0 => {
                let delay = policy.delay_for(state.attempt_index);
                warn!(
                    "Attempt {} hit warm-up error: {}. Retrying in {:?}",
                    state.attempt_index + 1,
                    message,
                    delay
                );
                sleeper.sleep(delay).await;
                state = state.next();
            }
            Err(RelayError::Transient(message)) => {
                let attempts = state.attempt_index + 1;
                warn!("Giving up after {} attempts: {}", attempts, message);
                return Err(RelayError::RetriesExhausted { attempts, message });
            }
            Err(err) => return Err(err),
        }
    }
}

type Classifier = Box<dyn Fn(&str) -> bool + Send + Sync>;

// == Retrying Invoker ==
/// Tool transport wrapper that decodes results and retries warm-up failures.
pub struct RetryingInvoker<T, S = TokioSleeper> {
    transport: T,
    policy: RetryPolicy,
    sleeper: S,
    is_transient: Classifier,
}

impl<T: ToolTransport> RetryingInvoker<T> {
    /// Wraps `transport` with the given policy and the default warm-up
    /// signature.
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self::with_sleeper(transport, policy, TokioSleeper)
    }
}

impl<T: ToolTransport, S: Sleeper> RetryingInvoker<T, S> {
    /// Wraps `transport` with a custom sleeper.
    pub fn with_sleeper(transport: T, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            transport,
            policy,
            sleeper,
            is_transient: Box::new(|message: &str| message.contains(WARMUP_SIGNATURE)),
        }
    }

    /// Replaces the test deciding which error texts are worth retrying.
    pub fn with_classifier(
        mut self,
        classifier: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_transient = Box::new(classifier);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Calls tool `name` and returns its decoded payload.
    ///
    /// The first text item of the result is parsed as JSON, falling back
    /// to the raw string.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value> {
        retry_transient(&self.policy, &self.sleeper, || {
            self.call_once(name, arguments.clone())
        })
        .await
    }

    async fn call_once(&self, name: &str, arguments: Value) -> Result<Value> {
        let result = match self.transport.call_tool(name, arguments).await {
            Ok(result) => result,
            Err(RelayError::Protocol(message)) if (self.is_transient)(&message) => {
                return Err(RelayError::Transient(message));
            }
            Err(err) => return Err(err),
        };

        if result.is_error {
            let message = result
                .first_text()
                .unwrap_or("tool returned an error without text")
                .to_string();
            return Err(if (self.is_transient)(&message) {
                RelayError::Transient(message)
            } else {
                RelayError::Tool(message)
            });
        }

        result
            .first_text()
            .map(parse_text)
            .ok_or_else(|| RelayError::Protocol(format!("{} returned no text content", name)))
    }
}
