//! Workspace Client
//!
//! Per-operation entry points. Reads go through the cache with a TTL tier
//! chosen per operation; writes go straight to the tool server and then
//! invalidate the cached reads they make stale.

use serde_json::{json, Value};
use tracing::debug;

use crate::api::tools;
use crate::cache::{CacheKey, CacheStats, FetchOptions, KeyPattern, TtlCache, TtlTier};
use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::retry::{RetryPolicy, RetryingInvoker, Sleeper, TokioSleeper};
use crate::transport::{HttpClient, StdioToolClient, ToolTransport};

// == Workspace Client ==
/// Client for one messaging workspace.
///
/// Owns its cache. Every read method takes a `refresh` flag that skips the
/// cached value and stores the fresh one.
pub struct WorkspaceClient<T, S = TokioSleeper> {
    cache: TtlCache<Value>,
    tools: RetryingInvoker<T, S>,
    http: Option<HttpClient>,
}

impl WorkspaceClient<StdioToolClient> {
    /// Builds a client from configuration.
    ///
    /// The tool server is not started until the first tool call. The HTTP
    /// client is only built when a token is configured; any other failure
    /// building it is returned.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut cache = TtlCache::new(config.cache_namespace.clone(), config.default_ttl());
        if config.cache_disabled {
            cache.disable();
        }
        let policy = RetryPolicy::default().with_max_retries(config.max_retries);
        let tools = RetryingInvoker::new(StdioToolClient::from_config(config), policy);
        let http = match config.token {
            Some(_) => Some(HttpClient::from_config(config)?),
            None => {
                debug!("no token configured, search disabled");
                None
            }
        };
        Ok(Self::new(cache, tools, http))
    }

    /// Stops the tool server if it was started.
    pub async fn shutdown(&self) {
        self.tools.transport().shutdown().await;
    }
}

impl<T: ToolTransport, S: Sleeper> WorkspaceClient<T, S> {
    /// Assembles a client from its parts.
    pub fn new(cache: TtlCache<Value>, tools: RetryingInvoker<T, S>, http: Option<HttpClient>) -> Self {
        Self { cache, tools, http }
    }

    // == Cache Access ==
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) -> usize {
        self.cache.clear()
    }

    pub fn cache_mut(&mut self) -> &mut TtlCache<Value> {
        &mut self.cache
    }

    fn options(tier: TtlTier, refresh: bool) -> FetchOptions {
        FetchOptions::from(tier).bypass(refresh)
    }

    /// Cached tool read.
    async fn cached_tool(
        &mut self,
        key: CacheKey,
        tier: TtlTier,
        refresh: bool,
        tool: &str,
        arguments: Value,
    ) -> Result<Value> {
        let invoker = &self.tools;
        self.cache
            .get_or_fetch(&key, || invoker.call(tool, arguments), Self::options(tier, refresh))
            .await
    }

    // == Reads ==
    /// Lists public channels.
    pub async fn list_channels(
        &mut self,
        limit: Option<u32>,
        cursor: Option<&str>,
        refresh: bool,
    ) -> Result<Value> {
        let key = CacheKey::new(tools::TAG_CHANNELS)
            .with_opt("limit", limit)
            .with_opt("cursor", cursor);
        let args = tool_args([("limit", limit.map(Value::from)), ("cursor", cursor.map(Value::from))]);
        self.cached_tool(key, TtlTier::Medium, refresh, tools::LIST_CHANNELS, args)
            .await
    }

    /// Recent messages in a channel.
    pub async fn channel_history(
        &mut self,
        channel: &str,
        limit: Option<u32>,
        refresh: bool,
    ) -> Result<Value> {
        let key = CacheKey::new(tools::TAG_HISTORY)
            .with("channel", channel)
            .with_opt("limit", limit);
        let args = tool_args([
            ("channel_id", Some(Value::from(channel))),
            ("limit", limit.map(Value::from)),
        ]);
        self.cached_tool(key, TtlTier::Short, refresh, tools::CHANNEL_HISTORY, args)
            .await
    }

    /// Replies in a thread.
    pub async fn thread_replies(&mut self, channel: &str, thread_ts: &str, refresh: bool) -> Result<Value> {
        let key = thread_key(channel, thread_ts);
        let args = json!({ "channel_id": channel, "thread_ts": thread_ts });
        self.cached_tool(key, TtlTier::Short, refresh, tools::THREAD_REPLIES, args)
            .await
    }

    /// Workspace members.
    pub async fn list_users(
        &mut self,
        limit: Option<u32>,
        cursor: Option<&str>,
        refresh: bool,
    ) -> Result<Value> {
        let key = CacheKey::new(tools::TAG_USERS)
            .with_opt("limit", limit)
            .with_opt("cursor", cursor);
        let args = tool_args([("limit", limit.map(Value::from)), ("cursor", cursor.map(Value::from))]);
        self.cached_tool(key, TtlTier::Long, refresh, tools::LIST_USERS, args)
            .await
    }

    /// One member's profile.
    pub async fn user_profile(&mut self, user: &str, refresh: bool) -> Result<Value> {
        let key = CacheKey::new(tools::TAG_USER_PROFILE).with("user", user);
        let args = json!({ "user_id": user });
        self.cached_tool(key, TtlTier::Medium, refresh, tools::USER_PROFILE, args)
            .await
    }

    /// Full-text message search over HTTP. Needs a configured token.
    pub async fn search_messages(
        &mut self,
        query: &str,
        count: Option<u32>,
        refresh: bool,
    ) -> Result<Value> {
        let http = self.http.as_ref().ok_or_else(|| {
            RelayError::Config("search needs SLACKLINE_TOKEN to be set".to_string())
        })?;
        let key = CacheKey::new(tools::TAG_SEARCH)
            .with("query", query)
            .with_opt("count", count);
        let mut params = vec![("query", query.to_string())];
        if let Some(count) = count {
            params.push(("count", count.to_string()));
        }
        self.cache
            .get_or_fetch(
                &key,
                || async move { http.get(tools::SEARCH_METHOD, &params).await },
                Self::options(TtlTier::Short, refresh),
            )
            .await
    }

    // == Writes ==
    /// Posts a message and drops the channel's cached history.
    pub async fn post_message(&mut self, channel: &str, text: &str) -> Result<Value> {
        let result = self
            .tools
            .call(tools::POST_MESSAGE, json!({ "channel_id": channel, "text": text }))
            .await?;
        let removed = self
            .cache
            .invalidate_pattern(&KeyPattern::tag_with(tools::TAG_HISTORY, "channel", channel));
        debug!(channel, removed, "history invalidated after post");
        Ok(result)
    }

    /// Replies in a thread and drops that thread's cached replies plus the
    /// channel's cached history.
    pub async fn reply_to_thread(&mut self, channel: &str, thread_ts: &str, text: &str) -> Result<Value> {
        let result = self
            .tools
            .call(
                tools::REPLY_TO_THREAD,
                json!({ "channel_id": channel, "thread_ts": thread_ts, "text": text }),
            )
            .await?;
        self.cache.invalidate(&thread_key(channel, thread_ts));
        self.cache
            .invalidate_pattern(&KeyPattern::tag_with(tools::TAG_HISTORY, "channel", channel));
        Ok(result)
    }

    /// Adds a reaction and drops cached history and threads for the channel.
    pub async fn add_reaction(&mut self, channel: &str, timestamp: &str, reaction: &str) -> Result<Value> {
        let result = self
            .tools
            .call(
                tools::ADD_REACTION,
                json!({ "channel_id": channel, "timestamp": timestamp, "reaction": reaction }),
            )
            .await?;
        // The message may be a thread reply whose thread ts we don't know
        let in_channel = KeyPattern::custom(format!("channel={}", channel), {
            let channel = channel.to_string();
            move |key| {
                (key.tag() == tools::TAG_HISTORY || key.tag() == tools::TAG_THREAD)
                    && key.param("channel") == Some(channel.as_str())
            }
        });
        self.cache.invalidate_pattern(&in_channel);
        Ok(result)
    }
}

fn thread_key(channel: &str, thread_ts: &str) -> CacheKey {
    CacheKey::new(tools::TAG_THREAD)
        .with("channel", channel)
        .with("ts", thread_ts)
}

/// JSON object from optional members, leaving out the absent ones.
fn tool_args<const N: usize>(members: [(&str, Option<Value>); N]) -> Value {
    Value::Object(
        members
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
            .collect(),
    )
}
