//! Integration Tests for the Workspace Client
//!
//! Drives the client against a scripted tool transport to check caching,
//! TTL tiers, write invalidation and warm-up retries end to end.

mod common;

use std::time::Duration;

use serde_json::json;

use common::harness;
use slackline::api::tools;
use slackline::cache::TtlTier;
use slackline::models::ToolResult;
use slackline::RelayError;

fn history_reply(text: &str) -> ToolResult {
    ToolResult::text(json!({ "ok": true, "messages": [{ "text": text }] }).to_string())
}

// == Read Caching ==

#[tokio::test]
async fn test_history_is_cached() {
    let mut h = harness(None);
    h.tools.reply(tools::CHANNEL_HISTORY, history_reply("hello"));

    let first = h.client.channel_history("C1", Some(10), false).await.unwrap();
    let second = h.client.channel_history("C1", Some(10), false).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first["messages"][0]["text"], "hello");
    assert_eq!(h.tools.count(tools::CHANNEL_HISTORY), 1);
    let stats = h.client.cache_stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
}

#[tokio::test]
async fn test_tool_arguments_omit_absent_options() {
    let mut h = harness(None);
    h.tools.reply(tools::LIST_CHANNELS, ToolResult::text("{}"));

    h.client.list_channels(None, None, false).await.unwrap();

    let calls = h.tools.calls();
    assert_eq!(calls[0].0, tools::LIST_CHANNELS);
    assert_eq!(calls[0].1, json!({}));
}

#[tokio::test]
async fn test_different_params_are_different_entries() {
    let mut h = harness(None);
    h.tools.reply(tools::CHANNEL_HISTORY, history_reply("x"));

    h.client.channel_history("C1", Some(10), false).await.unwrap();
    h.client.channel_history("C1", Some(20), false).await.unwrap();
    h.client.channel_history("C2", Some(10), false).await.unwrap();

    assert_eq!(h.tools.count(tools::CHANNEL_HISTORY), 3);
}

#[tokio::test]
async fn test_short_tier_expires_before_long_tier() {
    let mut h = harness(None);
    h.tools.reply(tools::CHANNEL_HISTORY, history_reply("x"));
    h.tools.reply(tools::LIST_USERS, ToolResult::text(r#"{"members":[]}"#));

    h.client.channel_history("C1", None, false).await.unwrap();
    h.client.list_users(None, None, false).await.unwrap();

    h.clock.advance(TtlTier::Short.duration() + Duration::from_secs(1));
    h.client.channel_history("C1", None, false).await.unwrap();
    h.client.list_users(None, None, false).await.unwrap();

    assert_eq!(h.tools.count(tools::CHANNEL_HISTORY), 2);
    assert_eq!(h.tools.count(tools::LIST_USERS), 1);
}

#[tokio::test]
async fn test_profile_uses_medium_tier() {
    let mut h = harness(None);
    h.tools.reply(tools::USER_PROFILE, ToolResult::text(r#"{"profile":{}}"#));

    h.client.user_profile("U1", false).await.unwrap();
    h.clock.advance(TtlTier::Short.duration() + Duration::from_secs(1));
    h.client.user_profile("U1", false).await.unwrap();
    assert_eq!(h.tools.count(tools::USER_PROFILE), 1);

    h.clock.advance(TtlTier::Medium.duration());
    h.client.user_profile("U1", false).await.unwrap();
    assert_eq!(h.tools.count(tools::USER_PROFILE), 2);
}

#[tokio::test]
async fn test_refresh_skips_read_but_writes() {
    let mut h = harness(None);
    h.tools
        .reply(tools::THREAD_REPLIES, ToolResult::text(r#"{"n":1}"#))
        .reply(tools::THREAD_REPLIES, ToolResult::text(r#"{"n":2}"#));

    let first = h.client.thread_replies("C1", "100.1", false).await.unwrap();
    let refreshed = h.client.thread_replies("C1", "100.1", true).await.unwrap();
    let cached = h.client.thread_replies("C1", "100.1", false).await.unwrap();

    assert_eq!(first, json!({ "n": 1 }));
    assert_eq!(refreshed, json!({ "n": 2 }));
    assert_eq!(cached, json!({ "n": 2 }));
    assert_eq!(h.tools.count(tools::THREAD_REPLIES), 2);
}

#[tokio::test]
async fn test_disabled_cache_always_calls_tool() {
    let mut h = harness(None);
    h.tools.reply(tools::LIST_CHANNELS, ToolResult::text("{}"));
    h.client.cache_mut().disable();

    h.client.list_channels(None, None, false).await.unwrap();
    h.client.list_channels(None, None, false).await.unwrap();

    assert_eq!(h.tools.count(tools::LIST_CHANNELS), 2);
    assert_eq!(h.client.cache_stats().misses, 2);
    assert_eq!(h.client.cache_stats().hits, 0);
}

#[tokio::test]
async fn test_tool_error_is_not_cached() {
    let mut h = harness(None);
    h.tools
        .reply(tools::CHANNEL_HISTORY, ToolResult::error("channel_not_found"))
        .reply(tools::CHANNEL_HISTORY, history_reply("back"));

    let err = h.client.channel_history("C9", None, false).await.unwrap_err();
    assert!(matches!(err, RelayError::Tool(_)));
    assert!(h.client.cache_mut().is_empty());

    let ok = h.client.channel_history("C9", None, false).await.unwrap();
    assert_eq!(ok["messages"][0]["text"], "back");
    assert!(h.sleeper.delays.lock().unwrap().is_empty());
}

// == Write Invalidation ==

#[tokio::test]
async fn test_post_invalidates_only_that_channels_history() {
    let mut h = harness(None);
    h.tools
        .reply(tools::CHANNEL_HISTORY, history_reply("x"))
        .reply(tools::THREAD_REPLIES, ToolResult::text("{}"))
        .reply(tools::POST_MESSAGE, ToolResult::text(r#"{"ok":true,"ts":"200.2"}"#));

    h.client.channel_history("C1", Some(10), false).await.unwrap();
    h.client.channel_history("C1", Some(50), false).await.unwrap();
    h.client.channel_history("C2", Some(10), false).await.unwrap();
    h.client.thread_replies("C1", "100.1", false).await.unwrap();

    let posted = h.client.post_message("C1", "hi").await.unwrap();
    assert_eq!(posted["ts"], "200.2");
    assert_eq!(h.client.cache_stats().invalidations, 2);

    h.client.channel_history("C1", Some(10), false).await.unwrap();
    h.client.channel_history("C2", Some(10), false).await.unwrap();
    h.client.thread_replies("C1", "100.1", false).await.unwrap();

    assert_eq!(h.tools.count(tools::CHANNEL_HISTORY), 4);
    assert_eq!(h.tools.count(tools::THREAD_REPLIES), 1);
}

#[tokio::test]
async fn test_failed_post_invalidates_nothing() {
    let mut h = harness(None);
    h.tools
        .reply(tools::CHANNEL_HISTORY, history_reply("x"))
        .reply(tools::POST_MESSAGE, ToolResult::error("not_in_channel"));

    h.client.channel_history("C1", None, false).await.unwrap();
    assert!(h.client.post_message("C1", "hi").await.is_err());
    h.client.channel_history("C1", None, false).await.unwrap();

    assert_eq!(h.tools.count(tools::CHANNEL_HISTORY), 1);
    assert_eq!(h.client.cache_stats().invalidations, 0);
}

#[tokio::test]
async fn test_reply_invalidates_that_thread() {
    let mut h = harness(None);
    h.tools
        .reply(tools::THREAD_REPLIES, ToolResult::text("{}"))
        .reply(tools::REPLY_TO_THREAD, ToolResult::text(r#"{"ok":true}"#));

    h.client.thread_replies("C1", "100.1", false).await.unwrap();
    h.client.thread_replies("C1", "300.3", false).await.unwrap();
    h.client.reply_to_thread("C1", "100.1", "me too").await.unwrap();
    h.client.thread_replies("C1", "100.1", false).await.unwrap();
    h.client.thread_replies("C1", "300.3", false).await.unwrap();

    assert_eq!(h.tools.count(tools::THREAD_REPLIES), 3);
    let (_, args) = h
        .tools
        .calls()
        .into_iter()
        .find(|(name, _)| name == tools::REPLY_TO_THREAD)
        .unwrap();
    assert_eq!(args, json!({ "channel_id": "C1", "thread_ts": "100.1", "text": "me too" }));
}

#[tokio::test]
async fn test_reaction_invalidates_channel_reads() {
    let mut h = harness(None);
    h.tools
        .reply(tools::CHANNEL_HISTORY, history_reply("x"))
        .reply(tools::THREAD_REPLIES, ToolResult::text("{}"))
        .reply(tools::LIST_CHANNELS, ToolResult::text("{}"))
        .reply(tools::ADD_REACTION, ToolResult::text(r#"{"ok":true}"#));

    h.client.channel_history("C1", None, false).await.unwrap();
    h.client.thread_replies("C1", "100.1", false).await.unwrap();
    h.client.list_channels(None, None, false).await.unwrap();

    h.client.add_reaction("C1", "100.5", "thumbsup").await.unwrap();

    assert_eq!(h.client.cache_stats().invalidations, 2);
    assert_eq!(h.client.cache_mut().len(), 1);
}

// == Warm-up Retries ==

#[tokio::test]
async fn test_users_retry_through_warmup() {
    let mut h = harness(None);
    h.tools
        .reply(tools::LIST_USERS, ToolResult::error("users cache not initialized"))
        .reply(tools::LIST_USERS, ToolResult::error("users cache not initialized"))
        .reply(tools::LIST_USERS, ToolResult::text(r#"{"members":["U1"]}"#));

    let users = h.client.list_users(None, None, false).await.unwrap();

    assert_eq!(users["members"][0], "U1");
    assert_eq!(h.tools.count(tools::LIST_USERS), 3);
    assert_eq!(
        *h.sleeper.delays.lock().unwrap(),
        vec![Duration::from_millis(500), Duration::from_millis(1000)]
    );
    assert_eq!(h.client.cache_stats().misses, 1);
    assert_eq!(h.client.cache_stats().sets, 1);
}

#[tokio::test]
async fn test_warmup_exhaustion_surfaces_last_message() {
    let mut h = harness(None);
    h.tools
        .reply(tools::LIST_USERS, ToolResult::error("users cache not initialized"));

    let err = h.client.list_users(None, None, false).await.unwrap_err();

    match err {
        RelayError::RetriesExhausted { attempts, message } => {
            assert_eq!(attempts, 7);
            assert!(message.contains("not initialized"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let total: Duration = h.sleeper.delays.lock().unwrap().iter().sum();
    assert_eq!(total, Duration::from_millis(31_500));
    assert!(h.client.cache_mut().is_empty());
}

// == Search Without HTTP ==

#[tokio::test]
async fn test_search_without_http_is_config_error() {
    let mut h = harness(None);

    let err = h.client.search_messages("deploy", None, false).await.unwrap_err();

    assert!(matches!(err, RelayError::Config(_)));
    assert!(h.tools.calls().is_empty());
}
