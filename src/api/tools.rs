//! Tool names, HTTP methods and cache key tags used by the client.

// Tool server calls
pub const LIST_CHANNELS: &str = "slack_list_channels";
pub const CHANNEL_HISTORY: &str = "slack_get_channel_history";
pub const THREAD_REPLIES: &str = "slack_get_thread_replies";
pub const LIST_USERS: &str = "slack_get_users";
pub const USER_PROFILE: &str = "slack_get_user_profile";
pub const POST_MESSAGE: &str = "slack_post_message";
pub const REPLY_TO_THREAD: &str = "slack_reply_to_thread";
pub const ADD_REACTION: &str = "slack_add_reaction";

// HTTP API methods
pub const SEARCH_METHOD: &str = "search.messages";

// Cache key tags
pub const TAG_CHANNELS: &str = "channels";
pub const TAG_HISTORY: &str = "history";
pub const TAG_THREAD: &str = "thread";
pub const TAG_USERS: &str = "users";
pub const TAG_USER_PROFILE: &str = "user_profile";
pub const TAG_SEARCH: &str = "search";
