//! CLI type definitions
//!
//! Clap command structures and the dispatcher that maps each command onto a
//! workspace client call.

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::api::WorkspaceClient;
use crate::error::Result;
use crate::retry::Sleeper;
use crate::transport::ToolTransport;

#[derive(Debug, Parser)]
#[command(name = "slackline")]
#[command(about = "Query and post to a messaging workspace", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Never read or write the cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Ignore cached results but store the fresh ones
    #[arg(long, global = true)]
    pub refresh: bool,

    /// Print cache statistics to stderr when done
    #[arg(long, global = true)]
    pub stats: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List public channels
    Channels {
        /// Maximum number of channels
        #[arg(short, long)]
        limit: Option<u32>,
        /// Pagination cursor from a previous call
        #[arg(long)]
        cursor: Option<String>,
    },

    /// Show recent messages in a channel
    History {
        /// Channel ID
        channel: String,
        /// Maximum number of messages
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show replies in a thread
    Thread {
        /// Channel ID
        channel: String,
        /// Timestamp of the parent message
        ts: String,
    },

    /// Post a message to a channel
    Post {
        /// Channel ID
        channel: String,
        /// Message text
        text: String,
    },

    /// Reply in a thread
    Reply {
        /// Channel ID
        channel: String,
        /// Timestamp of the parent message
        ts: String,
        /// Reply text
        text: String,
    },

    /// Add a reaction to a message
    React {
        /// Channel ID
        channel: String,
        /// Timestamp of the message
        ts: String,
        /// Emoji name without colons
        emoji: String,
    },

    /// List workspace members
    Users {
        /// Maximum number of users
        #[arg(short, long)]
        limit: Option<u32>,
        /// Pagination cursor from a previous call
        #[arg(long)]
        cursor: Option<String>,
    },

    /// Show one member's profile
    User {
        /// User ID
        user: String,
    },

    /// Search messages (needs SLACKLINE_TOKEN)
    Search {
        /// Search query
        query: String,
        /// Maximum number of matches
        #[arg(short, long)]
        count: Option<u32>,
    },
}

/// Runs one command against `client`.
pub async fn dispatch<T: ToolTransport, S: Sleeper>(
    client: &mut WorkspaceClient<T, S>,
    command: &Commands,
    refresh: bool,
) -> Result<Value> {
    match command {
        Commands::Channels { limit, cursor } => {
            client.list_channels(*limit, cursor.as_deref(), refresh).await
        }
        Commands::History { channel, limit } => {
            client.channel_history(channel, *limit, refresh).await
        }
        Commands::Thread { channel, ts } => client.thread_replies(channel, ts, refresh).await,
        Commands::Post { channel, text } => client.post_message(channel, text).await,
        Commands::Reply { channel, ts, text } => client.reply_to_thread(channel, ts, text).await,
        Commands::React { channel, ts, emoji } => {
            client
                .add_reaction(channel, ts, emoji.trim_matches(':'))
                .await
        }
        Commands::Users { limit, cursor } => {
            client.list_users(*limit, cursor.as_deref(), refresh).await
        }
        Commands::User { user } => client.user_profile(user, refresh).await,
        Commands::Search { query, count } => client.search_messages(query, *count, refresh).await,
    }
}
