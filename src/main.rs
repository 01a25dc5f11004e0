//! Slackline - messaging workspace CLI
//!
//! Runs one workspace operation per invocation through a namespaced TTL
//! cache and prints the result as JSON.

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slackline::cli::{dispatch, Cli};
use slackline::{Config, WorkspaceClient};

/// Main entry point for the slackline CLI.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber on stderr
/// 2. Parse arguments and load configuration from environment variables
/// 3. Build the workspace client with its cache
/// 4. Run the command and print the JSON result on stdout
/// 5. Stop the tool server if one was started
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "warn", can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slackline=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    config.cache_disabled |= cli.no_cache;
    info!(
        "Configuration loaded: namespace={}, default_ttl={}s, max_retries={}, cache_disabled={}",
        config.cache_namespace, config.default_ttl, config.max_retries, config.cache_disabled
    );

    let mut client =
        WorkspaceClient::from_config(&config).context("failed to build workspace client")?;
    let outcome = dispatch(&mut client, &cli.command, cli.refresh).await;
    client.shutdown().await;

    if cli.stats {
        let stats = client.cache_stats();
        eprintln!("{}", serde_json::to_string(&stats)?);
    }
    debug!(stats = ?client.cache_stats(), "Done");

    let value = outcome.context("command failed")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&value).context("failed to render result")?
    );
    Ok(())
}
