//! Command-line interface for posting through an authenticated session
//!
//! Logs in (or restores a saved session), then runs one operation and
//! prints its result to stdout as JSON. Logs go to stderr so the JSON
//! output stays machine-readable.
//!
//! # Usage
//!
//! ```bash
//! twitter-post post "hello world"
//! twitter-post post --reply-to 1234567890 "replying"
//! twitter-post delete 1234567890
//! twitter-post verify
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use twitter_flow_client::{
    TweetRequest, TwitterClient,
    config::ConfigLoader,
    session::SessionStore,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "twitter-post")]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not load or save session cookies
    #[arg(long)]
    no_session_store: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Post a tweet
    Post {
        /// Tweet text
        text: String,

        /// Id of the tweet to reply to
        #[arg(short, long, value_name = "TWEET_ID")]
        reply_to: Option<String>,
    },
    /// Delete a tweet by id
    Delete {
        /// Id of the tweet to delete
        id: String,
    },
    /// Check whether the configured credentials yield a valid session
    Verify,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loader = ConfigLoader::new();
    let settings = loader.load(cli.config.as_deref())?;

    // Precedence: RUST_LOG, then --verbose, then the config file's level.
    let default_level = if cli.verbose || settings.logging.verbose {
        "debug".to_string()
    } else {
        settings.logging.level.clone()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut client = TwitterClient::new(settings)?;
    if !cli.no_session_store {
        match SessionStore::default_location() {
            Ok(store) => client = client.with_session_store(store),
            Err(e) => debug!("Session store unavailable: {}", e),
        }
    }

    client.initialize().await?;

    match cli.command {
        Command::Post { text, reply_to } => {
            let mut request = TweetRequest::new(text);
            if let Some(id) = reply_to {
                request = request.with_reply_to(id);
            }

            let result = client.post_tweet(&request).await?;
            println!("{}", serde_json::to_string(&result)?);
            if !result.is_success() {
                std::process::exit(1);
            }
        }
        Command::Delete { id } => {
            let deleted = client.delete_tweet(&id).await;
            println!("{}", serde_json::json!({ "deleted": deleted }));
            if !deleted {
                std::process::exit(1);
            }
        }
        Command::Verify => {
            let valid = client.verify().await?;
            println!("{}", serde_json::json!({ "logged_in": valid }));
            if !valid {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
