//! Twitter Flow Client
//!
//! An authentication and posting client for the platform's undocumented
//! web API. The crate implements the guest-token bootstrap, the
//! interactive login flow state machine (conditional subtasks, CSRF
//! rotation, two-factor challenges), request pacing, and a retrying
//! posting client.
//!
//! # Architecture
//!
//! Authentication state lives in a single shared [`session::Session`];
//! the [`auth::GuestTokenManager`] and [`auth::LoginFlowEngine`] write to
//! it through an exclusive handle, and every outbound call passes the
//! shared [`limit::RateLimiter`] pacing gate.
//!
//! # Usage
//!
//! ```rust,no_run
//! use twitter_flow_client::{Settings, TwitterClient, TweetRequest};
//!
//! # async fn example() -> twitter_flow_client::Result<()> {
//! let settings = Settings::from_env()?;
//! let mut client = TwitterClient::new(settings)?;
//! client.initialize().await?;
//!
//! let result = client.post_tweet(&TweetRequest::new("hello")).await?;
//! if let Some(tweet) = result.tweet() {
//!     println!("posted {}", tweet.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod limit;
pub mod retry;
pub mod session;
pub mod types;

pub use client::TwitterClient;
pub use config::Settings;
pub use error::{Error, Result};
pub use types::{ApiErrorEntry, PostedTweet, TweetRequest, TweetResult};
