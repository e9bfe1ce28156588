//! Type definitions for requests, responses, and credentials
//!
//! This module contains the public data types exchanged with the client:
//! credential groups, tweet requests, and structured posting results.

pub mod credentials;
pub mod request;
pub mod response;

pub use credentials::Credentials;
pub use request::TweetRequest;
pub use response::{ApiErrorEntry, PostedTweet, TweetResult};

pub(crate) use response::{DeleteEnvelope, TweetEnvelope};
