//! Response type definitions
//!
//! Defines the structured posting result and the wire shapes returned by
//! the posting/deletion endpoints. A [`TweetResult`] is either a posted
//! tweet or a non-empty list of structured errors, never both and never
//! neither; the enum makes that invariant structural.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A successfully created tweet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostedTweet {
    /// Platform-assigned tweet id
    pub id: String,
    /// Tweet text as stored by the platform
    pub text: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A structured error entry returned by the platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiErrorEntry {
    /// Platform error code
    pub code: i32,
    /// Human-readable message
    pub message: String,
}

impl ApiErrorEntry {
    /// Create a new error entry
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Outcome of a posting attempt: success or a non-empty error list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TweetResult {
    /// The tweet was created
    Posted(PostedTweet),
    /// All attempts failed; carries the errors of the final attempt
    Failed(Vec<ApiErrorEntry>),
}

impl TweetResult {
    /// Whether the posting attempt succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Posted(_))
    }

    /// The posted tweet, if any
    pub fn tweet(&self) -> Option<&PostedTweet> {
        match self {
            Self::Posted(tweet) => Some(tweet),
            Self::Failed(_) => None,
        }
    }

    /// The structured errors, empty on success
    pub fn errors(&self) -> &[ApiErrorEntry] {
        match self {
            Self::Posted(_) => &[],
            Self::Failed(errors) => errors,
        }
    }
}

/// Wire shape of the posting endpoint response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TweetEnvelope {
    pub data: Option<TweetData>,
    pub errors: Option<Vec<ApiErrorEntry>>,
}

/// Wire shape of the created-content payload
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TweetData {
    pub id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl TweetData {
    /// Promote the wire payload to a [`PostedTweet`], defaulting the
    /// timestamp to receive time when the platform omits it
    pub fn into_posted(self) -> PostedTweet {
        PostedTweet {
            id: self.id,
            text: self.text,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// Wire shape of the deletion endpoint response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DeleteEnvelope {
    pub data: Option<DeleteData>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DeleteData {
    pub deleted: bool,
}
