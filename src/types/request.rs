//! Request type definitions
//!
//! Defines the structure for tweet posting requests.

use serde::{Deserialize, Serialize};

/// Request for posting a tweet
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TweetRequest {
    /// Tweet text
    pub text: String,

    /// Optional id of the tweet being replied to
    pub reply_to: Option<String>,
}

impl TweetRequest {
    /// Create a new request with the given text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply_to: None,
        }
    }

    /// Set the reply target
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Build the JSON body for the posting endpoint
    pub fn to_body(&self) -> serde_json::Value {
        match &self.reply_to {
            Some(id) => serde_json::json!({
                "text": self.text,
                "reply": { "in_reply_to_tweet_id": id },
            }),
            None => serde_json::json!({ "text": self.text }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tweet_request_builder() {
        let request = TweetRequest::new("hello world").with_reply_to("12345");

        assert_eq!(request.text, "hello world");
        assert_eq!(request.reply_to, Some("12345".to_string()));
    }

    #[test]
    fn test_body_without_reply() {
        let body = TweetRequest::new("hello").to_body();
        assert_eq!(body["text"], "hello");
        assert!(body.get("reply").is_none());
    }

    #[test]
    fn test_body_with_reply() {
        let body = TweetRequest::new("hello").with_reply_to("42").to_body();
        assert_eq!(body["reply"]["in_reply_to_tweet_id"], "42");
    }

    #[test]
    fn test_tweet_request_serialization() {
        let request = TweetRequest::new("round trip");
        let json = serde_json::to_string(&request).unwrap();
        let deserialized: TweetRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.text, "round trip");
        assert_eq!(deserialized.reply_to, None);
    }
}
