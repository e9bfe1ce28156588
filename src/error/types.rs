//! Error type definitions
//!
//! Defines the error taxonomy of the crate. Posting failures reported by
//! the platform as structured error lists are data, not errors; they
//! surface through `TweetResult`, and the variants here cover everything
//! else: configuration, authentication, protocol, and transport.

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Twitter flow client
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A credential group is incomplete; names every absent field
    #[error("Missing credentials: {missing}")]
    CredentialsMissing { missing: String },

    /// Guest token activation or refresh failed
    #[error("Guest token error: {reason}")]
    Token { reason: String },

    /// The login flow presented a subtask the client does not understand
    #[error("Unrecognized login subtask: {subtask}")]
    Protocol { subtask: String },

    /// The platform demanded a one-time code and no secret was supplied
    #[error("Two-factor authentication required but no secret is configured")]
    TwoFactorRequired,

    /// A login step exhausted its retry budget; wraps the final cause
    #[error("Login failed: {0}")]
    LoginFailed(#[source] Box<Error>),

    /// Session state errors, including use before initialization
    #[error("Session error: {0}")]
    Session(String),

    /// One-time code generation failed
    #[error("One-time code error: {reason}")]
    Otp { reason: String },

    /// A structured error returned by the platform API
    #[error("API error {code}: {message}")]
    Api { code: i32, message: String },

    /// Network/HTTP errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal errors that should not occur in normal operation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing-credentials error from the absent field names
    pub fn credentials_missing(missing: impl Into<String>) -> Self {
        Self::CredentialsMissing {
            missing: missing.into(),
        }
    }

    /// Create a guest token error
    pub fn token(reason: impl Into<String>) -> Self {
        Self::Token {
            reason: reason.into(),
        }
    }

    /// Create a protocol error naming the unrecognized subtask
    pub fn protocol(subtask: impl Into<String>) -> Self {
        Self::Protocol {
            subtask: subtask.into(),
        }
    }

    /// Wrap the final cause of a failed login
    pub fn login_failed(source: Error) -> Self {
        Self::LoginFailed(Box::new(source))
    }

    /// Create a session error
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Create a one-time code error
    pub fn otp(reason: impl Into<String>) -> Self {
        Self::Otp {
            reason: reason.into(),
        }
    }

    /// Create an API error with the platform's code and message
    pub fn api(code: i32, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
