//! Session state for authenticated API access
//!
//! This module holds the shared session state (bearer token, guest token
//! and its creation time, cookie jar) and its persistence. The session is
//! a pure state container: the guest token manager and the login flow
//! engine are the only writers, and both go through the [`SessionHandle`]
//! so a login attempt holds exclusive access while it mutates state.

pub mod cookies;
pub mod store;

pub use cookies::{Cookie, CookieJar};
pub use store::SessionStore;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared, single-writer handle to the session state
pub type SessionHandle = Arc<Mutex<Session>>;

/// Session state container
#[derive(Debug, Clone)]
pub struct Session {
    /// App-scoped bearer token, immutable for the session's lifetime
    bearer_token: String,
    /// Current guest token, if one has been activated
    pub guest_token: Option<String>,
    /// When the guest token was activated; always set together with it
    pub guest_created_at: Option<DateTime<Utc>>,
    /// Cookie jar, refreshed by merge from every response
    pub cookies: CookieJar,
}

impl Session {
    /// Create a new session with the given bearer token
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            guest_token: None,
            guest_created_at: None,
            cookies: CookieJar::new(),
        }
    }

    /// Wrap a session into a shared handle
    pub fn into_handle(self) -> SessionHandle {
        Arc::new(Mutex::new(self))
    }

    /// The app-scoped bearer token
    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    /// Store a freshly activated guest token, stamping its creation time
    pub fn set_guest_token(&mut self, token: impl Into<String>) {
        self.guest_token = Some(token.into());
        self.guest_created_at = Some(Utc::now());
    }

    /// Age of the current guest token, if one exists
    pub fn guest_token_age(&self) -> Option<chrono::Duration> {
        self.guest_created_at.map(|created| Utc::now() - created)
    }
}
