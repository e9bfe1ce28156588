//! Guest token bootstrap
//!
//! Obtains and refreshes the app-scoped guest token against the
//! platform's activation endpoint. Tokens stay valid for roughly three
//! hours; `ensure_fresh` reactivates once that age is exceeded, retrying
//! transient failures with exponential backoff before surfacing an
//! error. The platform sets tracking cookies on every activation
//! response, so the cookie jar is merged even when activation fails.

use crate::retry::RetryPolicy;
use crate::session::SessionHandle;
use crate::{Error, Result, auth::headers, limit::RateLimiter};
use chrono::Duration;
use reqwest::Client;
use reqwest::header::HeaderMap;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

/// Maximum guest token age before reactivation
const MAX_TOKEN_AGE_HOURS: i64 = 3;

/// Manages the guest token lifecycle
#[derive(Debug)]
pub struct GuestTokenManager {
    /// HTTP client for requests
    http: Client,
    /// Base URL of the platform API
    base_url: String,
    /// Shared session state
    session: SessionHandle,
    /// Pacing gate for outbound calls
    limiter: Arc<RateLimiter>,
    /// Retry policy for activation attempts
    retry_policy: RetryPolicy,
}

impl GuestTokenManager {
    /// Create a new guest token manager
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        session: SessionHandle,
        limiter: Arc<RateLimiter>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            session,
            limiter,
            retry_policy,
        }
    }

    /// Ensure the session holds a guest token younger than three hours,
    /// activating a new one when necessary
    ///
    /// Activation is retried with exponential backoff; the error returned
    /// after exhaustion is the final attempt's failure.
    pub async fn ensure_fresh(&self) -> Result<()> {
        {
            let session = self.session.lock().await;
            if session.guest_token.is_some()
                && let Some(age) = session.guest_token_age()
                && age < Duration::hours(MAX_TOKEN_AGE_HOURS)
            {
                debug!("Guest token still fresh ({}s old)", age.num_seconds());
                return Ok(());
            }
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.activate().await {
                Ok(()) => return Ok(()),
                Err(e) => match self.retry_policy.delay_after(attempt) {
                    Some(delay) => {
                        warn!(
                            "Guest activation failed on attempt {}: {}; retrying in {:?}",
                            attempt, e, delay
                        );
                        sleep(delay).await;
                    }
                    None => {
                        warn!("Guest activation failed after {} attempts: {}", attempt, e);
                        return Err(e);
                    }
                },
            }
        }
    }

    /// Perform a guest activation call and store the returned token
    async fn activate(&self) -> Result<()> {
        let url = format!("{}/1.1/guest/activate.json", self.base_url);
        let parsed_url = Url::parse(&url)
            .map_err(|e| Error::config(format!("Invalid activation URL: {}", e)))?;

        let mut request_headers = HeaderMap::new();
        {
            let session = self.session.lock().await;
            headers::install(&session, &mut request_headers)?;
        }

        self.limiter.wait_for_next().await;
        let response = self.http.post(&url).headers(request_headers).send().await?;

        let status = response.status();
        let response_headers = response.headers().clone();

        // Tracking cookies arrive on every response, success or not.
        {
            let mut session = self.session.lock().await;
            session
                .cookies
                .merge_from_headers(&response_headers, &parsed_url);
        }

        if !status.is_success() {
            return Err(Error::token(format!(
                "Activation returned status {}",
                status
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::token(format!("Activation body unreadable: {}", e)))?;

        let token = body
            .get("guest_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| Error::token("Activation response missing guest_token string"))?;

        let mut session = self.session.lock().await;
        session.set_guest_token(token);
        info!("Activated guest token");
        Ok(())
    }
}
