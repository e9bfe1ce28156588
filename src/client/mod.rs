//! High-level posting client
//!
//! [`TwitterClient`] ties the pieces together: it owns the shared session,
//! runs initialization (session restore or interactive login), and exposes
//! posting, deletion, and credential verification. Posting failures are
//! data, not errors: `post_tweet` returns a [`TweetResult`] and reserves
//! `Err` for misuse and local failures.

use crate::auth::{GuestTokenManager, LoginFlowEngine, headers};
use crate::config::Settings;
use crate::limit::RateLimiter;
use crate::retry::RetryPolicy;
use crate::session::{CookieJar, Session, SessionHandle, SessionStore};
use crate::types::{
    ApiErrorEntry, Credentials, DeleteEnvelope, PostedTweet, TweetEnvelope, TweetRequest,
    TweetResult,
};
use crate::{Error, Result};
use reqwest::Client;
use reqwest::header::HeaderMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

/// Browser user-agent presented on every request
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Outcome of a single posting attempt
enum Attempt {
    Posted(PostedTweet),
    Rejected(Vec<ApiErrorEntry>),
}

/// Client for posting to the platform after authenticating
#[derive(Debug)]
pub struct TwitterClient {
    /// HTTP client for requests
    http: Client,
    /// Base URL of the platform API
    base_url: String,
    /// Shared session state
    session: SessionHandle,
    /// Pacing gate shared by every outbound call
    limiter: Arc<RateLimiter>,
    /// Account credentials
    credentials: Credentials,
    /// Login flow engine
    engine: LoginFlowEngine,
    /// Guest token bootstrap, used when restoring a saved session
    guest: GuestTokenManager,
    /// Retry policy for posting attempts
    retry_policy: RetryPolicy,
    /// Optional cookie persistence
    store: Option<SessionStore>,
    /// Set once initialization has completed successfully
    initialized: bool,
    /// Whether an authenticated user session is established
    logged_in: bool,
    /// Whether the secondary posting-API key set is available
    api_auth: bool,
}

impl TwitterClient {
    /// Create a new client from validated settings
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let http = Client::builder().user_agent(USER_AGENT).build()?;
        let session = Session::new(settings.api.bearer_token.clone()).into_handle();
        let limiter = Arc::new(RateLimiter::from_settings(&settings.rate_limit));
        let credentials = Credentials::from(settings.credentials.clone());

        let retry_policy = RetryPolicy::exponential(
            settings.retry.max_attempts,
            Duration::from_millis(settings.retry.base_delay_ms),
        );
        let engine = LoginFlowEngine::new(
            http.clone(),
            &settings,
            credentials.clone(),
            Arc::clone(&session),
            Arc::clone(&limiter),
        );
        let guest = GuestTokenManager::new(
            http.clone(),
            settings.api.base_url.clone(),
            Arc::clone(&session),
            Arc::clone(&limiter),
            retry_policy,
        );

        Ok(Self {
            http,
            base_url: settings.api.base_url.clone(),
            session,
            limiter,
            credentials,
            engine,
            guest,
            retry_policy,
            store: None,
            initialized: false,
            logged_in: false,
            api_auth: false,
        })
    }

    /// Attach a cookie store for session persistence across runs
    pub fn with_session_store(mut self, store: SessionStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Establish an authenticated session
    ///
    /// With user credentials, restores a previously saved session when the
    /// store holds cookies the platform still accepts, otherwise runs the
    /// interactive login flow. Without user credentials but with the full
    /// posting-API key set, only the guest token is bootstrapped. Until
    /// this succeeds the client refuses to post.
    pub async fn initialize(&mut self) -> Result<()> {
        if self.credentials.has_user_login() {
            if self.try_restore().await {
                self.logged_in = true;
            } else {
                self.engine.login().await?;
                self.logged_in = true;
                self.persist_cookies().await;
            }
        } else if self.credentials.has_api_keys() {
            info!("No user credentials; running app-only with the posting-API key set");
            self.guest.ensure_fresh().await?;
        } else {
            // Names every absent login field.
            self.credentials.validate_for_login()?;
        }

        self.api_auth = self.credentials.has_api_keys();
        if self.api_auth && self.logged_in {
            info!("Posting-API key set available alongside the user session");
        }
        self.initialized = true;
        Ok(())
    }

    /// Whether an authenticated session is established
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Whether the full posting-API key set was supplied
    pub fn has_api_auth(&self) -> bool {
        self.api_auth
    }

    /// Post a tweet, retrying transient failures with exponential backoff
    ///
    /// Returns [`TweetResult::Failed`] with the final attempt's errors
    /// once the retry budget is exhausted. `Err` is reserved for misuse
    /// (posting before initialization) and local failures.
    pub async fn post_tweet(&self, request: &TweetRequest) -> Result<TweetResult> {
        if !self.initialized {
            return Err(Error::session(
                "Client not initialized; call initialize() before posting",
            ));
        }

        let url = format!("{}/2/tweets", self.base_url);
        let parsed_url = self.parse_url(&url)?;
        let body = request.to_body();

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt_post(&url, &parsed_url, &body).await? {
                Attempt::Posted(tweet) => {
                    info!("Posted tweet {}", tweet.id);
                    return Ok(TweetResult::Posted(tweet));
                }
                Attempt::Rejected(errors) => match self.retry_policy.delay_after(attempt) {
                    Some(delay) => {
                        warn!(
                            "Posting attempt {} rejected ({} errors); retrying in {:?}",
                            attempt,
                            errors.len(),
                            delay
                        );
                        sleep(delay).await;
                    }
                    None => {
                        warn!("Posting failed after {} attempts", attempt);
                        return Ok(TweetResult::Failed(errors));
                    }
                },
            }
        }
    }

    /// Delete a tweet by id
    ///
    /// A single attempt; any failure is logged and reported as `false`.
    pub async fn delete_tweet(&self, id: &str) -> bool {
        if !self.initialized {
            warn!("Delete requested before initialization");
            return false;
        }
        match self.try_delete(id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!("Failed to delete tweet {}: {}", id, e);
                false
            }
        }
    }

    /// Check whether the current session is accepted by the platform
    pub async fn verify(&self) -> Result<bool> {
        let url = format!("{}/1.1/account/verify_credentials.json", self.base_url);
        let parsed_url = self.parse_url(&url)?;
        let request_headers = self.prepared_headers().await?;

        self.limiter.wait_for_next().await;
        let response = self.http.get(&url).headers(request_headers).send().await?;

        let status = response.status();
        self.merge_response_cookies(response.headers(), &parsed_url)
            .await;
        Ok(status.is_success())
    }

    /// Run one posting attempt against the creation endpoint
    async fn attempt_post(
        &self,
        url: &str,
        parsed_url: &Url,
        body: &serde_json::Value,
    ) -> Result<Attempt> {
        let request_headers = self.prepared_headers().await?;

        self.limiter.wait_for_next().await;
        let response = match self
            .http
            .post(url)
            .headers(request_headers)
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Ok(Attempt::Rejected(vec![ApiErrorEntry::new(
                    0,
                    format!("Network error: {}", e),
                )]));
            }
        };

        let status = response.status();
        self.merge_response_cookies(response.headers(), parsed_url)
            .await;

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                return Ok(Attempt::Rejected(vec![ApiErrorEntry::new(
                    0,
                    format!("Unreadable response body: {}", e),
                )]));
            }
        };

        // Structured errors arrive in the body on both 200 and error
        // statuses; prefer them over a synthesized status entry.
        match serde_json::from_str::<TweetEnvelope>(&text) {
            Ok(envelope) => {
                if let Some(errors) = envelope.errors
                    && !errors.is_empty()
                {
                    return Ok(Attempt::Rejected(errors));
                }
                if let Some(data) = envelope.data {
                    return Ok(Attempt::Posted(data.into_posted()));
                }
                Ok(Attempt::Rejected(vec![ApiErrorEntry::new(
                    i32::from(status.as_u16()),
                    format!("Posting endpoint returned status {} with no data", status),
                )]))
            }
            Err(_) => Ok(Attempt::Rejected(vec![ApiErrorEntry::new(
                i32::from(status.as_u16()),
                format!("Posting endpoint returned status {}", status),
            )])),
        }
    }

    /// Run one deletion call
    async fn try_delete(&self, id: &str) -> Result<bool> {
        let url = format!("{}/2/tweets/{}", self.base_url, id);
        let parsed_url = self.parse_url(&url)?;
        let request_headers = self.prepared_headers().await?;

        self.limiter.wait_for_next().await;
        let response = self
            .http
            .delete(&url)
            .headers(request_headers)
            .send()
            .await?;

        let status = response.status();
        self.merge_response_cookies(response.headers(), &parsed_url)
            .await;

        if !status.is_success() {
            return Err(Error::api(
                i32::from(status.as_u16()),
                format!("Deletion returned status {}", status),
            ));
        }

        let envelope: DeleteEnvelope = response.json().await?;
        Ok(envelope.data.map(|d| d.deleted).unwrap_or(false))
    }

    /// Try to restore an authenticated session from saved cookies
    ///
    /// Merged cookies are dropped again when the platform rejects them so
    /// the subsequent login starts clean.
    async fn try_restore(&self) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        let jar = match store.load() {
            Ok(jar) if !jar.is_empty() => jar,
            Ok(_) => return false,
            Err(e) => {
                debug!("No saved session to restore: {}", e);
                return false;
            }
        };

        {
            let mut session = self.session.lock().await;
            session.cookies.merge(jar.into_cookies());
        }

        // Restored jars lack a guest token; verification still needs one.
        if let Err(e) = self.guest.ensure_fresh().await {
            debug!("Guest activation during restore failed: {}", e);
        }

        match self.verify().await {
            Ok(true) => {
                info!("Restored session from saved cookies");
                true
            }
            Ok(false) => {
                debug!("Saved session rejected; falling back to login");
                let mut session = self.session.lock().await;
                session.cookies = CookieJar::new();
                false
            }
            Err(e) => {
                debug!("Session verification failed: {}", e);
                let mut session = self.session.lock().await;
                session.cookies = CookieJar::new();
                false
            }
        }
    }

    /// Save the current cookie jar if a store is attached
    async fn persist_cookies(&self) {
        if let Some(store) = &self.store {
            let session = self.session.lock().await;
            if let Err(e) = store.save(&session.cookies) {
                warn!("Could not persist session cookies: {}", e);
            }
        }
    }

    /// Assemble headers from the current session state
    async fn prepared_headers(&self) -> Result<HeaderMap> {
        let session = self.session.lock().await;
        let mut request_headers = HeaderMap::new();
        headers::install(&session, &mut request_headers)?;
        Ok(request_headers)
    }

    /// Merge response cookies into the session jar
    async fn merge_response_cookies(&self, response_headers: &HeaderMap, url: &Url) {
        let mut session = self.session.lock().await;
        session.cookies.merge_from_headers(response_headers, url);
    }

    fn parse_url(&self, url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::config(format!("Invalid endpoint URL: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uninitialized_client() -> TwitterClient {
        TwitterClient::new(Settings::default()).unwrap()
    }

    #[tokio::test]
    async fn test_post_before_initialize_is_misuse() {
        let client = uninitialized_client();
        let err = client
            .post_tweet(&TweetRequest::new("too early"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Session(_)));
    }

    #[tokio::test]
    async fn test_delete_before_initialize_returns_false() {
        let client = uninitialized_client();
        assert!(!client.delete_tweet("123").await);
    }

    #[test]
    fn test_new_client_starts_unauthenticated() {
        let client = uninitialized_client();
        assert!(!client.is_logged_in());
        assert!(!client.has_api_auth());
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let mut settings = Settings::default();
        settings.api.base_url = "not a url".to_string();
        assert!(TwitterClient::new(settings).is_err());
    }
}
