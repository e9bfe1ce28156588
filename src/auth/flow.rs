//! Interactive login flow state machine
//!
//! The platform's login protocol is a sequence of subtasks threaded
//! through an opaque flow token. Each response names the next subtask the
//! platform demands; the engine answers recognized subtasks in order and
//! treats anything it does not recognize as a protocol error rather than
//! guessing. Steps are retried with exponential backoff except the
//! two-factor challenge, which retries with linearly increasing delay
//! because one-time codes are time-windowed.

use crate::config::Settings;
use crate::retry::RetryPolicy;
use crate::session::SessionHandle;
use crate::types::{ApiErrorEntry, Credentials};
use crate::{Error, Result, auth::GuestTokenManager, auth::headers, auth::totp, limit::RateLimiter};
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

/// Session-scoped cookies cleared before the first flow step; stale
/// values from an earlier login make the platform reject the flow.
const SESSION_COOKIES_TO_CLEAR: &[&str] = &[
    "twitter_ads_id",
    "ads_prefs",
    "_twitter_sess",
    "zipbox_forms_auth_token",
    "lang",
    "bouncer_reset_cookie",
    "twid",
    "twitter_ads_idb",
    "email_uid",
    "external_referer",
    "ct0",
    "aa_u",
];

/// Upper bound on flow transitions; a healthy login finishes well below it
const MAX_FLOW_STEPS: usize = 16;

/// Recognized subtask tags of the login protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtaskId {
    /// Browser-instrumentation challenge, answered with an empty payload
    JsInstrumentation,
    /// Username entry
    EnterUserIdentifier,
    /// Password entry
    EnterPassword,
    /// Duplicate-account check, answered with "not a duplicate"
    AccountDuplicationCheck,
    /// Two-factor one-time code challenge
    TwoFactorAuthChallenge,
    /// Email-confirmation challenge, answered with the account email
    Acid,
    /// Terminal success
    LoginSuccess,
    /// The platform denied the login attempt
    DenyLogin,
    /// A subtask the engine does not understand; always a protocol error
    Unrecognized(String),
}

impl SubtaskId {
    /// Map a wire subtask id onto a recognized tag
    pub fn parse(id: &str) -> Self {
        match id {
            "LoginJsInstrumentationSubtask" => Self::JsInstrumentation,
            "LoginEnterUserIdentifierSSO" => Self::EnterUserIdentifier,
            "LoginEnterPassword" => Self::EnterPassword,
            "AccountDuplicationCheck" => Self::AccountDuplicationCheck,
            "LoginTwoFactorAuthChallenge" => Self::TwoFactorAuthChallenge,
            "LoginAcid" => Self::Acid,
            "LoginSuccessSubtask" => Self::LoginSuccess,
            "DenyLoginSubtask" => Self::DenyLogin,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

/// Flow state threaded from step to step
#[derive(Debug, Clone)]
pub struct FlowState {
    /// Opaque handle the next request must echo back
    pub flow_token: String,
    /// Subtask the platform requests next, if any
    pub next: Option<SubtaskId>,
}

/// Wire shape of a flow-task response
#[derive(Debug, Deserialize)]
struct FlowResponse {
    errors: Option<Vec<ApiErrorEntry>>,
    flow_token: Option<String>,
    subtasks: Option<Vec<FlowSubtaskEntry>>,
}

#[derive(Debug, Deserialize)]
struct FlowSubtaskEntry {
    subtask_id: String,
}

/// Executes the interactive login protocol
#[derive(Debug)]
pub struct LoginFlowEngine {
    /// HTTP client for requests
    http: Client,
    /// Base URL of the platform API
    base_url: String,
    /// Shared session state, exclusively written during a login attempt
    session: SessionHandle,
    /// Guest token bootstrap
    guest: GuestTokenManager,
    /// Pacing gate for outbound calls
    limiter: Arc<RateLimiter>,
    /// Credentials, immutable once login begins
    credentials: Credentials,
    /// Retry policy for regular flow steps
    step_policy: RetryPolicy,
    /// Retry policy for the two-factor challenge
    two_factor_policy: RetryPolicy,
}

impl LoginFlowEngine {
    /// Create a new engine over the shared session and pacing gate
    pub fn new(
        http: Client,
        settings: &Settings,
        credentials: Credentials,
        session: SessionHandle,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        let base = Duration::from_millis(settings.retry.base_delay_ms);
        let step_policy = RetryPolicy::exponential(settings.retry.max_attempts, base);
        let guest = GuestTokenManager::new(
            http.clone(),
            settings.api.base_url.clone(),
            Arc::clone(&session),
            Arc::clone(&limiter),
            step_policy,
        );
        Self {
            http,
            base_url: settings.api.base_url.clone(),
            session,
            guest,
            limiter,
            credentials,
            step_policy,
            two_factor_policy: RetryPolicy::linear(settings.retry.max_attempts, base * 2),
        }
    }

    /// Run the login flow to completion
    ///
    /// Fails with [`Error::CredentialsMissing`] before any network call
    /// when the username/password/email group is incomplete, with
    /// [`Error::TwoFactorRequired`] when the platform demands a one-time
    /// code and no secret was supplied, with [`Error::Protocol`] on an
    /// unrecognized subtask, and with [`Error::LoginFailed`] when a step
    /// exhausts its retry budget.
    pub async fn login(&self) -> Result<()> {
        self.credentials.validate_for_login()?;

        {
            let mut session = self.session.lock().await;
            session.cookies.clear_names(SESSION_COOKIES_TO_CLEAR);
        }

        self.guest.ensure_fresh().await?;

        let mut state = self
            .run_step(payload::init(), "flow init", true)
            .await
            .map_err(Error::login_failed)?;

        for _ in 0..MAX_FLOW_STEPS {
            let Some(next) = state.next.clone() else {
                return Err(Error::protocol("(flow ended without a subtask)"));
            };

            debug!("Flow requests subtask {:?}", next);
            state = match next {
                SubtaskId::LoginSuccess => {
                    info!("Login flow completed");
                    return Ok(());
                }
                SubtaskId::JsInstrumentation => {
                    self.run_step(
                        payload::js_instrumentation(&state.flow_token),
                        "instrumentation challenge",
                        false,
                    )
                    .await
                    .map_err(Error::login_failed)?
                }
                SubtaskId::EnterUserIdentifier => {
                    let username = self.credentials.username.as_deref().unwrap_or_default();
                    self.run_step(
                        payload::user_identifier(&state.flow_token, username),
                        "identifier entry",
                        false,
                    )
                    .await
                    .map_err(Error::login_failed)?
                }
                SubtaskId::EnterPassword => {
                    let password = self.credentials.password.as_deref().unwrap_or_default();
                    self.run_step(
                        payload::password(&state.flow_token, password),
                        "password entry",
                        false,
                    )
                    .await
                    .map_err(Error::login_failed)?
                }
                SubtaskId::AccountDuplicationCheck => {
                    self.run_step(
                        payload::duplication_check(&state.flow_token),
                        "duplication check",
                        false,
                    )
                    .await
                    .map_err(Error::login_failed)?
                }
                SubtaskId::Acid => {
                    let email = self.credentials.email.as_deref().unwrap_or_default();
                    self.run_step(payload::acid(&state.flow_token, email), "email confirmation", false)
                        .await
                        .map_err(Error::login_failed)?
                }
                SubtaskId::TwoFactorAuthChallenge => {
                    self.two_factor_step(&state.flow_token).await?
                }
                SubtaskId::DenyLogin => {
                    // Normally rejected inside the step retry loop; a
                    // terminal deny still fails the login.
                    return Err(Error::login_failed(Error::api(
                        0,
                        "Login denied by platform",
                    )));
                }
                SubtaskId::Unrecognized(id) => return Err(Error::protocol(id)),
            };
        }

        Err(Error::internal("Login flow exceeded maximum transitions"))
    }

    /// Execute one flow step with the exponential retry policy
    async fn run_step(
        &self,
        body: serde_json::Value,
        step: &str,
        init: bool,
    ) -> Result<FlowState> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send_flow_request(&body, init).await {
                Ok(state) => return Ok(state),
                Err(e) => match self.step_policy.delay_after(attempt) {
                    Some(delay) => {
                        warn!(
                            "{} failed on attempt {}: {}; retrying in {:?}",
                            step, attempt, e, delay
                        );
                        sleep(delay).await;
                    }
                    None => {
                        warn!("{} failed after {} attempts: {}", step, attempt, e);
                        return Err(e);
                    }
                },
            }
        }
    }

    /// Execute the two-factor challenge with the linear retry policy
    ///
    /// A fresh code is generated per attempt; codes are time-windowed and
    /// a rejected submission may simply have straddled a window boundary.
    async fn two_factor_step(&self, flow_token: &str) -> Result<FlowState> {
        let secret = self
            .credentials
            .two_factor_secret
            .as_deref()
            .ok_or(Error::TwoFactorRequired)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let code = totp::generate_code(secret).map_err(Error::login_failed)?;
            match self
                .send_flow_request(&payload::two_factor(flow_token, &code), false)
                .await
            {
                Ok(state) => return Ok(state),
                Err(e) => match self.two_factor_policy.delay_after(attempt) {
                    Some(delay) => {
                        warn!(
                            "Two-factor code rejected on attempt {}: {}; retrying in {:?}",
                            attempt, e, delay
                        );
                        sleep(delay).await;
                    }
                    None => return Err(Error::login_failed(e)),
                },
            }
        }
    }

    /// Send one flow-task request and interpret the response
    ///
    /// Headers are re-derived from the current cookie jar on every call
    /// because the platform rotates the CSRF cookie within a flow, and
    /// response cookies are merged even on failure.
    async fn send_flow_request(&self, body: &serde_json::Value, init: bool) -> Result<FlowState> {
        let url = if init {
            format!("{}/1.1/onboarding/task.json?flow_name=login", self.base_url)
        } else {
            format!("{}/1.1/onboarding/task.json", self.base_url)
        };
        let parsed_url =
            Url::parse(&url).map_err(|e| Error::config(format!("Invalid flow URL: {}", e)))?;

        let mut request_headers = HeaderMap::new();
        {
            let session = self.session.lock().await;
            headers::install(&session, &mut request_headers)?;
        }

        self.limiter.wait_for_next().await;
        let response = self
            .http
            .post(url)
            .headers(request_headers)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_headers = response.headers().clone();
        {
            let mut session = self.session.lock().await;
            session
                .cookies
                .merge_from_headers(&response_headers, &parsed_url);
        }

        if !status.is_success() {
            return Err(Error::api(
                i32::from(status.as_u16()),
                format!("Flow request returned status {}", status),
            ));
        }

        let flow: FlowResponse = response.json().await?;

        if let Some(errors) = flow.errors
            && let Some(first) = errors.into_iter().next()
        {
            return Err(Error::api(first.code, first.message));
        }

        let flow_token = flow
            .flow_token
            .ok_or_else(|| Error::api(0, "Flow response missing flow_token"))?;

        let next = flow
            .subtasks
            .and_then(|subtasks| subtasks.into_iter().next())
            .map(|entry| SubtaskId::parse(&entry.subtask_id));

        if matches!(next, Some(SubtaskId::DenyLogin)) {
            return Err(Error::api(0, "Login denied by platform"));
        }

        Ok(FlowState { flow_token, next })
    }
}

/// Subtask input payload builders
mod payload {
    use serde_json::{Value, json};

    /// Body of the flow-init request
    pub fn init() -> Value {
        json!({
            "input_flow_data": {
                "flow_context": {
                    "debug_overrides": {},
                    "start_location": { "location": "splash_screen" }
                }
            },
            "subtask_versions": {}
        })
    }

    /// Empty-but-valid answer to the instrumentation challenge
    pub fn js_instrumentation(flow_token: &str) -> Value {
        json!({
            "flow_token": flow_token,
            "subtask_inputs": [{
                "subtask_id": "LoginJsInstrumentationSubtask",
                "js_instrumentation": { "response": "{}", "link": "next_link" }
            }]
        })
    }

    /// Username answer to the identifier subtask
    pub fn user_identifier(flow_token: &str, username: &str) -> Value {
        json!({
            "flow_token": flow_token,
            "subtask_inputs": [{
                "subtask_id": "LoginEnterUserIdentifierSSO",
                "settings_list": {
                    "setting_responses": [{
                        "key": "user_identifier",
                        "response_data": { "text_data": { "result": username } }
                    }],
                    "link": "next_link"
                }
            }]
        })
    }

    /// Password answer
    pub fn password(flow_token: &str, password: &str) -> Value {
        json!({
            "flow_token": flow_token,
            "subtask_inputs": [{
                "subtask_id": "LoginEnterPassword",
                "enter_password": { "password": password, "link": "next_link" }
            }]
        })
    }

    /// Fixed "not a duplicate" answer to the duplication check
    pub fn duplication_check(flow_token: &str) -> Value {
        json!({
            "flow_token": flow_token,
            "subtask_inputs": [{
                "subtask_id": "AccountDuplicationCheck",
                "check_logged_in_account": { "link": "AccountDuplicationCheck_false" }
            }]
        })
    }

    /// One-time code answer to the two-factor challenge
    pub fn two_factor(flow_token: &str, code: &str) -> Value {
        json!({
            "flow_token": flow_token,
            "subtask_inputs": [{
                "subtask_id": "LoginTwoFactorAuthChallenge",
                "enter_text": { "text": code, "link": "next_link" }
            }]
        })
    }

    /// Email answer to the confirmation subtask
    pub fn acid(flow_token: &str, email: &str) -> Value {
        json!({
            "flow_token": flow_token,
            "subtask_inputs": [{
                "subtask_id": "LoginAcid",
                "enter_text": { "text": email, "link": "next_link" }
            }]
        })
    }
}
