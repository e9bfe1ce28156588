//! Configuration settings structure
//!
//! Defines the main settings structure and loading logic for the Twitter
//! flow client. Credentials are optional at the type level and validated
//! as a group when a login actually starts.

use serde::{Deserialize, Serialize};

/// Bearer token used by the platform's web frontend for pre-login calls.
///
/// This is a public, app-scoped constant, not a user secret.
pub const DEFAULT_BEARER_TOKEN: &str = "AAAAAAAAAAAAAAAAAAAAANRILgAAAAAAnNwIzUejRCOuH5E6I8xnZz4puTs=1Zv7ttfk8LF81IUq16cHjhLTvJu4FA33AGWWjCpTnA";

/// Main configuration settings for the Twitter flow client
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// API endpoint configuration
    pub api: ApiSettings,
    /// Account credentials
    pub credentials: CredentialSettings,
    /// Request pacing configuration
    pub rate_limit: RateLimitSettings,
    /// Retry/backoff configuration
    pub retry: RetrySettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// API endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the platform API
    pub base_url: String,
    /// Bearer token for app-scoped authorization
    pub bearer_token: String,
}

/// Account credentials, all optional at the type level
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CredentialSettings {
    /// Account username for interactive login
    pub username: Option<String>,
    /// Account password for interactive login
    pub password: Option<String>,
    /// Account email, answered to the email-confirmation subtask
    pub email: Option<String>,
    /// Base32 secret for the two-factor challenge
    pub two_factor_secret: Option<String>,
    /// Consumer key for the secondary posting-API upgrade
    pub api_key: Option<String>,
    /// Consumer secret for the secondary posting-API upgrade
    pub api_secret: Option<String>,
    /// Access token for the secondary posting-API upgrade
    pub access_token: Option<String>,
    /// Access token secret for the secondary posting-API upgrade
    pub access_secret: Option<String>,
}

/// Request pacing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Minimum delay between any two outbound requests, in milliseconds
    pub min_interval_ms: u64,
    /// Length of the request-count window, in seconds
    pub window_secs: u64,
    /// Maximum requests granted per window
    pub max_requests: u32,
}

/// Retry/backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum attempts for retryable network steps
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds; the exponential schedule is
    /// `base * 2^attempt` and the two-factor linear schedule is
    /// `base * 2 * attempt`
    pub base_delay_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.twitter.com".to_string(),
            bearer_token: DEFAULT_BEARER_TOKEN.to_string(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            min_interval_ms: 1_000,
            window_secs: 15 * 60,
            max_requests: 50,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML configuration file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| crate::Error::config(format!("Invalid config file: {}", e)))
    }

    /// Load settings from environment variables only
    pub fn from_env() -> crate::Result<Self> {
        Self::default().merge_with_env()
    }

    /// Override settings from environment variables
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        // Empty values are treated as unset, same as the credential slots.
        if let Ok(base_url) = std::env::var("TWITTER_API_BASE_URL")
            && !base_url.is_empty()
        {
            self.api.base_url = base_url;
        }
        if let Ok(bearer) = std::env::var("TWITTER_BEARER_TOKEN")
            && !bearer.is_empty()
        {
            self.api.bearer_token = bearer;
        }

        let creds = &mut self.credentials;
        for (var, slot) in [
            ("TWITTER_USERNAME", &mut creds.username),
            ("TWITTER_PASSWORD", &mut creds.password),
            ("TWITTER_EMAIL", &mut creds.email),
            ("TWITTER_2FA_SECRET", &mut creds.two_factor_secret),
            ("TWITTER_API_KEY", &mut creds.api_key),
            ("TWITTER_API_SECRET", &mut creds.api_secret),
            ("TWITTER_ACCESS_TOKEN", &mut creds.access_token),
            ("TWITTER_ACCESS_SECRET", &mut creds.access_secret),
        ] {
            if let Ok(value) = std::env::var(var)
                && !value.is_empty()
            {
                *slot = Some(value);
            }
        }

        if let Ok(max) = std::env::var("TWITTER_RATE_LIMIT_MAX") {
            self.rate_limit.max_requests = max
                .parse()
                .map_err(|e| crate::Error::config(format!("Invalid rate limit: {}", e)))?;
        }

        Ok(self)
    }

    /// Validate the final configuration
    pub fn validate(&self) -> crate::Result<()> {
        url::Url::parse(&self.api.base_url)
            .map_err(|e| crate::Error::config(format!("Invalid base URL: {}", e)))?;

        if self.api.bearer_token.is_empty() {
            return Err(crate::Error::config("Bearer token must not be empty"));
        }
        if self.rate_limit.max_requests == 0 {
            return Err(crate::Error::config("Rate limit ceiling must be non-zero"));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(crate::Error::config("Rate limit window must be non-zero"));
        }
        if self.retry.max_attempts == 0 {
            return Err(crate::Error::config("Retry attempts must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.api.base_url, "https://api.twitter.com");
        assert_eq!(settings.api.bearer_token, DEFAULT_BEARER_TOKEN);
        assert_eq!(settings.rate_limit.min_interval_ms, 1_000);
        assert_eq!(settings.rate_limit.window_secs, 900);
        assert_eq!(settings.rate_limit.max_requests, 50);
        assert_eq!(settings.retry.max_attempts, 3);
        assert!(settings.credentials.username.is_none());
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::new();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_empty_env_overrides_are_ignored() {
        unsafe {
            std::env::set_var("TWITTER_API_BASE_URL", "");
            std::env::set_var("TWITTER_BEARER_TOKEN", "");
        }

        let settings = Settings::default().merge_with_env().unwrap();
        assert_eq!(settings.api.base_url, "https://api.twitter.com");
        assert_eq!(settings.api.bearer_token, DEFAULT_BEARER_TOKEN);

        unsafe {
            std::env::remove_var("TWITTER_API_BASE_URL");
            std::env::remove_var("TWITTER_BEARER_TOKEN");
        }
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut settings = Settings::default();
        settings.api.base_url = "not a url".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_ceiling() {
        let mut settings = Settings::default();
        settings.rate_limit.max_requests = 0;
        assert!(settings.validate().is_err());
    }
}
