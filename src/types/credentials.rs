//! Credential group definitions
//!
//! All fields are optional at the type level; completeness is validated as
//! a group when a login actually starts. Credentials are immutable once
//! login begins.

use crate::config::CredentialSettings;
use crate::{Error, Result};

/// Account credentials for interactive login and the optional posting-API upgrade
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Account username
    pub username: Option<String>,
    /// Account password
    pub password: Option<String>,
    /// Account email
    pub email: Option<String>,
    /// Base32 secret for two-factor challenges
    pub two_factor_secret: Option<String>,
    /// Consumer key for the secondary posting API
    pub api_key: Option<String>,
    /// Consumer secret for the secondary posting API
    pub api_secret: Option<String>,
    /// Access token for the secondary posting API
    pub access_token: Option<String>,
    /// Access token secret for the secondary posting API
    pub access_secret: Option<String>,
}

impl Credentials {
    /// Whether enough fields are present to attempt an interactive login
    pub fn has_user_login(&self) -> bool {
        self.username.is_some() && self.password.is_some() && self.email.is_some()
    }

    /// Whether the full set of secondary posting-API keys is present
    pub fn has_api_keys(&self) -> bool {
        self.api_key.is_some()
            && self.api_secret.is_some()
            && self.access_token.is_some()
            && self.access_secret.is_some()
    }

    /// Validate the interactive-login group, naming every absent field
    pub fn validate_for_login(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.username.is_none() {
            missing.push("username");
        }
        if self.password.is_none() {
            missing.push("password");
        }
        if self.email.is_none() {
            missing.push("email");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::credentials_missing(missing.join(", ")))
        }
    }
}

impl From<CredentialSettings> for Credentials {
    fn from(settings: CredentialSettings) -> Self {
        Self {
            username: settings.username,
            password: settings.password,
            email: settings.email,
            two_factor_secret: settings.two_factor_secret,
            api_key: settings.api_key,
            api_secret: settings.api_secret,
            access_token: settings.access_token,
            access_secret: settings.access_secret,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_login_credentials() -> Credentials {
        Credentials {
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            email: Some("user@example.com".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_login_group_validates() {
        assert!(full_login_credentials().validate_for_login().is_ok());
    }

    #[test]
    fn test_missing_fields_are_all_named() {
        let creds = Credentials {
            username: Some("user".to_string()),
            ..Default::default()
        };

        let err = creds.validate_for_login().unwrap_err();
        let Error::CredentialsMissing { missing } = err else {
            panic!("expected CredentialsMissing, got {err:?}");
        };
        assert_eq!(missing, "password, email");
    }

    #[test]
    fn test_empty_credentials_fail_validation() {
        let err = Credentials::default().validate_for_login().unwrap_err();
        assert!(matches!(err, Error::CredentialsMissing { .. }));
    }

    #[test]
    fn test_api_key_group_requires_all_four() {
        let mut creds = full_login_credentials();
        creds.api_key = Some("key".to_string());
        creds.api_secret = Some("secret".to_string());
        creds.access_token = Some("token".to_string());
        assert!(!creds.has_api_keys());

        creds.access_secret = Some("token_secret".to_string());
        assert!(creds.has_api_keys());
    }
}
