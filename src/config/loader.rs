//! Configuration loading utilities
//!
//! Provides helper functions for loading configuration from various sources
//! with proper error handling and validation.

use crate::{Result, config::Settings};
use std::path::Path;
use tracing::{debug, info, warn};

/// Configuration loader with multiple source support
#[derive(Debug)]
pub struct ConfigLoader {
    /// Default settings
    defaults: Settings,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
        }
    }

    /// Load configuration with precedence order:
    /// 1. Environment variables (highest priority)
    /// 2. Configuration file
    /// 3. Default values (lowest priority)
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        let mut settings = self.defaults.clone();

        // Load from config file if provided
        if let Some(path) = config_file {
            if path.exists() {
                info!("Loading configuration from file: {:?}", path);
                settings = Settings::from_file(path)?;
            } else {
                warn!("Configuration file not found: {:?}, using defaults", path);
            }
        }

        // Override with environment variables
        debug!("Applying environment variable overrides");
        settings = settings.merge_with_env()?;

        // Validate final configuration
        settings.validate()?;

        info!("Configuration loaded successfully");

        Ok(settings)
    }

    /// Load configuration from environment only
    pub fn from_env_only(&self) -> Result<Settings> {
        let settings = Settings::from_env()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Get default configuration
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_defaults() {
        let loader = ConfigLoader::new();
        let settings = loader.load(None).unwrap();

        assert_eq!(settings.rate_limit.max_requests, 50);
        assert_eq!(settings.retry.max_attempts, 3);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[api]
base_url = "https://example.test"

[credentials]
username = "file_user"

[rate_limit]
max_requests = 10
        "#
        )
        .unwrap();

        let loader = ConfigLoader::new();
        let settings = loader.load(Some(temp_file.path())).unwrap();

        assert_eq!(settings.api.base_url, "https://example.test");
        assert_eq!(settings.credentials.username.as_deref(), Some("file_user"));
        assert_eq!(settings.rate_limit.max_requests, 10);
    }

    #[test]
    fn test_env_var_override() {
        unsafe {
            std::env::set_var("TWITTER_USERNAME", "env_user");
            std::env::set_var("TWITTER_RATE_LIMIT_MAX", "25");
        }

        let loader = ConfigLoader::new();
        let settings = loader.from_env_only().unwrap();

        assert_eq!(settings.credentials.username.as_deref(), Some("env_user"));
        assert_eq!(settings.rate_limit.max_requests, 25);

        unsafe {
            std::env::remove_var("TWITTER_USERNAME");
            std::env::remove_var("TWITTER_RATE_LIMIT_MAX");
        }
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let loader = ConfigLoader::new();
        let settings = loader
            .load(Some(Path::new("/nonexistent/config.toml")))
            .unwrap();
        assert_eq!(settings.api.base_url, loader.defaults().api.base_url);
    }
}
