//! Configuration management for the Twitter flow client
//!
//! This module handles loading and managing configuration settings
//! for both library consumers and the CLI binary.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{
    ApiSettings, CredentialSettings, DEFAULT_BEARER_TOKEN, LoggingSettings, RateLimitSettings,
    RetrySettings, Settings,
};
