//! Cookie persistence for session restoration
//!
//! Saves the cookie jar to disk as JSON so a later run can restore an
//! authenticated session without replaying the login flow. Load failures
//! are not fatal to callers; the client falls back to a fresh login.

use crate::session::CookieJar;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-backed store for session cookies
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// Path of the JSON cookie file
    path: PathBuf,
}

impl SessionStore {
    /// Create a store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the default per-user location
    pub fn default_location() -> Result<Self> {
        let base = dirs::cache_dir()
            .ok_or_else(|| Error::session("Could not determine cache directory"))?;
        Ok(Self::new(base.join("twitter-flow-client").join("cookies.json")))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the cookie jar to disk
    pub fn save(&self, jar: &CookieJar) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(jar)?;
        std::fs::write(&self.path, json)?;
        debug!("Saved {} cookies to {:?}", jar.len(), self.path);
        Ok(())
    }

    /// Load a previously saved cookie jar
    pub fn load(&self) -> Result<CookieJar> {
        let contents = std::fs::read_to_string(&self.path)?;
        let jar: CookieJar = serde_json::from_str(&contents)?;
        debug!("Loaded {} cookies from {:?}", jar.len(), self.path);
        Ok(jar)
    }

    /// Remove the persisted cookies, if any
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
