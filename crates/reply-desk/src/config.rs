//! Configuration for the reply desk.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DeskError, Result};

/// Default SQLite database file.
pub const DEFAULT_DB_PATH: &str = "tweets.db";

/// Default Chrome DevTools endpoint of the already-running browser.
pub const DEFAULT_CDP_ENDPOINT: &str = "http://127.0.0.1:9222";

/// Default bound on page navigation.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Default bound on waiting for the DOM to become ready.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on ingesting a single URL end to end.
pub const DEFAULT_URL_TIMEOUT: Duration = Duration::from_secs(45);

/// Default number of URLs ingested at once in a batch.
pub const DEFAULT_WORKERS: usize = 1;

/// Default number of posted tweets listed.
pub const DEFAULT_POSTED_LIMIT: u32 = 20;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// CDP endpoint of the remote browser.
    pub cdp_endpoint: String,
    /// Navigation timeout.
    pub navigation_timeout: Duration,
    /// DOM-ready timeout.
    pub load_timeout: Duration,
    /// Whole-URL ingestion timeout.
    pub url_timeout: Duration,
    /// Batch concurrency.
    pub workers: usize,
    /// Posted listing size.
    pub posted_limit: u32,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            cdp_endpoint: DEFAULT_CDP_ENDPOINT.to_string(),
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            url_timeout: DEFAULT_URL_TIMEOUT,
            workers: DEFAULT_WORKERS,
            posted_limit: DEFAULT_POSTED_LIMIT,
        }
    }
}

impl DeskConfig {
    /// Create configuration from environment variables.
    ///
    /// # Optional Environment Variables
    /// - `REPLY_DESK_DB`: database file (default: tweets.db)
    /// - `REPLY_DESK_CDP_ENDPOINT`: browser endpoint (default: http://127.0.0.1:9222)
    /// - `REPLY_DESK_NAV_TIMEOUT_SECS`: navigation timeout (default: 15)
    /// - `REPLY_DESK_LOAD_TIMEOUT_SECS`: DOM-ready timeout (default: 10)
    /// - `REPLY_DESK_URL_TIMEOUT_SECS`: per-URL timeout (default: 45)
    /// - `REPLY_DESK_WORKERS`: batch concurrency (default: 1)
    ///
    /// Values that fail to parse fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map_or(default, Duration::from_secs)
        };

        Self {
            db_path: lookup("REPLY_DESK_DB").map_or(defaults.db_path, PathBuf::from),
            cdp_endpoint: lookup("REPLY_DESK_CDP_ENDPOINT").unwrap_or(defaults.cdp_endpoint),
            navigation_timeout: secs("REPLY_DESK_NAV_TIMEOUT_SECS", defaults.navigation_timeout),
            load_timeout: secs("REPLY_DESK_LOAD_TIMEOUT_SECS", defaults.load_timeout),
            url_timeout: secs("REPLY_DESK_URL_TIMEOUT_SECS", defaults.url_timeout),
            workers: lookup("REPLY_DESK_WORKERS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.workers),
            posted_limit: defaults.posted_limit,
        }
    }

    /// Reject values the desk cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(DeskError::Config("workers must be at least 1".to_string()));
        }
        for (name, value) in [
            ("navigation timeout", self.navigation_timeout),
            ("load timeout", self.load_timeout),
            ("url timeout", self.url_timeout),
        ] {
            if value.is_zero() {
                return Err(DeskError::Config(format!("{name} must be non-zero")));
            }
        }
        if self.cdp_endpoint.trim().is_empty() {
            return Err(DeskError::Config("cdp endpoint must not be empty".to_string()));
        }
        Ok(())
    }
}
