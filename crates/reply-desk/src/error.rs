//! Error types for the reply desk.

use std::time::Duration;

use thiserror::Error;

use crate::lifecycle::ReplyStatus;

/// Result alias used throughout the library.
pub type Result<T, E = DeskError> = std::result::Result<T, E>;

/// Errors surfaced by storage, ingestion, and lifecycle operations.
#[derive(Debug, Error)]
pub enum DeskError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Filesystem operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The URL was inserted concurrently past the dedup check
    #[error("Tweet URL already stored: {url}")]
    DuplicateUrl { url: String },

    /// Referenced row does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Requested status change is not allowed from the current state
    #[error("Reply {reply_id} cannot move from {from} to {to}")]
    InvalidTransition {
        reply_id: i64,
        from: ReplyStatus,
        to: ReplyStatus,
    },

    /// Stored status string did not match any known status
    #[error("Unknown reply status in database: {0}")]
    UnknownStatus(String),

    /// Whole-URL ingestion exceeded its deadline
    #[error("Ingestion of {url} timed out after {}s", .after.as_secs())]
    Timeout { url: String, after: Duration },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DeskError {
    /// Shorthand for a missing tweet.
    pub(crate) fn tweet_not_found(id: i64) -> Self {
        Self::NotFound { entity: "Tweet", id }
    }

    /// Shorthand for a missing reply.
    pub(crate) fn reply_not_found(id: i64) -> Self {
        Self::NotFound { entity: "Reply", id }
    }
}

/// Reasons a remote fetch produced no usable content.
///
/// The pipeline never propagates these; it maps them onto an empty result.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Navigation or DOM-ready wait exceeded its bound
    #[error("{stage} timed out after {}s", .after.as_secs())]
    Timeout {
        stage: &'static str,
        after: Duration,
    },

    /// Could not attach to the remote browser
    #[error("Failed to connect to browser at {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// The browser exposes no browsing context to reuse
    #[error("No browsing context available on the remote browser")]
    NoContext,

    /// Any other CDP failure while driving the page
    #[error("Browser error: {0}")]
    Browser(String),

    /// The page loaded but no selector produced text
    #[error("No selector matched tweet text")]
    NoMatch { username: String },
}

impl From<chromiumoxide::error::CdpError> for FetchError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(err.to_string())
    }
}
