//! Duplicate detection for ingested URLs.

use std::sync::Arc;

use crate::error::Result;

use super::TweetStore;

/// Checks whether a URL was already ingested.
///
/// Matching is exact string equality: scheme, trailing slash, and query
/// string all count.
#[derive(Clone)]
pub struct DedupGuard {
    store: Arc<dyn TweetStore>,
}

impl DedupGuard {
    /// Create a guard backed by the given store.
    #[must_use]
    pub fn new(store: Arc<dyn TweetStore>) -> Self {
        Self { store }
    }

    /// Check if a URL has been ingested.
    pub async fn exists(&self, url: &str) -> Result<bool> {
        let exists = self.store.tweet_exists_by_url(url).await?;
        if exists {
            tracing::debug!(url, "URL already ingested");
        }
        Ok(exists)
    }
}
