//! The reply desk: one handle over ingestion, review, and listing.

use std::sync::Arc;

use crate::config::DeskConfig;
use crate::error::Result;
use crate::lifecycle::{Feedback, Lifecycle};
use crate::pipeline::{BatchReport, IngestOutcome, Pipeline};
use crate::storage::{PendingTweet, Reply, SqliteStore, Tweet, TweetStore};
use crate::twitter::{BrowserFetcher, ContentSource};

/// Entry point for every desk operation.
#[derive(Clone)]
pub struct ReplyDesk {
    store: Arc<dyn TweetStore>,
    pipeline: Pipeline,
    lifecycle: Lifecycle,
}

impl ReplyDesk {
    /// Assemble a desk from a store and a content source.
    #[must_use]
    pub fn new(store: Arc<dyn TweetStore>, source: Arc<dyn ContentSource>, config: &DeskConfig) -> Self {
        Self {
            pipeline: Pipeline::new(store.clone(), source, config),
            lifecycle: Lifecycle::new(store.clone()),
            store,
        }
    }

    /// Open the configured database and attach to the configured browser.
    pub async fn open(config: &DeskConfig) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(SqliteStore::connect(&config.db_path).await?);
        let source = Arc::new(BrowserFetcher::from_config(config));
        Ok(Self::new(store, source, config))
    }

    /// Ingest one URL.
    pub async fn ingest_one(&self, url: &str) -> Result<IngestOutcome> {
        self.pipeline.ingest_one(url).await
    }

    /// Ingest many URLs, isolating failures.
    pub async fn ingest_batch(&self, urls: &[String]) -> BatchReport {
        self.pipeline.ingest_batch(urls).await
    }

    /// Unposted tweets with their pending replies, newest first.
    pub async fn list_pending(&self) -> Result<Vec<PendingTweet>> {
        self.store.list_pending().await
    }

    /// Most recently posted tweets.
    pub async fn list_posted(&self, limit: u32) -> Result<Vec<Tweet>> {
        self.store.list_posted(limit).await
    }

    /// Mark a tweet posted.
    pub async fn mark_posted(&self, tweet_id: i64) -> Result<Tweet> {
        self.lifecycle.mark_posted(tweet_id).await
    }

    /// Record feedback on a reply.
    pub async fn record_feedback(&self, reply_id: i64, feedback: &Feedback) -> Result<Reply> {
        self.lifecycle.record_feedback(reply_id, feedback).await
    }

    /// Delete a tweet and its replies.
    pub async fn delete(&self, tweet_id: i64) -> Result<()> {
        self.lifecycle.delete(tweet_id).await
    }

    /// Replies of one tweet.
    pub async fn replies_for(&self, tweet_id: i64) -> Result<Vec<Reply>> {
        self.store.replies_for(tweet_id).await
    }
}
