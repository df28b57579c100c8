//! Ingestion pipeline - orchestrates the dedup-fetch-classify-generate-store flow.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::analysis::{Category, RuleTable};
use crate::config::DeskConfig;
use crate::error::{DeskError, FetchError, Result};
use crate::replies;
use crate::storage::{DedupGuard, NewTweet, Reply, Tweet, TweetStore};
use crate::twitter::{ContentSource, FetchedContent};

/// A tweet that was stored by ingestion, with its generated replies.
#[derive(Debug, Clone, Serialize)]
pub struct IngestedTweet {
    pub tweet: Tweet,
    pub category: Category,
    pub replies: Vec<Reply>,
}

/// What ingesting one URL did.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// A new tweet and its replies were stored.
    Added(IngestedTweet),
    /// The URL was already stored; nothing changed.
    Skipped,
}

/// Result of a batch ingestion.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// URLs that produced a new tweet, in input order.
    pub added: Vec<IngestedTweet>,
    /// URLs already stored.
    pub skipped: Vec<String>,
    /// URLs whose ingestion failed, with the reason.
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    /// URLs that were newly added, in input order.
    #[must_use]
    pub fn added_urls(&self) -> Vec<&str> {
        self.added.iter().map(|t| t.tweet.url.as_str()).collect()
    }
}

/// Ingestion orchestrator.
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<dyn TweetStore>,
    source: Arc<dyn ContentSource>,
    dedup: DedupGuard,
    rules: RuleTable,
    url_timeout: Duration,
    workers: usize,
}

impl Pipeline {
    /// Create a new pipeline.
    #[must_use]
    pub fn new(store: Arc<dyn TweetStore>, source: Arc<dyn ContentSource>, config: &DeskConfig) -> Self {
        Self {
            dedup: DedupGuard::new(store.clone()),
            store,
            source,
            rules: RuleTable::default(),
            url_timeout: config.url_timeout,
            workers: config.workers.max(1),
        }
    }

    /// Replace the classification rules.
    #[must_use]
    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    /// Ingest a single URL.
    ///
    /// Already-stored URLs are skipped without fetching. Fetch failures never
    /// fail ingestion: the tweet is stored with whatever could be recovered.
    pub async fn ingest_one(&self, url: &str) -> Result<IngestOutcome> {
        if self.dedup.exists(url).await? {
            tracing::info!(url, "Skipping already ingested URL");
            return Ok(IngestOutcome::Skipped);
        }

        let content = match self.source.fetch(url).await {
            Ok(content) => content,
            Err(FetchError::NoMatch { username }) => {
                tracing::warn!(url, "No tweet text found on page");
                FetchedContent {
                    text: String::new(),
                    username,
                }
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Fetch failed - storing without content");
                FetchedContent::empty()
            }
        };

        let category = self.rules.classify(&content.text);
        let candidates = replies::generate(category, content.text_len());
        tracing::debug!(url, %category, replies = candidates.len(), "Classified tweet");

        let new_tweet = NewTweet {
            url: url.to_string(),
            username: content.username,
            text: content.text,
        };
        // A URL stored concurrently past the dedup check fails as DuplicateUrl
        let tweet = self
            .store
            .insert_tweet_with_replies(&new_tweet, &candidates)
            .await?;
        let replies = self.store.replies_for(tweet.id).await?;

        tracing::info!(
            url,
            id = tweet.id,
            username = %tweet.username,
            %category,
            replies = replies.len(),
            "Stored tweet"
        );

        Ok(IngestOutcome::Added(IngestedTweet {
            tweet,
            category,
            replies,
        }))
    }

    /// Ingest many URLs.
    ///
    /// Runs up to `workers` URLs at once, each bounded by the per-URL timeout.
    /// A failing URL is recorded and never aborts the rest.
    pub async fn ingest_batch(&self, urls: &[String]) -> BatchReport {
        let mut report = BatchReport::default();

        tracing::info!(urls = urls.len(), workers = self.workers, "Starting batch");

        let results: Vec<(String, Result<IngestOutcome>)> = stream::iter(urls.iter().cloned())
            .map(|url| async move {
                let result = match tokio::time::timeout(self.url_timeout, self.ingest_one(&url)).await {
                    Ok(result) => result,
                    Err(_) => Err(DeskError::Timeout {
                        url: url.clone(),
                        after: self.url_timeout,
                    }),
                };
                (url, result)
            })
            .buffered(self.workers)
            .collect()
            .await;

        for (url, result) in results {
            match result {
                Ok(IngestOutcome::Added(tweet)) => report.added.push(tweet),
                Ok(IngestOutcome::Skipped) => report.skipped.push(url),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Ingestion failed");
                    report.failed.push((url, e.to_string()));
                }
            }
        }

        tracing::info!(
            requested = urls.len(),
            added = report.added.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Batch complete"
        );

        report
    }
}
