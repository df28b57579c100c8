//! Tweet storage module.
//!
//! Defines the persistence operations the desk consumes and a SQLite
//! implementation of them. Every write that touches more than one row runs in a
//! single transaction.

mod dedup;
mod migrate;
mod models;
mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::lifecycle::ReplyStatus;

pub use dedup::DedupGuard;
pub use migrate::run_migrations;
pub use models::{NewTweet, PendingTweet, Reply, Tweet};
pub use sqlite::SqliteStore;

/// Persistence gateway for tweets and their replies.
#[async_trait]
pub trait TweetStore: Send + Sync {
    /// Whether a tweet with exactly this URL exists.
    async fn tweet_exists_by_url(&self, url: &str) -> Result<bool>;

    /// Insert a tweet and one pending reply per candidate, all or nothing.
    async fn insert_tweet_with_replies(&self, tweet: &NewTweet, replies: &[String]) -> Result<Tweet>;

    /// Fetch a tweet by id.
    async fn get_tweet(&self, tweet_id: i64) -> Result<Option<Tweet>>;

    /// Fetch a reply by id.
    async fn get_reply(&self, reply_id: i64) -> Result<Option<Reply>>;

    /// All replies of a tweet, in creation order.
    async fn replies_for(&self, tweet_id: i64) -> Result<Vec<Reply>>;

    /// Unposted tweets, newest first, each with its pending replies.
    async fn list_pending(&self) -> Result<Vec<PendingTweet>>;

    /// Posted tweets, most recently posted first.
    async fn list_posted(&self, limit: u32) -> Result<Vec<Tweet>>;

    /// Mark a tweet posted and force all its replies to posted.
    ///
    /// Returns `false` without changes when the tweet was already posted.
    async fn mark_tweet_posted(&self, tweet_id: i64, at: DateTime<Utc>) -> Result<bool>;

    /// Store rendered feedback and the resulting status on a reply.
    async fn set_reply_feedback(&self, reply_id: i64, feedback: &str, status: ReplyStatus) -> Result<()>;

    /// Delete a tweet and all its replies.
    async fn delete_tweet(&self, tweet_id: i64) -> Result<()>;

    /// Number of stored tweets.
    async fn count_tweets(&self) -> Result<i64>;

    /// Number of stored replies.
    async fn count_replies(&self) -> Result<i64>;
}
