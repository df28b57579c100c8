//! SQLite-backed tweet store.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::SqliteConnection;

use crate::error::{DeskError, Result};
use crate::lifecycle::ReplyStatus;

use super::migrate::run_migrations;
use super::models::{NewTweet, PendingTweet, Reply, ReplyRow, Tweet};
use super::TweetStore;

const TWEET_COLUMNS: &str = "id, url, username, tweet_text, created_at, posted, posted_at";
const REPLY_COLUMNS: &str = "id, tweet_id, content, feedback, status, created_at";

/// Tweet store over a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `path` and apply the schema.
    pub async fn connect(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Open a private in-memory database. Mostly useful for tests.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Each in-memory connection is its own database, so keep exactly one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, applying the schema.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Insert one tweet row on an open connection.
    async fn insert_tweet(conn: &mut SqliteConnection, tweet: &NewTweet, now: DateTime<Utc>) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO tweets (url, username, tweet_text, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&tweet.url)
        .bind(&tweet.username)
        .bind(&tweet.text)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => DeskError::DuplicateUrl {
                url: tweet.url.clone(),
            },
            other => DeskError::Storage(other),
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Insert one pending reply row on an open connection.
    async fn insert_reply(
        conn: &mut SqliteConnection,
        tweet_id: i64,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO replies (tweet_id, content, status, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(tweet_id)
        .bind(content)
        .bind(ReplyStatus::Pending.as_str())
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn fetch_replies(&self, sql: &str, bind: Option<i64>) -> Result<Vec<Reply>> {
        let mut query = sqlx::query_as::<_, ReplyRow>(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Reply::try_from)
            .collect()
    }
}

#[async_trait]
impl TweetStore for SqliteStore {
    async fn tweet_exists_by_url(&self, url: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tweets WHERE url = ?)")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert_tweet_with_replies(&self, tweet: &NewTweet, replies: &[String]) -> Result<Tweet> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let tweet_id = Self::insert_tweet(&mut *tx, tweet, now).await?;
        for content in replies {
            Self::insert_reply(&mut *tx, tweet_id, content, now).await?;
        }

        tx.commit().await?;

        tracing::debug!(tweet_id, replies = replies.len(), url = %tweet.url, "Inserted tweet");

        Ok(Tweet {
            id: tweet_id,
            url: tweet.url.clone(),
            username: tweet.username.clone(),
            text: tweet.text.clone(),
            created_at: now,
            posted: false,
            posted_at: None,
        })
    }

    async fn get_tweet(&self, tweet_id: i64) -> Result<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(&format!(
            "SELECT {TWEET_COLUMNS} FROM tweets WHERE id = ?"
        ))
        .bind(tweet_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tweet)
    }

    async fn get_reply(&self, reply_id: i64) -> Result<Option<Reply>> {
        let row = sqlx::query_as::<_, ReplyRow>(&format!(
            "SELECT {REPLY_COLUMNS} FROM replies WHERE id = ?"
        ))
        .bind(reply_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Reply::try_from).transpose()
    }

    async fn replies_for(&self, tweet_id: i64) -> Result<Vec<Reply>> {
        self.fetch_replies(
            &format!("SELECT {REPLY_COLUMNS} FROM replies WHERE tweet_id = ? ORDER BY id"),
            Some(tweet_id),
        )
        .await
    }

    async fn list_pending(&self) -> Result<Vec<PendingTweet>> {
        let tweets = sqlx::query_as::<_, Tweet>(&format!(
            "SELECT {TWEET_COLUMNS} FROM tweets WHERE posted = 0 ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let replies = self
            .fetch_replies(
                &format!(
                    "SELECT r.id, r.tweet_id, r.content, r.feedback, r.status, r.created_at \
                     FROM replies r JOIN tweets t ON t.id = r.tweet_id \
                     WHERE t.posted = 0 AND r.status = '{}' ORDER BY r.id",
                    ReplyStatus::Pending.as_str()
                ),
                None,
            )
            .await?;

        let mut by_tweet: HashMap<i64, Vec<Reply>> = HashMap::new();
        for reply in replies {
            by_tweet.entry(reply.tweet_id).or_default().push(reply);
        }

        Ok(tweets
            .into_iter()
            .map(|tweet| PendingTweet {
                replies: by_tweet.remove(&tweet.id).unwrap_or_default(),
                tweet,
            })
            .collect())
    }

    async fn list_posted(&self, limit: u32) -> Result<Vec<Tweet>> {
        let tweets = sqlx::query_as::<_, Tweet>(&format!(
            "SELECT {TWEET_COLUMNS} FROM tweets WHERE posted = 1 ORDER BY posted_at DESC, id DESC LIMIT ?"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(tweets)
    }

    async fn mark_tweet_posted(&self, tweet_id: i64, at: DateTime<Utc>) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE tweets SET posted = 1, posted_at = ? WHERE id = ? AND posted = 0")
            .bind(at)
            .bind(tweet_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if updated == 0 {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tweets WHERE id = ?)")
                .bind(tweet_id)
                .fetch_one(&mut *tx)
                .await?;
            tx.rollback().await?;
            return if exists {
                Ok(false)
            } else {
                Err(DeskError::tweet_not_found(tweet_id))
            };
        }

        // Every reply follows the tweet, reviewed ones included
        let cascaded = sqlx::query("UPDATE replies SET status = ? WHERE tweet_id = ?")
            .bind(ReplyStatus::Reviewed.after_tweet_posted().as_str())
            .bind(tweet_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::debug!(tweet_id, replies = cascaded, "Marked tweet posted");
        Ok(true)
    }

    async fn set_reply_feedback(&self, reply_id: i64, feedback: &str, status: ReplyStatus) -> Result<()> {
        let updated = sqlx::query("UPDATE replies SET feedback = ?, status = ? WHERE id = ?")
            .bind(feedback)
            .bind(status.as_str())
            .bind(reply_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(DeskError::reply_not_found(reply_id));
        }
        Ok(())
    }

    async fn delete_tweet(&self, tweet_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let replies = sqlx::query("DELETE FROM replies WHERE tweet_id = ?")
            .bind(tweet_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let tweets = sqlx::query("DELETE FROM tweets WHERE id = ?")
            .bind(tweet_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if tweets == 0 {
            tx.rollback().await?;
            return Err(DeskError::tweet_not_found(tweet_id));
        }

        tx.commit().await?;

        tracing::debug!(tweet_id, replies, "Deleted tweet");
        Ok(())
    }

    async fn count_tweets(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tweets")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_replies(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM replies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_tweet(url: &str) -> NewTweet {
        NewTweet {
            url: url.to_string(),
            username: "alice".to_string(),
            text: "I shipped a new feature today".to_string(),
        }
    }

    fn candidates(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("reply {i}")).collect()
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let store = SqliteStore::in_memory().await.unwrap();
        let tweet = store
            .insert_tweet_with_replies(&new_tweet("https://x.com/alice/status/1"), &candidates(3))
            .await
            .unwrap();

        let loaded = store.get_tweet(tweet.id).await.unwrap().unwrap();
        assert_eq!(loaded.url, "https://x.com/alice/status/1");
        assert_eq!(loaded.text, "I shipped a new feature today");
        assert!(!loaded.posted);
        assert!(loaded.posted_at.is_none());

        let replies = store.replies_for(tweet.id).await.unwrap();
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0].content, "reply 0");
        assert!(replies.iter().all(|r| r.status == ReplyStatus::Pending));
        assert!(replies.iter().all(|r| r.feedback.is_none()));
    }

    #[tokio::test]
    async fn test_duplicate_url_rolls_back() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .insert_tweet_with_replies(&new_tweet("https://x.com/a/status/1"), &candidates(2))
            .await
            .unwrap();

        let err = store
            .insert_tweet_with_replies(&new_tweet("https://x.com/a/status/1"), &candidates(5))
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::DuplicateUrl { .. }));

        assert_eq!(store.count_tweets().await.unwrap(), 1);
        assert_eq!(store.count_replies().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_post_cascade_overwrites_reviewed() {
        let store = SqliteStore::in_memory().await.unwrap();
        let tweet = store
            .insert_tweet_with_replies(&new_tweet("https://x.com/a/status/2"), &candidates(3))
            .await
            .unwrap();
        let replies = store.replies_for(tweet.id).await.unwrap();
        store
            .set_reply_feedback(replies[0].id, "like:funny", ReplyStatus::Reviewed)
            .await
            .unwrap();

        assert!(store.mark_tweet_posted(tweet.id, Utc::now()).await.unwrap());

        let replies = store.replies_for(tweet.id).await.unwrap();
        assert!(replies.iter().all(|r| r.status == ReplyStatus::Posted));
        assert_eq!(replies[0].feedback.as_deref(), Some("like:funny"));

        let tweet = store.get_tweet(tweet.id).await.unwrap().unwrap();
        assert!(tweet.posted);
        assert!(tweet.posted_at.is_some());
    }

    #[tokio::test]
    async fn test_post_twice_keeps_first_timestamp() {
        let store = SqliteStore::in_memory().await.unwrap();
        let tweet = store
            .insert_tweet_with_replies(&new_tweet("https://x.com/a/status/3"), &[])
            .await
            .unwrap();

        assert!(store.mark_tweet_posted(tweet.id, Utc::now()).await.unwrap());
        let first = store.get_tweet(tweet.id).await.unwrap().unwrap().posted_at;

        assert!(!store.mark_tweet_posted(tweet.id, Utc::now()).await.unwrap());
        let second = store.get_tweet(tweet.id).await.unwrap().unwrap().posted_at;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_post_missing_tweet() {
        let store = SqliteStore::in_memory().await.unwrap();
        let err = store.mark_tweet_posted(42, Utc::now()).await.unwrap_err();
        assert!(matches!(err, DeskError::NotFound { entity: "Tweet", id: 42 }));
    }

    #[tokio::test]
    async fn test_delete_cascades_replies() {
        let store = SqliteStore::in_memory().await.unwrap();
        let keep = store
            .insert_tweet_with_replies(&new_tweet("https://x.com/a/status/4"), &candidates(2))
            .await
            .unwrap();
        let gone = store
            .insert_tweet_with_replies(&new_tweet("https://x.com/a/status/5"), &candidates(4))
            .await
            .unwrap();

        store.delete_tweet(gone.id).await.unwrap();

        assert!(store.get_tweet(gone.id).await.unwrap().is_none());
        assert!(store.replies_for(gone.id).await.unwrap().is_empty());
        assert_eq!(store.count_replies().await.unwrap(), 2);
        assert!(store.get_tweet(keep.id).await.unwrap().is_some());

        let err = store.delete_tweet(gone.id).await.unwrap_err();
        assert!(matches!(err, DeskError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_pending_and_posted() {
        let store = SqliteStore::in_memory().await.unwrap();
        let first = store
            .insert_tweet_with_replies(&new_tweet("https://x.com/a/status/6"), &candidates(2))
            .await
            .unwrap();
        let second = store
            .insert_tweet_with_replies(&new_tweet("https://x.com/a/status/7"), &candidates(3))
            .await
            .unwrap();

        // Reviewed replies drop out of the pending view
        let replies = store.replies_for(second.id).await.unwrap();
        store
            .set_reply_feedback(replies[1].id, "dislike", ReplyStatus::Reviewed)
            .await
            .unwrap();

        let pending = store.list_pending().await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].tweet.id, second.id);
        assert_eq!(pending[0].replies.len(), 2);
        assert_eq!(pending[1].replies.len(), 2);

        store.mark_tweet_posted(first.id, Utc::now()).await.unwrap();

        let pending = store.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        let posted = store.list_posted(20).await.unwrap();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].id, first.id);
        assert!(store.list_posted(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_feedback_on_missing_reply() {
        let store = SqliteStore::in_memory().await.unwrap();
        let err = store
            .set_reply_feedback(9, "like", ReplyStatus::Reviewed)
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::NotFound { entity: "Reply", id: 9 }));
    }
}
