//! Persisted tweet and reply records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DeskError;
use crate::lifecycle::{ReplyStatus, TweetState};

/// An ingested tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Tweet {
    /// Row id, assigned on insert.
    pub id: i64,
    /// Exact URL the tweet was ingested from. Unique.
    pub url: String,
    /// Author handle, may be empty.
    pub username: String,
    /// Extracted text, may be empty.
    #[sqlx(rename = "tweet_text")]
    pub text: String,
    /// When the tweet was ingested.
    pub created_at: DateTime<Utc>,
    /// Whether the tweet has been posted.
    pub posted: bool,
    /// When the tweet was posted.
    pub posted_at: Option<DateTime<Utc>>,
}

impl Tweet {
    /// Current posting state.
    #[must_use]
    pub fn state(&self) -> TweetState {
        TweetState::from_columns(self.posted, self.posted_at)
    }
}

/// A candidate reply belonging to one tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    /// Row id, assigned on insert.
    pub id: i64,
    /// Owning tweet.
    pub tweet_id: i64,
    /// Candidate text.
    pub content: String,
    /// Rendered operator feedback, if reviewed.
    pub feedback: Option<String>,
    /// Review/posting status.
    pub status: ReplyStatus,
    /// When the reply was generated.
    pub created_at: DateTime<Utc>,
}

/// Raw reply row before the status column is parsed.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReplyRow {
    pub id: i64,
    pub tweet_id: i64,
    pub content: String,
    pub feedback: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReplyRow> for Reply {
    type Error = DeskError;

    fn try_from(row: ReplyRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            tweet_id: row.tweet_id,
            content: row.content,
            feedback: row.feedback,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

/// Fields needed to insert a tweet.
#[derive(Debug, Clone)]
pub struct NewTweet {
    pub url: String,
    pub username: String,
    pub text: String,
}

/// An unposted tweet with its pending replies.
#[derive(Debug, Clone, Serialize)]
pub struct PendingTweet {
    pub tweet: Tweet,
    pub replies: Vec<Reply>,
}
