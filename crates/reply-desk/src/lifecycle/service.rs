//! Applies lifecycle transitions to stored tweets and replies.

use std::sync::Arc;

use chrono::Utc;

use crate::error::{DeskError, Result};
use crate::storage::{Reply, Tweet, TweetStore};

use super::locks::TweetLocks;
use super::state::{Feedback, ReplyStatus};

/// Lifecycle operations, serialized per tweet.
#[derive(Clone)]
pub struct Lifecycle {
    store: Arc<dyn TweetStore>,
    locks: TweetLocks,
}

impl Lifecycle {
    /// Create a lifecycle service over a store.
    #[must_use]
    pub fn new(store: Arc<dyn TweetStore>) -> Self {
        Self {
            store,
            locks: TweetLocks::new(),
        }
    }

    /// Mark a tweet posted, forcing every one of its replies to posted.
    ///
    /// Posting an already-posted tweet changes nothing.
    pub async fn mark_posted(&self, tweet_id: i64) -> Result<Tweet> {
        let _guard = self.locks.acquire(tweet_id).await;

        let tweet = self
            .store
            .get_tweet(tweet_id)
            .await?
            .ok_or_else(|| DeskError::tweet_not_found(tweet_id))?;

        let at = Utc::now();
        if tweet.state().post(at).is_none() {
            tracing::info!(tweet_id, "Tweet already posted");
            return Ok(tweet);
        }

        self.store.mark_tweet_posted(tweet_id, at).await?;

        tracing::info!(tweet_id, url = %tweet.url, "Marked tweet posted");

        self.store
            .get_tweet(tweet_id)
            .await?
            .ok_or_else(|| DeskError::tweet_not_found(tweet_id))
    }

    /// Record operator feedback on a reply and move it to reviewed.
    pub async fn record_feedback(&self, reply_id: i64, feedback: &Feedback) -> Result<Reply> {
        let owner = self
            .store
            .get_reply(reply_id)
            .await?
            .ok_or_else(|| DeskError::reply_not_found(reply_id))?
            .tweet_id;

        let _guard = self.locks.acquire(owner).await;

        // Re-read under the lock; a post may have landed while waiting
        let reply = self
            .store
            .get_reply(reply_id)
            .await?
            .ok_or_else(|| DeskError::reply_not_found(reply_id))?;

        let next = reply
            .status
            .after_feedback()
            .map_err(|from| DeskError::InvalidTransition {
                reply_id,
                from,
                to: ReplyStatus::Reviewed,
            })?;

        let rendered = feedback.render();
        self.store
            .set_reply_feedback(reply_id, &rendered, next)
            .await?;

        tracing::info!(reply_id, tweet_id = owner, feedback = %rendered, "Recorded feedback");

        Ok(Reply {
            feedback: Some(rendered),
            status: next,
            ..reply
        })
    }

    /// Delete a tweet and all its replies.
    pub async fn delete(&self, tweet_id: i64) -> Result<()> {
        let _guard = self.locks.acquire(tweet_id).await;
        self.store.delete_tweet(tweet_id).await?;

        tracing::info!(tweet_id, "Deleted tweet");
        Ok(())
    }
}
