//! Tweet and reply state machine.
//!
//! Tweets move one way from pending to posted. Replies move from pending to
//! reviewed through feedback, and from pending or reviewed to posted only when
//! their tweet is posted. Posting a tweet overwrites `reviewed` replies too.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DeskError;

/// Posting state of a tweet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum TweetState {
    /// Not posted yet.
    Pending,
    /// Posted at the given time. Terminal.
    Posted { at: DateTime<Utc> },
}

impl TweetState {
    /// Build the state from stored columns.
    #[must_use]
    pub fn from_columns(posted: bool, posted_at: Option<DateTime<Utc>>) -> Self {
        match (posted, posted_at) {
            (true, Some(at)) => Self::Posted { at },
            // A posted row without a timestamp predates posted_at tracking
            (true, None) => Self::Posted {
                at: DateTime::<Utc>::UNIX_EPOCH,
            },
            (false, _) => Self::Pending,
        }
    }

    /// Whether the tweet has been posted.
    #[must_use]
    pub fn is_posted(&self) -> bool {
        matches!(self, Self::Posted { .. })
    }

    /// Transition to posted. Returns `None` when already posted.
    #[must_use]
    pub fn post(self, at: DateTime<Utc>) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Posted { at }),
            Self::Posted { .. } => None,
        }
    }
}

/// Review/posting status of a candidate reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    /// Freshly generated.
    Pending,
    /// Feedback recorded.
    Reviewed,
    /// Owning tweet was posted. Terminal.
    Posted,
}

impl ReplyStatus {
    /// Column value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Posted => "posted",
        }
    }

    /// Status after feedback is submitted.
    ///
    /// Pending becomes reviewed; reviewed stays reviewed. Posted replies
    /// cannot take feedback.
    pub fn after_feedback(self) -> Result<Self, Self> {
        match self {
            Self::Pending | Self::Reviewed => Ok(Self::Reviewed),
            Self::Posted => Err(self),
        }
    }

    /// Status after the owning tweet is posted: always posted, whatever the
    /// prior review state.
    #[must_use]
    pub fn after_tweet_posted(self) -> Self {
        Self::Posted
    }
}

impl fmt::Display for ReplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplyStatus {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "reviewed" => Ok(Self::Reviewed),
            "posted" => Ok(Self::Posted),
            other => Err(DeskError::UnknownStatus(other.to_string())),
        }
    }
}

/// Operator feedback on a reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// What the operator did, e.g. `like` or `dislike`.
    pub action: String,
    /// Preset reason, may be empty.
    #[serde(default)]
    pub reason: String,
    /// Free-text note, may be empty.
    #[serde(default)]
    pub custom: String,
}

impl Feedback {
    /// Create feedback from its parts. Missing parts are empty.
    #[must_use]
    pub fn new(action: impl Into<String>, reason: Option<String>, custom: Option<String>) -> Self {
        Self {
            action: action.into(),
            reason: reason.unwrap_or_default(),
            custom: custom.unwrap_or_default(),
        }
    }

    /// Render the stored feedback string: `action[:reason][ - custom]`.
    #[must_use]
    pub fn render(&self) -> String {
        let mut rendered = if self.reason.is_empty() {
            self.action.clone()
        } else {
            format!("{}:{}", self.action, self.reason)
        };
        if !self.custom.is_empty() {
            rendered.push_str(" - ");
            rendered.push_str(&self.custom);
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_action_and_reason() {
        let fb = Feedback::new("like", Some("funny".to_string()), Some(String::new()));
        assert_eq!(fb.render(), "like:funny");
    }

    #[test]
    fn test_feedback_custom_without_reason() {
        let fb = Feedback::new("dislike", Some(String::new()), Some("too generic".to_string()));
        assert_eq!(fb.render(), "dislike - too generic");
    }

    #[test]
    fn test_feedback_all_parts() {
        let fb = Feedback::new("like", Some("on-brand".to_string()), Some("use again".to_string()));
        assert_eq!(fb.render(), "like:on-brand - use again");
    }

    #[test]
    fn test_feedback_action_only() {
        assert_eq!(Feedback::new("like", None, None).render(), "like");
    }

    #[test]
    fn test_reply_feedback_transitions() {
        assert_eq!(ReplyStatus::Pending.after_feedback(), Ok(ReplyStatus::Reviewed));
        assert_eq!(ReplyStatus::Reviewed.after_feedback(), Ok(ReplyStatus::Reviewed));
        assert_eq!(ReplyStatus::Posted.after_feedback(), Err(ReplyStatus::Posted));
    }

    #[test]
    fn test_tweet_post_overwrites_review() {
        for status in [ReplyStatus::Pending, ReplyStatus::Reviewed, ReplyStatus::Posted] {
            assert_eq!(status.after_tweet_posted(), ReplyStatus::Posted);
        }
    }

    #[test]
    fn test_tweet_post_is_one_way() {
        let now = Utc::now();
        let posted = TweetState::Pending.post(now).unwrap();
        assert_eq!(posted, TweetState::Posted { at: now });
        assert!(posted.post(Utc::now()).is_none());
    }

    #[test]
    fn test_tweet_state_from_columns() {
        assert_eq!(TweetState::from_columns(false, None), TweetState::Pending);
        assert!(TweetState::from_columns(true, None).is_posted());
    }

    #[test]
    fn test_status_round_trips_column() {
        for status in [ReplyStatus::Pending, ReplyStatus::Reviewed, ReplyStatus::Posted] {
            assert_eq!(status.as_str().parse::<ReplyStatus>().unwrap(), status);
        }
        assert!("archived".parse::<ReplyStatus>().is_err());
    }
}
