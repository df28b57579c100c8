//! Reply desk for Twitter/X posts.
//!
//! This crate provides:
//! - Tweet text retrieval from an already-running browser over CDP
//! - Keyword classification into reply categories
//! - Canned reply candidate generation
//! - SQLite storage with duplicate URL detection
//! - A review lifecycle for tweets and their replies

pub mod analysis;
pub mod config;
pub mod desk;
pub mod error;
pub mod lifecycle;
pub mod pipeline;
pub mod replies;
pub mod storage;
pub mod twitter;

// Re-export main types
pub use analysis::Category;
pub use config::DeskConfig;
pub use desk::ReplyDesk;
pub use error::{DeskError, FetchError, Result};
pub use lifecycle::{Feedback, ReplyStatus, TweetState};
pub use pipeline::{BatchReport, IngestOutcome, IngestedTweet, Pipeline};
pub use storage::{PendingTweet, Reply, SqliteStore, Tweet, TweetStore};
pub use twitter::{BrowserFetcher, ContentSource, FetchedContent};
