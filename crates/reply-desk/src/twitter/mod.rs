//! Twitter/X content retrieval module.
//!
//! Provides URL parsing and browser-backed fetching of tweet text.

mod cascade;
mod fetcher;
mod types;

pub use cascade::{
    SelectorCascade, ARTICLE_LANG_SELECTOR, LEGACY_CLASS_SELECTOR, TWEET_TEXT_SELECTOR,
};
pub use fetcher::{BrowserFetcher, ContentSource};
pub use types::{truncate_chars, username_from_url, FetchedContent, MAX_TEXT_CHARS};
