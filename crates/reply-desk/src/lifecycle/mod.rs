//! Tweet and reply lifecycle.
//!
//! Pure transition rules live in [`state`]; [`Lifecycle`] applies them to the
//! store while holding a per-tweet lock so a post and a review of the same
//! tweet never interleave.

mod locks;
mod service;
mod state;

pub use locks::{TweetLockGuard, TweetLocks};
pub use service::Lifecycle;
pub use state::{Feedback, ReplyStatus, TweetState};
