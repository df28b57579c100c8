//! Per-tweet mutual exclusion for lifecycle changes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = Arc<Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>>;

/// Keyed async locks, one per tweet id.
///
/// A reply change takes the lock of its owning tweet, so posting a tweet and
/// reviewing one of its replies never interleave. Entries live only while
/// someone holds or waits for them.
#[derive(Debug, Default, Clone)]
pub struct TweetLocks {
    table: LockTable,
}

/// Exclusive access to one tweet. Releases on drop.
#[derive(Debug)]
pub struct TweetLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    lock: Arc<AsyncMutex<()>>,
    table: LockTable,
    tweet_id: i64,
}

impl TweetLocks {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a tweet.
    pub async fn acquire(&self, tweet_id: i64) -> TweetLockGuard {
        let lock = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(table.entry(tweet_id).or_default())
        };
        let guard = Arc::clone(&lock).lock_owned().await;
        TweetLockGuard {
            guard: Some(guard),
            lock,
            table: Arc::clone(&self.table),
            tweet_id,
        }
    }

    /// Number of tweets with a lock entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no lock entries exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for TweetLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // The table and this guard are the only owners: nobody is waiting
        if Arc::strong_count(&self.lock) == 2 {
            table.remove(&self.tweet_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_tweet_is_exclusive() {
        let locks = TweetLocks::new();
        let guard = locks.acquire(1).await;

        let contender = locks.clone();
        let waiting = tokio::spawn(async move {
            let _guard = contender.acquire(1).await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_tweets_do_not_block() {
        let locks = TweetLocks::new();
        let _one = locks.acquire(1).await;
        let two = tokio::time::timeout(Duration::from_millis(200), locks.acquire(2)).await;
        assert!(two.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_entry_pruned_after_release() {
        let locks = TweetLocks::new();
        for id in 0..100 {
            drop(locks.acquire(id).await);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_entry_kept_while_waiter_queued() {
        let locks = TweetLocks::new();
        let first = locks.acquire(7).await;

        let contender = locks.clone();
        let (tx, rx) = tokio::sync::oneshot::channel();
        let waiting = tokio::spawn(async move {
            let guard = contender.acquire(7).await;
            rx.await.unwrap();
            drop(guard);
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        drop(first);
        assert_eq!(locks.len(), 1);

        tx.send(()).unwrap();
        waiting.await.unwrap();
        assert!(locks.is_empty());
    }
}
