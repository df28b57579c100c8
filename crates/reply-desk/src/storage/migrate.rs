//! Schema creation.

use sqlx::SqlitePool;

use crate::error::Result;

/// Create tables and indexes if they do not exist. Safe to run repeatedly.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tweets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT UNIQUE NOT NULL,
            username TEXT NOT NULL DEFAULT '',
            tweet_text TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            posted INTEGER NOT NULL DEFAULT 0,
            posted_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS replies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tweet_id INTEGER NOT NULL,
            content TEXT NOT NULL,
            feedback TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            FOREIGN KEY (tweet_id) REFERENCES tweets(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_replies_tweet_id ON replies(tweet_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tweets_posted ON tweets(posted, posted_at DESC)")
        .execute(pool)
        .await?;

    tracing::debug!("Schema migrations applied");
    Ok(())
}
