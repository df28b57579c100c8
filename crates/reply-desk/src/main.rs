//! Reply desk CLI - ingest tweets and review reply candidates.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reply_desk::config::{DeskConfig, DEFAULT_POSTED_LIMIT};
use reply_desk::lifecycle::{Feedback, ReplyStatus};
use reply_desk::pipeline::IngestOutcome;
use reply_desk::storage::{Reply, SqliteStore};
use reply_desk::ReplyDesk;

/// Reply desk CLI - Collect tweets and curate reply candidates.
#[derive(Parser)]
#[command(name = "reply-desk")]
#[command(about = "Tweet ingestion and reply review desk")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// SQLite database file
    #[arg(long, global = true, env = "REPLY_DESK_DB")]
    db: Option<PathBuf>,

    /// CDP endpoint of the running browser
    #[arg(long, global = true, env = "REPLY_DESK_CDP_ENDPOINT")]
    cdp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and schema
    Init,

    /// Ingest a single tweet URL
    Add {
        /// Tweet URL
        url: String,
    },

    /// Ingest many tweet URLs
    Batch {
        /// Tweet URLs
        urls: Vec<String>,

        /// File with one URL per line
        #[arg(long)]
        file: Option<PathBuf>,

        /// URLs ingested at once
        #[arg(long, env = "REPLY_DESK_WORKERS")]
        workers: Option<usize>,

        /// Print the added URLs as JSON
        #[arg(long)]
        json: bool,
    },

    /// List unposted tweets with their replies
    Pending,

    /// List posted tweets
    Posted {
        /// Limit results
        #[arg(long, default_value_t = DEFAULT_POSTED_LIMIT)]
        limit: u32,
    },

    /// Mark a tweet as posted
    Post {
        /// Tweet id
        id: i64,
    },

    /// Record feedback on a reply
    Feedback {
        /// Reply id
        reply_id: i64,

        /// Action taken, e.g. like or dislike
        #[arg(long)]
        action: String,

        /// Preset reason
        #[arg(long)]
        reason: Option<String>,

        /// Free-text note
        #[arg(long)]
        custom: Option<String>,
    },

    /// Delete a tweet and its replies
    Delete {
        /// Tweet id
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reply_desk=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reply_desk=info,warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = DeskConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(endpoint) = cli.cdp_endpoint {
        config.cdp_endpoint = endpoint;
    }

    match cli.command {
        Commands::Init => run_init(&config).await,
        Commands::Add { url } => {
            tracing::info!(url, "Adding tweet");
            run_add(&config, &url).await
        }
        Commands::Batch {
            urls,
            file,
            workers,
            json,
        } => {
            if let Some(workers) = workers {
                config.workers = workers;
            }
            run_batch(&config, urls, file.as_deref(), json).await
        }
        Commands::Pending => run_pending(&config).await,
        Commands::Posted { limit } => run_posted(&config, limit).await,
        Commands::Post { id } => run_post(&config, id).await,
        Commands::Feedback {
            reply_id,
            action,
            reason,
            custom,
        } => run_feedback(&config, reply_id, &Feedback::new(action, reason, custom)).await,
        Commands::Delete { id } => run_delete(&config, id).await,
    }
}

async fn run_init(config: &DeskConfig) -> Result<()> {
    let store = SqliteStore::connect(&config.db_path)
        .await
        .with_context(|| format!("Failed to open {}", config.db_path.display()))?;
    store.close().await;
    println!("{} Database ready: {}", "✓".green(), config.db_path.display());
    Ok(())
}

async fn run_add(config: &DeskConfig, url: &str) -> Result<()> {
    let desk = ReplyDesk::open(config).await?;

    match desk.ingest_one(url).await? {
        IngestOutcome::Added(added) => {
            println!(
                "{} Added tweet {} @{} ({})",
                "✓".green(),
                added.tweet.id,
                added.tweet.username,
                added.category.to_string().cyan()
            );
            print_replies(&added.replies);
        }
        IngestOutcome::Skipped => {
            println!("{} Already ingested: {url}", "•".yellow());
        }
    }
    Ok(())
}

async fn run_batch(
    config: &DeskConfig,
    mut urls: Vec<String>,
    file: Option<&Path>,
    json: bool,
) -> Result<()> {
    if let Some(path) = file {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        urls.extend(read_url_lines(&contents));
    }
    if urls.is_empty() {
        anyhow::bail!("No URLs given");
    }

    let desk = ReplyDesk::open(config).await?;
    let report = desk.ingest_batch(&urls).await;

    if json {
        let body = serde_json::json!({ "added": report.added_urls() });
        println!("{body}");
        return Ok(());
    }

    println!("\n{}", "Batch Summary".bold());
    println!("   Requested: {}", urls.len());
    println!("   Added: {}", report.added.len().to_string().green());
    println!("   Skipped: {}", report.skipped.len());
    if !report.failed.is_empty() {
        println!("   Failed: {}", report.failed.len().to_string().red());
        for (url, err) in &report.failed {
            eprintln!("     - {url}: {err}");
        }
    }
    Ok(())
}

async fn run_pending(config: &DeskConfig) -> Result<()> {
    let desk = ReplyDesk::open(config).await?;
    let pending = desk.list_pending().await?;

    if pending.is_empty() {
        println!("No pending tweets.");
        return Ok(());
    }

    for entry in &pending {
        println!(
            "{} {} @{} {}",
            "▸".cyan(),
            entry.tweet.id,
            entry.tweet.username,
            entry.tweet.url.dimmed()
        );
        if !entry.tweet.text.is_empty() {
            println!("   {}", entry.tweet.text);
        }
        print_replies(&entry.replies);
        println!();
    }

    println!("Total: {} pending", pending.len());
    Ok(())
}

async fn run_posted(config: &DeskConfig, limit: u32) -> Result<()> {
    let desk = ReplyDesk::open(config).await?;
    let posted = desk.list_posted(limit).await?;

    if posted.is_empty() {
        println!("No posted tweets.");
        return Ok(());
    }

    for tweet in &posted {
        let at = tweet
            .posted_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{} {} @{} {} {}", "✓".green(), tweet.id, tweet.username, tweet.url, at.dimmed());
    }
    Ok(())
}

async fn run_post(config: &DeskConfig, id: i64) -> Result<()> {
    let desk = ReplyDesk::open(config).await?;
    let tweet = desk.mark_posted(id).await?;
    println!("{} Tweet {} posted", "✓".green(), tweet.id);
    Ok(())
}

async fn run_feedback(config: &DeskConfig, reply_id: i64, feedback: &Feedback) -> Result<()> {
    let desk = ReplyDesk::open(config).await?;
    let reply = desk.record_feedback(reply_id, feedback).await?;
    println!(
        "{} Reply {} {}: {}",
        "✓".green(),
        reply.id,
        reply.status,
        reply.feedback.unwrap_or_default()
    );
    Ok(())
}

async fn run_delete(config: &DeskConfig, id: i64) -> Result<()> {
    let desk = ReplyDesk::open(config).await?;
    desk.delete(id).await?;
    println!("{} Tweet {id} deleted", "✓".green());
    Ok(())
}

fn print_replies(replies: &[Reply]) {
    for reply in replies {
        let status = match reply.status {
            ReplyStatus::Pending => reply.status.to_string().normal(),
            ReplyStatus::Reviewed => reply.status.to_string().yellow(),
            ReplyStatus::Posted => reply.status.to_string().green(),
        };
        println!("   [{}] {} ({status})", reply.id, reply.content);
    }
}

/// Non-empty, non-comment lines of a URL list.
fn read_url_lines(contents: &str) -> impl Iterator<Item = String> + '_ {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
}
