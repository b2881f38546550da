//! CLI administration tool for shortlink.
//!
//! Works directly against the PostgreSQL store, without going through the
//! HTTP API. Clicks are never counted by these commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a short link
//! cargo run --bin admin -- shorten https://example.com/a/very/long/path
//!
//! # Show one link
//! cargo run --bin admin -- info aZ3kq1x
//!
//! # Totals and the most recent links
//! cargo run --bin admin -- stats --limit 20
//!
//! # Check database connection / apply migrations
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` (required): PostgreSQL connection
//! - `CODE_LENGTH`, `CODE_STRATEGY`, `MAX_SHORTEN_ATTEMPTS`: as for the server

use shortlink::application::services::{LinkService, ShortenService};
use shortlink::config::{self, Config};
use shortlink::domain::entities::ShortLink;
use shortlink::domain::repositories::LinkRepository;
use shortlink::infrastructure::persistence::PgLinkRepository;
use shortlink::server;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Create a short link
    Shorten {
        /// Absolute http(s) URL to shorten
        url: String,
    },

    /// Show a link and its click count
    Info {
        /// Short code
        code: String,
    },

    /// Show totals and the most recent links
    Stats {
        /// Number of recent links to list
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL (or DB_HOST, DB_USER, DB_PASSWORD, DB_NAME) must be set")?;

    let pool = server::connect_pool(&config, &database_url).await?;

    match cli.command {
        Commands::Shorten { url } => shorten(&config, store(pool, &config), &url).await?,
        Commands::Info { code } => info(store(pool, &config), &code).await?,
        Commands::Stats { limit } => stats(store(pool, &config), limit).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn store(pool: PgPool, config: &Config) -> Arc<dyn LinkRepository> {
    Arc::new(PgLinkRepository::new(
        Arc::new(pool),
        config.store_retry_attempts,
    ))
}

/// Creates a short link the same way `POST /api/shorten` does.
async fn shorten(config: &Config, repository: Arc<dyn LinkRepository>, url: &str) -> Result<()> {
    println!("{}", "✂️  Shorten URL".bright_blue().bold());
    println!();

    let generator = server::build_generator(config, repository.as_ref()).await?;
    let service: ShortenService =
        ShortenService::new(repository, generator, config.max_shorten_attempts);

    let link = service
        .shorten(url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shorten URL: {}", e))?;

    print_link(&link);
    println!();
    println!("{}", "✅ Short link created".green().bold());
    println!();

    Ok(())
}

/// Shows one link without counting a click.
async fn info(repository: Arc<dyn LinkRepository>, code: &str) -> Result<()> {
    let service: LinkService = LinkService::new(repository);

    let link = service
        .get_link_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", code, e))?;

    println!("{}", "ℹ️  Short link".bright_blue().bold());
    println!();
    print_link(&link);
    println!();

    Ok(())
}

/// Displays link and click totals followed by the most recent links.
///
/// # Output Format
///
/// ```text
///   Links:   3
///   Clicks:  17
///
///   ID   Code         Clicks  Target
///   3    aZ3kq1x      5       https://example.com/a/very/long/path
/// ```
async fn stats(repository: Arc<dyn LinkRepository>, limit: usize) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let service: LinkService = LinkService::new(repository);
    let total = service
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count links: {}", e))?;
    let links = service
        .list_links(Some(limit))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    let listed_clicks: u64 = links.iter().map(|link| link.clicks).sum();

    println!("  Links:   {}", total.to_string().bright_green().bold());
    println!(
        "  Clicks:  {} {}",
        listed_clicks.to_string().bright_green().bold(),
        format!("(last {} links)", links.len()).bright_black()
    );
    println!();

    if links.is_empty() {
        println!("{}", "  No links yet".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<6} {:<12} {:<8} {}",
        "ID".bright_white().bold(),
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &links {
        println!(
            "  {:<6} {:<12} {:<8} {}",
            link.id.to_string().bright_black(),
            link.short_code.cyan(),
            link.clicks.to_string().bright_green(),
            link.target_url
        );
    }
    println!();

    Ok(())
}

fn print_link(link: &ShortLink) {
    println!("  ID:     {}", link.id.to_string().bright_black());
    println!("  Code:   {}", link.short_code.bright_yellow().bold());
    println!("  Target: {}", link.target_url.cyan());
    println!("  Clicks: {}", link.clicks.to_string().bright_green());
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Migrate => {
            println!("{}", "🛠️  Applying migrations...".bright_blue());

            server::migrate(pool).await?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}
