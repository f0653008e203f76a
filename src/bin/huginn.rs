//! huginn: Stack Exchange user lookup CLI
//!
//! Resolves users by id, or lists who bookmarked a post.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use huginn::{Config, SedeClient, User, UserFetcher, bookmark_users};
use tracing::info;

/// Huginn CLI
#[derive(Parser)]
#[command(name = "huginn")]
#[command(version = huginn::version::PKG_VERSION)]
#[command(about = "Rate-limited Stack Exchange user lookups")]
struct Args {
    /// Site id (e.g. stackoverflow, superuser) or site host name
    #[arg(short, long, env = "HUGINN_SITE")]
    site: Option<String>,

    /// Stack Exchange application key
    #[arg(short, long, env = "HUGINN_KEY")]
    key: Option<String>,

    /// Config file (default: <config dir>/huginn/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up users by id, in the order given
    Users {
        /// User ids
        #[arg(required = true)]
        ids: Vec<u64>,
        /// Report ids the API does not return as deleted users
        #[arg(long)]
        deleted: bool,
        /// Print Stacks user cards instead of plain text
        #[arg(long)]
        html: bool,
    },

    /// List the users who bookmarked a post
    Bookmarkers {
        /// Post (question) id
        post_id: u64,
        /// Print Stacks user cards instead of plain text
        #[arg(long)]
        html: bool,
    },
}

fn describe(user: &User) -> String {
    match user {
        User::Existing(u) => format!(
            "{}\t{}\t{}",
            u.user_id,
            u.display_name,
            huginn::users::full_reputation(u.reputation)
        ),
        User::Missing(u) => format!("{}\t(deleted)", u.user_id),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(site) = args.site {
        config.api.site = Some(huginn::api::site_id_from_host(&site));
    }
    if args.key.is_some() {
        config.api.key = args.key;
    }
    let fetcher = UserFetcher::from_config(&config)?;
    info!(site = fetcher.api().site(), "huginn {}", huginn::version::version_string());

    match args.command {
        Command::Users { ids, deleted, html } => {
            let fetcher = if deleted {
                fetcher.missing_assume_deleted(true)
            } else {
                fetcher
            };
            for user in fetcher.resolve(&ids).await? {
                if html {
                    println!("{}", user.to_html(None));
                } else {
                    println!("{}", describe(&user));
                }
            }
        }

        Command::Bookmarkers { post_id, html } => {
            let sede = SedeClient::from_config(&config.sede, fetcher.api().site())?;
            let bookmarks = bookmark_users(&sede, &fetcher, post_id).await?;
            info!(post_id, bookmarks = bookmarks.len(), "resolved bookmarkers");
            if bookmarks.is_empty() {
                eprintln!("No bookmarkers known (yet)");
            }
            for (date, user) in bookmarks {
                let date = date.format("%Y-%m-%d").to_string();
                if html {
                    println!("{}", user.to_html(Some(&date)));
                } else {
                    println!("{date}\t{}", describe(&user));
                }
            }
        }
    }

    Ok(())
}
