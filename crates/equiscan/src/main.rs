//! `equiscan` - records equipment scans from unread Gmail messages.
//!
//! Each unread inbox message is searched for an equipment identifier; a match
//! becomes a row in the `entry_log` table and the message is marked read.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use equiscan_gmail::DEFAULT_MAX_RESULTS;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line interface.
#[derive(Debug, Parser)]
#[command(name = "equiscan", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// OAuth token cache [default: <config dir>/equiscan/token.json]
    #[arg(long, global = true, env = "EQUISCAN_TOKEN_CACHE", value_name = "PATH")]
    token_cache: Option<PathBuf>,

    /// Google OAuth client secrets (installed-app JSON)
    #[arg(
        long,
        global = true,
        env = "EQUISCAN_CLIENT_SECRETS",
        value_name = "PATH",
        default_value = "credentials.json"
    )]
    client_secrets: PathBuf,

    /// Database URL; overrides the DB_* variables. A `sqlite:` URL selects SQLite
    #[arg(long, global = true, env = "DATABASE_URL", value_name = "URL")]
    database_url: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Process unread inbox messages
    Scan {
        /// Maximum number of messages per poll
        #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: u32,

        /// Keep polling, waiting this many seconds between polls
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
    /// Run the one-time OAuth consent flow and cache the token
    Authorize,
    /// Create the entry_log table if it does not exist
    InitDb,
    /// Show the latest recorded scans
    Recent {
        /// Number of records to show
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

impl Cli {
    fn token_cache_path(&self) -> PathBuf {
        self.token_cache.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("equiscan")
                .join("token.json")
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "equiscan=info,equiscan_core=info,equiscan_gmail=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(command = ?cli.command, "Starting equiscan");

    match &cli.command {
        Command::Scan {
            max_results,
            interval,
        } => commands::scan(&cli, *max_results, *interval).await,
        Command::Authorize => commands::authorize(&cli).await,
        Command::InitDb => commands::init_db(&cli).await,
        Command::Recent { limit } => commands::recent(&cli, *limit).await,
    }
}
