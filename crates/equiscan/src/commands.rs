//! Subcommand implementations.

use std::time::Duration;

use anyhow::{Context, Result};
use equiscan_core::{BatchReport, DbConfig, InboxProcessor, ScanStore};
use equiscan_gmail::GmailSession;
use equiscan_oauth::flow::extract_code;
use equiscan_oauth::provider::{GMAIL_MODIFY_SCOPE, GMAIL_READONLY_SCOPE};
use equiscan_oauth::{
    Authenticator, AuthorizationCodeFlow, ClientSecrets, OAuthClient, Token, TokenStore,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use crate::Cli;

/// Polls the inbox once, or every `interval` seconds until Ctrl-C.
pub async fn scan(cli: &Cli, max_results: u32, interval: Option<u64>) -> Result<()> {
    let session = open_session(cli).await?;
    let store = open_store(cli).await?;
    let processor = InboxProcessor::new(&session, &store);

    let Some(interval) = interval else {
        let report = processor
            .poll(max_results)
            .await
            .context("Failed to list unread messages")?;
        summarize(&report);
        return Ok(());
    };

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(Duration::from_secs(interval));

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("Interrupted, stopping");
                break;
            }
        }

        // A failed listing only skips this round when looping
        match processor.poll(max_results).await {
            Ok(report) => summarize(&report),
            Err(e) => error!(error = %e, "Poll failed"),
        }
    }

    Ok(())
}

/// Runs the consent flow and writes the token cache.
pub async fn authorize(cli: &Cli) -> Result<()> {
    let client = load_client(cli).await?;
    let flow = AuthorizationCodeFlow::new(client).with_pkce();
    let url = flow.authorization_url(None, None)?;

    println!("Open this URL in a browser and grant access:\n\n{url}\n");
    println!("Paste the code, or the full URL the browser was redirected to:");

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read authorization code")?;
    let code = extract_code(&line)?;

    let token = flow
        .exchange_code(&code, None)
        .await
        .context("Failed to exchange authorization code")?;

    warn_missing_scopes(&token);

    let store = TokenStore::new(cli.token_cache_path());
    store.save(&token).await?;
    info!(path = %store.path().display(), "Token cached");
    Ok(())
}

/// Creates the `entry_log` table.
pub async fn init_db(cli: &Cli) -> Result<()> {
    let store = open_store(cli).await?;
    store.ensure_schema().await?;
    info!(backend = store.backend(), "entry_log table ready");
    Ok(())
}

/// Prints the latest scan records.
pub async fn recent(cli: &Cli, limit: u32) -> Result<()> {
    let store = open_store(cli).await?;
    let records = store.recent(limit).await?;

    if records.is_empty() {
        println!("No scans recorded.");
    }
    for record in records {
        println!(
            "{:>6}  {}  {}",
            record.id,
            record.equipment_id,
            record.scanned_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

fn summarize(report: &BatchReport) {
    info!("Inserted {} new entry log record(s).", report.new_records);
    let pending = report.unacknowledged();
    if pending > 0 {
        info!(pending, "Messages left unread for the next poll");
    }
}

async fn load_client(cli: &Cli) -> Result<OAuthClient> {
    let secrets = ClientSecrets::load(&cli.client_secrets)
        .await
        .with_context(|| {
            format!(
                "Failed to load client secrets from {}",
                cli.client_secrets.display()
            )
        })?;
    Ok(secrets.into_client()?)
}

async fn open_session(cli: &Cli) -> Result<GmailSession> {
    let client = load_client(cli).await?;
    let auth = Authenticator::from_cache(client, TokenStore::new(cli.token_cache_path())).await?;
    warn_missing_scopes(auth.token());
    Ok(GmailSession::new(auth))
}

fn warn_missing_scopes(token: &Token) {
    let missing = token.missing_scopes(&[GMAIL_READONLY_SCOPE, GMAIL_MODIFY_SCOPE]);
    if !missing.is_empty() {
        warn!(?missing, "Token lacks Gmail scopes; messages cannot be read or marked read");
    }
}

async fn open_store(cli: &Cli) -> Result<ScanStore> {
    let mut config = DbConfig::from_env()?;
    if let Some(url) = &cli.database_url {
        config = config.with_url(url.clone());
    }

    let store = ScanStore::connect(&config)
        .await
        .with_context(|| format!("Failed to connect to {config}"))?;

    // Local SQLite files start empty
    if matches!(store, ScanStore::Sqlite(_)) {
        store.ensure_schema().await?;
    }
    Ok(store)
}
