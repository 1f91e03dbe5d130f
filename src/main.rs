//! Community Wallet CLI
//!
//! Runs the wallet HTTP service or one-off maintenance commands against the site
//! document in `--data-dir`.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- serve
//! cargo run -- --data-dir /srv/wallet serve --port 8080 --sweep-interval-secs 60
//! cargo run -- balances > balances.csv
//! cargo run -- sweep --presence-ttl-secs 900
//! ```
//!
//! Settings may also come from the environment or a `.env` file
//! (`WALLET_DATA_DIR`, `WALLET_HOST`, `PORT`, `RUST_LOG`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (address in use, data directory not writable, etc.)

use anyhow::{Context, Result};
use chrono::Utc;
use community_wallet::api::{self, AppState};
use community_wallet::cli::{self, Command, ServeArgs, SweepArgs};
use community_wallet::core::{DocumentStore, Janitor, WalletLedger};
use community_wallet::io::{write_wallets_csv, FileBackend};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "community_wallet=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so that report output on stdout stays clean
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = cli::parse_args();
    let store = Arc::new(DocumentStore::new(FileBackend::new(&args.data_dir)));
    info!(data_dir = %args.data_dir.display(), "using document store");

    match args.command {
        Command::Serve(serve_args) => serve(store, serve_args).await,
        Command::Balances => balances(store),
        Command::Sweep(sweep_args) => sweep(store, sweep_args),
    }
}

async fn serve(store: Arc<DocumentStore>, args: ServeArgs) -> Result<()> {
    let janitor = Janitor::new(Arc::clone(&store), args.to_janitor_config());
    let cancel = CancellationToken::new();
    let janitor_handle = tokio::spawn(janitor.run(cancel.clone()));

    let app = api::router(AppState::new(store, args.session_ttl()));

    let addr = args.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Community wallet listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    cancel.cancel();
    janitor_handle.await.context("janitor task failed")?;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

fn balances(store: Arc<DocumentStore>) -> Result<()> {
    let wallets = WalletLedger::new(store).wallets();
    let mut output = std::io::stdout();
    write_wallets_csv(&wallets, &mut output).map_err(|e| anyhow::anyhow!("Error: {}", e))
}

fn sweep(store: Arc<DocumentStore>, args: SweepArgs) -> Result<()> {
    let janitor = Janitor::new(store, args.to_janitor_config());
    let report = janitor.sweep(Utc::now())?;
    info!(
        presence_removed = report.presence_removed,
        sessions_removed = report.sessions_removed,
        "sweep completed"
    );
    Ok(())
}
