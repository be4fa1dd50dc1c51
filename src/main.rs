mod api;
mod config;
mod error;
mod export;
mod models;
mod patch;
mod scrape;
mod storage;

use anyhow::Context;
use api::client::OpggClient;
use clap::Parser;
use config::{Config, PersistencePolicy};
use scrape::Orchestrator;
use std::path::PathBuf;
use std::sync::Arc;
use storage::{SqliteStatsRepository, StatsRepository};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "Matchup Scraper")]
#[command(about = "Periodically scrape op.gg champion matchups into a stats database", long_about = None)]
struct Args {
    /// Path to the stats database (overrides STATS_DB_PATH)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Persistence policy (default: streaming)
    #[arg(short, long, value_enum)]
    policy: Option<PersistencePolicy>,

    /// Also write each tier's saved records as JSON into this directory
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Run a single scrape cycle and exit instead of repeating every interval
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matchup_scraper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    // Load configuration
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(database) = args.database {
        config.database_path = database;
    }
    if let Some(policy) = args.policy {
        config.policy = policy;
    }
    if let Some(dir) = args.export_dir {
        config.export_dir = Some(dir);
    }

    info!(policy = %config.policy, tiers = config.tiers.len(), "starting op.gg matchup scraper");

    // A store we can't reach is fatal before any scraping starts
    let repository = Arc::new(
        SqliteStatsRepository::connect(&config.database_path)
            .context("Failed to connect to database")?,
    );

    let token = CancellationToken::new();
    spawn_shutdown_listener(token.clone());

    let client = Arc::new(OpggClient::new(config.requests_per_second));
    let orchestrator = Orchestrator::new(config, client.clone(), client, repository.clone());

    if args.once {
        let outcome = orchestrator.run_cycle(&token).await;
        info!(?outcome, "single scrape cycle finished");
    } else {
        orchestrator.run(token).await;
    }

    repository.disconnect().await;
    info!("exiting");
    Ok(())
}

fn spawn_shutdown_listener(token: CancellationToken) {
    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(()) => {
                info!("shutdown signal received, finishing current step");
                token.cancel();
            }
            Err(e) => error!(error = %e, "failed to listen for shutdown signals"),
        }
    });
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
