// src/main.rs

//! Zastępstwa CLI
//!
//! Local execution entry point for the substitution notifier.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use zastepstwa::{
    config::ConfigService,
    error::{AppError, Result},
    models::Config,
    pipeline::Orchestrator,
    services::{DiscordNotifier, PageFetcher, SubstitutionExtractor},
    storage::{LocalRunStateStore, RunStateStore},
    utils::ChannelGates,
};

/// Zastępstwa - School Substitution Notifier
#[derive(Parser, Debug)]
#[command(
    name = "zastepstwa",
    version,
    about = "Notifies Discord servers about school schedule substitutions"
)]
struct Cli {
    /// Path to data directory containing config and run state
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll school pages and notify subscribed servers
    Run,

    /// Validate the configuration file
    Validate,

    /// Show configuration and run-state summary
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.data_dir.join("config.toml");

    match cli.command {
        Command::Run => run(&cli.data_dir, &config_path).await,

        Command::Validate => {
            log::info!("Validating configuration...");
            let config = Config::load(&config_path)?;
            config.validate()?;
            log::info!(
                "✓ Config OK ({} schools, {} servers)",
                config.schools.len(),
                config.servers.len()
            );
            Ok(())
        }

        Command::Info => info(&cli.data_dir, &config_path).await,
    }
}

/// Wire up the collaborators and poll until interrupted.
async fn run(data_dir: &Path, config_path: &Path) -> Result<()> {
    let token = std::env::var("DISCORD_TOKEN")
        .map_err(|_| AppError::config("DISCORD_TOKEN environment variable is not set"))?;

    let config = Arc::new(ConfigService::load(config_path));
    config.snapshot().await.validate()?;

    let snapshot = config.snapshot().await;
    let fetcher = Arc::new(PageFetcher::new(&snapshot.bot)?);
    let notifier = Arc::new(DiscordNotifier::new(
        token,
        &snapshot.bot,
        Arc::new(ChannelGates::new()),
    )?);
    let store = Arc::new(LocalRunStateStore::new(data_dir.join("state")));
    let extractor = Arc::new(SubstitutionExtractor::new());

    let orchestrator = Orchestrator::new(config, fetcher, extractor, store, notifier);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received, shutting down...");
            let _ = shutdown_tx.send(true);
        }
    });

    log::info!(
        "Zastępstwa starting, polling every {} s",
        snapshot.bot.poll_interval_secs
    );
    orchestrator.run(shutdown_rx).await;

    log::info!("Stopped");
    Ok(())
}

/// Print a summary of the configuration and stored run state.
async fn info(data_dir: &Path, config_path: &Path) -> Result<()> {
    log::info!("Data directory: {}", data_dir.display());
    log::info!(
        "Report generated at {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let config = Config::load_or_default(config_path);
    log::info!(
        "{} schools configured, {} servers registered",
        config.schools.len(),
        config.servers.len()
    );

    let store = LocalRunStateStore::new(data_dir.join("state"));
    for (server_id, server) in &config.servers {
        let state = store.load(server_id).await?;
        log::info!(
            "Server {}: school={:?} channel={:?} substitutions={} teachers tracked={}",
            server_id,
            server.school_id,
            server.channel_id,
            state.substitution_count,
            state.teacher_stats.len()
        );
    }

    Ok(())
}
