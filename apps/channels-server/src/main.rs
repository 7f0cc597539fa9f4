mod config;
mod logging;
mod signals;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use channels_http::apply_contract_layers;
use service_channels::ServiceChannels;

use crate::config::AppConfig;

/// Service Channels Server - channel catalogues, ingestion and orchestration
#[derive(Parser)]
#[command(name = "channels-server")]
#[command(about = "Service Channels Server - channel catalogues, ingestion and orchestration")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.to_string_lossy());
    }

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (CHANNELS__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.port);

    if cli.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    logging::init_logging(&config.logging, cli.verbose);
    tracing::info!("Service Channels Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.validate()?;
    println!("Configuration is valid");
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    config.validate()?;

    let rules = Arc::new(config.traceability_rules());
    let layers = config.contract_layers();
    let addr = config.listen_addr();

    let module = ServiceChannels::init(config.service_channels).await?;
    let app = apply_contract_layers(module.router(rules), &layers);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(
        addr = %addr,
        prefix = module.config().normalized_prefix(),
        "HTTP server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(signals::shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Service Channels Server stopped");
    Ok(())
}
