//! Memoria - multimodal assistant and retrieval gateways
//!
#![doc = "Memoria - multimodal assistant and retrieval gateways"]
#![doc = "Main entry point for the memoria binary."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use memoria::cli::{Cli, Commands};
use memoria::commands;
use memoria::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration before logging so `logging.json` can pick the format
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    init_tracing(cli.verbose, config.logging.json);

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Assistant { .. } => {
            tracing::info!("Starting assistant gateway");
            commands::assistant::run_assistant(config).await?;
            Ok(())
        }
        Commands::Retrieval { .. } => {
            tracing::info!("Starting retrieval gateway");
            commands::retrieval::run_retrieval(config).await?;
            Ok(())
        }
        Commands::Route { query, json } => {
            commands::route::run_route(&query, json)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins over the defaults; `--verbose` raises the default to debug.
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "memoria=debug" } else { "memoria=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
