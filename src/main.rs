// src/main.rs

use anyhow::Result;
use clap::Parser;
use tracing::info;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Resolve {
            package,
            version,
            framework,
            baseline,
            decline_licenses,
        } => {
            commands::cmd_resolve(
                &config,
                &package,
                version.as_deref(),
                framework.as_deref(),
                &baseline,
                decline_licenses,
            )
            .await
        }
        Commands::Inspect { package, version } => {
            info!("Inspecting {} {}", package, version);
            commands::cmd_inspect(&config, &package, &version).await
        }
    }
}
