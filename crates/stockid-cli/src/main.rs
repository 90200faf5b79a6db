#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod logging;
mod records;

use anyhow::Context;
use clap::Parser;
use config::Cli;
use logging::init_logging;
use stockid_tonic_core::{AllocatorClient, ClientConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let cli = match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            // Parse again so values from the file are picked up.
            Cli::parse()
        }
        None => cli,
    };

    init_logging(cli.log_format);

    let output = if cli.command.needs_allocator() {
        let client = connect(&cli).await?;
        commands::execute(&cli.command, &client).await?
    } else {
        commands::execute_offline(&cli.command)?
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Configures the allocator client. Nothing runs without one: every record
/// needs an identifier, so a failure here ends the process.
async fn connect(cli: &Cli) -> anyhow::Result<AllocatorClient> {
    let config = ClientConfig::try_from(cli)?;
    let endpoint = config.endpoint_uri();

    let (client, stats) = AllocatorClient::configure(config)
        .await
        .with_context(|| format!("failed to configure the identifier allocator at {endpoint}"))?;

    tracing::info!(
        endpoint = %endpoint,
        datacenter = stats.datacenter,
        worker = stats.worker,
        sequence = stats.sequence,
        sequence_overload = stats.sequence_overload,
        errors = stats.errors,
        "Identifier allocator ready"
    );
    Ok(client)
}
