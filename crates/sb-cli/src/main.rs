use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sb_cli::commands::{report, stacks};
use sb_cli::{Cli, Commands, Config};

/// Load config and build the event source client.
fn build_client(cli: &Cli) -> Result<(sb_source::Client, Config)> {
    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let client = sb_source::Client::new(&config.endpoint, &config.api_token)
        .context("failed to build event source client")?;
    Ok((client, config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Report {
            json,
            retention_days,
        }) => {
            let (client, config) = build_client(&cli)?;
            let retention = retention_days.or(config.retention_days);
            report::run(&client, config.concurrency, retention, *json).await?;
        }
        Some(Commands::Stacks { json }) => {
            let (client, _config) = build_client(&cli)?;
            stacks::run(&client, *json).await?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
