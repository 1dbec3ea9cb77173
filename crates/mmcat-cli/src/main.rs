//! mmcat CLI - AI-assisted categorization of MoneyMoney transactions
//!
//! Usage:
//!   mmcat                      Export, categorize and update (same as `run`)
//!   mmcat run --dry-run        Categorize without writing back
//!   mmcat export --days 30     Print the export report only
//!   mmcat test "Vet - checkup" Try the provider on sample descriptions

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let overrides = cli.overrides();
    let config_path = cli.config.as_deref();

    match cli.command.as_ref().unwrap_or(&Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => commands::cmd_run(config_path, &overrides, *dry_run).await,
        Commands::Export => commands::cmd_export(config_path, &overrides).await,
        Commands::Test { descriptions } => {
            commands::cmd_test(config_path, &overrides, descriptions).await
        }
        Commands::Config => commands::cmd_config(config_path, &overrides),
        Commands::Prompts { path } => commands::cmd_prompts(*path),
    }
}
