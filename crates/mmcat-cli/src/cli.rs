//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mmcat_core::config::ConfigOverrides;

/// mmcat - Categorize MoneyMoney transactions with an AI provider
#[derive(Parser)]
#[command(name = "mmcat")]
#[command(about = "AI-assisted transaction categorization for MoneyMoney", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.config/mmcat/config.toml, then built-in defaults)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// AI provider: openai, anthropic, deepseek
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// MoneyMoney category UUID to export from
    #[arg(long, global = true)]
    pub category_id: Option<String>,

    /// Lookback window in days
    #[arg(long, global = true)]
    pub days: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `run`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Command-line values that override the config file
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            provider: self.provider.clone(),
            category_id: self.category_id.clone(),
            days: self.days,
        }
    }
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Export, categorize and update transactions
    Run {
        /// Classify but do not write categories back
        #[arg(long)]
        dry_run: bool,
    },

    /// Export transactions and print the report only
    Export,

    /// Classify sample descriptions with the configured provider
    Test {
        /// Descriptions in "name - purpose" form (built-in samples if omitted)
        descriptions: Vec<String>,
    },

    /// Show the effective configuration
    Config,

    /// Show the categorization prompt and where to override it
    Prompts {
        /// Print only the override directory
        #[arg(long)]
        path: bool,
    },
}
