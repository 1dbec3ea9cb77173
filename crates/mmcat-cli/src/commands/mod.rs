//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `run` - The export → categorize → update pipeline and its console output
//! - `export` - Export report only
//! - `check` - Provider check with sample descriptions (`mmcat test`)
//! - `config` - Effective configuration
//! - `prompts` - Prompt inspection

pub mod check;
pub mod config;
pub mod export;
pub mod prompts;
pub mod run;

// Re-export command functions for main.rs
pub use check::*;
pub use config::*;
pub use export::*;
pub use prompts::*;
pub use run::*;

use std::path::Path;

use anyhow::{Context, Result};
use mmcat_core::ai::AIClient;
use mmcat_core::config::{Config, ConfigOverrides};
use mmcat_core::models::Transaction;
use mmcat_core::prompts::{Prompt, PromptId, PromptLibrary};

/// Load the effective configuration
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config> {
    Config::load_from(path, overrides).context("Failed to load configuration")
}

/// Load config, credential and AI client before any external call is made
///
/// `lookup` resolves environment variables; every error here is fatal.
pub fn preflight<F>(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
    lookup: F,
) -> Result<(Config, AIClient)>
where
    F: Fn(&str) -> Option<String>,
{
    let config = load_config(path, overrides)?;
    let api_key = config.api_key_with(lookup)?;
    let client = AIClient::from_config(&config, &api_key).context("Failed to create AI client")?;
    Ok((config, client))
}

/// Environment lookup used outside of tests
pub fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// The categorization prompt (override or embedded)
pub fn load_prompt() -> Result<Prompt> {
    PromptLibrary::new()
        .get(PromptId::CategorizeTransactions)
        .context("Failed to load categorization prompt")
}

/// One export report line: `- YYYY-MM-DD: name (amount currency)`
pub fn format_transaction_line(tx: &Transaction) -> String {
    let date = tx
        .booking_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "????-??-??".to_string());
    format!("- {}: {} ({:.2} {})", date, tx.name, tx.amount, tx.currency)
}

/// Print the export report block
pub fn print_export_report(transactions: &[Transaction]) {
    println!(
        "\n--- 📋 Export Report: Found {} total transactions to categorize ---",
        transactions.len()
    );
    for tx in transactions {
        println!("{}", format_transaction_line(tx));
    }
    println!("----------------------------------------------------");
}
