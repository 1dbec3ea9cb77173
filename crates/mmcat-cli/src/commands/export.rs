//! Export-only command

use std::path::Path;

use anyhow::Result;
use chrono::Local;
use mmcat_core::bridge::AppleScriptBridge;
use mmcat_core::config::ConfigOverrides;
use mmcat_core::pipeline::{export_transactions, start_date, ExportOutcome};

use super::{load_config, print_export_report};

/// Export the configured category and print the report, without classifying
pub async fn cmd_export(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<()> {
    let config = load_config(config_path, overrides)?;
    let today = Local::now().date_naive();

    println!(
        "👉 Exporting transactions from category '{}' for the last {} days (since {})...",
        config.category_id,
        config.days,
        start_date(today, config.days)
    );

    let bridge = AppleScriptBridge::new();
    match export_transactions(&bridge, &config.category_id, config.days, today).await {
        ExportOutcome::Exported(txs) => {
            print_export_report(&txs);
            let booked = txs.iter().filter(|tx| tx.booked).count();
            println!("{} booked, {} pending", booked, txs.len() - booked);
        }
        ExportOutcome::NoData => {
            println!("❌ Export returned no data. Check if there are transactions in this category within the date range.");
        }
        ExportOutcome::Failed(e) => {
            println!("❌ Failed to export transactions: {}", e);
        }
    }

    Ok(())
}
