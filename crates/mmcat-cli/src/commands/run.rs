//! The categorization run and its console output

use std::path::Path;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use mmcat_core::ai::AIBackend;
use mmcat_core::bridge::{AppleScriptBridge, FinanceBridge};
use mmcat_core::config::{Config, ConfigOverrides};
use mmcat_core::models::CategoryMap;
use mmcat_core::pipeline::{
    ClassifyOutcome, ExportOutcome, Pipeline, PipelineObserver, RunSummary, WriteResult,
};
use mmcat_core::prompts::Prompt;

use super::{env_lookup, load_prompt, preflight, print_export_report};

/// Prints step banners and per-item results as the pipeline runs
pub struct ConsoleReporter {
    provider: String,
    write_failures: usize,
}

impl ConsoleReporter {
    pub fn new(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            write_failures: 0,
        }
    }

    pub fn write_failures(&self) -> usize {
        self.write_failures
    }
}

impl PipelineObserver for ConsoleReporter {
    fn on_export_start(&mut self, category_id: &str, days: u32, from: NaiveDate) {
        println!(
            "👉 Step 1: Exporting transactions from category '{}' for the last {} days (since {})...",
            category_id, days, from
        );
    }

    fn on_export(&mut self, outcome: &ExportOutcome) {
        match outcome {
            ExportOutcome::Exported(txs) => {
                println!("✅ Transactions successfully exported and captured.");
                print_export_report(txs);
            }
            ExportOutcome::NoData => {
                println!("❌ ERROR: Export returned no data. Check if there are transactions in this category within the date range.");
            }
            ExportOutcome::Failed(e) => {
                println!("❌ ERROR: Failed to export transactions. Error: {}", e);
            }
        }
    }

    fn on_classify_start(&mut self, exported: usize, booked: usize) {
        println!("\n👉 Step 2: Processing all exported transactions...");
        if booked > 0 {
            println!(
                "Sending {} booked of {} exported transactions to {} for categorization...",
                booked, exported, self.provider
            );
        }
    }

    fn on_classify(&mut self, outcome: &ClassifyOutcome) {
        match outcome {
            ClassifyOutcome::Skipped => println!("No booked transactions found to process."),
            ClassifyOutcome::Classified(c) => {
                println!(
                    "✅ AI successfully categorized {} transactions.",
                    c.assignments.len()
                );
                for (id, label) in &c.coerced {
                    println!(
                        "  ⚠️  Transaction {}: '{}' is not an allowed category, using fallback",
                        id, label
                    );
                }
                if !c.unknown_ids.is_empty() {
                    println!(
                        "  ⚠️  Ignored {} result(s) for transactions that were not sent",
                        c.unknown_ids.len()
                    );
                }
            }
            ClassifyOutcome::Failed(e) => {
                println!("❌ ERROR: Could not get AI categories for batch. Error: {}", e);
            }
        }
    }

    fn on_write_start(&mut self, count: usize) {
        println!("\n👉 Step 3: Updating {} transactions in MoneyMoney...", count);
        if count == 0 {
            println!("No transactions needed updating.");
        }
    }

    fn on_write(&mut self, result: &WriteResult) {
        match &result.error {
            None => println!("  ✅ {} → {}", result.id, result.category),
            Some(e) => {
                self.write_failures += 1;
                println!(
                    "  ❌ ERROR: Failed to update transaction ID {}. Error: {}",
                    result.id, e
                );
            }
        }
    }

    fn on_dry_run(&mut self, assignments: &CategoryMap) {
        println!("\n👉 Step 3: Dry run, MoneyMoney is not updated.");
        if assignments.is_empty() {
            println!("No transactions needed updating.");
            return;
        }
        println!("Planned updates:");
        for (id, category) in assignments {
            println!("  {} → {}", id, category);
        }
    }
}

/// Print the closing summary block
pub fn print_summary(summary: &RunSummary) {
    println!("\n--- 📊 Final Summary ---");
    println!("{}", summary);
    println!("-------------------------");
    println!("All done! 🎉");
}

/// Run the pipeline with console output and print the summary
pub async fn run_pipeline(
    config: &Config,
    bridge: &dyn FinanceBridge,
    ai: &dyn AIBackend,
    prompt: &Prompt,
    dry_run: bool,
    today: NaiveDate,
) -> RunSummary {
    let mut reporter = ConsoleReporter::new(config.provider.as_str());

    let summary = Pipeline::new(config, bridge, ai, prompt)
        .dry_run(dry_run)
        .run(today, &mut reporter)
        .await;

    if !dry_run && summary.updated > 0 && reporter.write_failures() == 0 {
        println!("✅ All targeted transactions updated successfully!");
    }
    print_summary(&summary);
    summary
}

/// Export, categorize and update transactions
///
/// Configuration and credential problems are returned as errors (non-zero
/// exit). Everything after that is reported and ends normally.
pub async fn cmd_run(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
    dry_run: bool,
) -> Result<()> {
    let (config, client) = preflight(config_path, overrides, env_lookup)?;
    let prompt = load_prompt()?;
    let bridge = AppleScriptBridge::new();

    tracing::debug!(
        source = %config.source,
        provider = %client.provider(),
        model = %client.model(),
        "Starting run"
    );

    run_pipeline(
        &config,
        &bridge,
        &client,
        &prompt,
        dry_run,
        Local::now().date_naive(),
    )
    .await;

    Ok(())
}
