//! Export -> classify -> write pipeline
//!
//! The three stages run strictly in order and every external call is awaited
//! before the next one is issued. Stage failures never cross a stage
//! boundary: they are logged, reported to the observer and turn into "nothing
//! to do" for the stages downstream.

pub mod classify;
pub mod export;
pub mod write;

pub use classify::{
    booked_items, categorize_items, classify_transactions, Classification, ClassifyOutcome,
};
pub use export::{export_transactions, start_date, ExportOutcome};
pub use write::{write_categories, WriteReport, WriteResult};

use std::fmt;

use chrono::NaiveDate;
use tracing::info;

use crate::ai::AIBackend;
use crate::bridge::FinanceBridge;
use crate::config::Config;
use crate::models::CategoryMap;
use crate::prompts::Prompt;

/// Progress callbacks for a pipeline run
///
/// Every method has a no-op default so callers only implement what they show.
pub trait PipelineObserver {
    fn on_export_start(&mut self, _category_id: &str, _days: u32, _from: NaiveDate) {}

    fn on_export(&mut self, _outcome: &ExportOutcome) {}

    /// Called before the AI request; `booked` of `exported` will be sent
    fn on_classify_start(&mut self, _exported: usize, _booked: usize) {}

    fn on_classify(&mut self, _outcome: &ClassifyOutcome) {}

    fn on_write_start(&mut self, _count: usize) {}

    fn on_write(&mut self, _result: &WriteResult) {}

    /// Called instead of the write stage when writes are disabled
    fn on_dry_run(&mut self, _assignments: &CategoryMap) {}
}

/// Observer that ignores everything
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Counts for the final summary
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub exported: usize,
    /// Booked transactions sent to the AI backend
    pub submitted: usize,
    pub classified: usize,
    /// Assignments coerced to the fallback category
    pub coerced: usize,
    pub updated: usize,
    pub failed: usize,
    pub dry_run: bool,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Transactions Exported: {}", self.exported)?;
        if self.dry_run {
            write!(f, "Total Transactions Updated: 0 (dry run, {} planned)", self.classified)?;
        } else {
            write!(f, "Total Transactions Updated: {}", self.updated)?;
        }
        if self.failed > 0 {
            write!(f, "\nTotal Updates Failed: {}", self.failed)?;
        }
        Ok(())
    }
}

/// One configured run over a bridge and an AI backend
pub struct Pipeline<'a> {
    config: &'a Config,
    bridge: &'a dyn FinanceBridge,
    ai: &'a dyn AIBackend,
    prompt: &'a Prompt,
    dry_run: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a Config,
        bridge: &'a dyn FinanceBridge,
        ai: &'a dyn AIBackend,
        prompt: &'a Prompt,
    ) -> Self {
        Self {
            config,
            bridge,
            ai,
            prompt,
            dry_run: false,
        }
    }

    /// Classify but do not write anything back
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run all three stages with `today` as the end of the lookback window
    pub async fn run(&self, today: NaiveDate, observer: &mut dyn PipelineObserver) -> RunSummary {
        let mut summary = RunSummary {
            dry_run: self.dry_run,
            ..Default::default()
        };

        // Stage 1
        observer.on_export_start(
            &self.config.category_id,
            self.config.days,
            start_date(today, self.config.days),
        );
        let exported = export_transactions(
            self.bridge,
            &self.config.category_id,
            self.config.days,
            today,
        )
        .await;
        observer.on_export(&exported);

        let transactions = match &exported {
            ExportOutcome::Exported(txs) => txs,
            ExportOutcome::NoData | ExportOutcome::Failed(_) => {
                info!("Nothing exported, stopping");
                return summary;
            }
        };
        summary.exported = transactions.len();

        // Stage 2
        summary.submitted = transactions.iter().filter(|tx| tx.booked).count();
        observer.on_classify_start(summary.exported, summary.submitted);
        let classified = classify_transactions(
            self.ai,
            self.prompt,
            &self.config.categories,
            transactions,
        )
        .await;
        observer.on_classify(&classified);

        if let ClassifyOutcome::Classified(c) = &classified {
            summary.classified = c.assignments.len();
            summary.coerced = c.coerced.len();
        }

        // Stage 3
        let empty = CategoryMap::new();
        let assignments = classified.assignments().unwrap_or(&empty);

        if self.dry_run {
            info!(planned = assignments.len(), "Dry run, skipping updates");
            observer.on_dry_run(assignments);
            return summary;
        }

        observer.on_write_start(assignments.len());
        let report = write_categories(self.bridge, assignments, |r| observer.on_write(r)).await;
        summary.updated = report.updated();
        summary.failed = report.failed();

        info!(
            exported = summary.exported,
            updated = summary.updated,
            failed = summary.failed,
            "Run complete"
        );
        summary
    }
}
