//! Stage 1: export transactions from MoneyMoney

use chrono::{Days, NaiveDate};
use tracing::{error, info};

use crate::bridge::{ExportPayload, FinanceBridge};
use crate::error::Error;
use crate::models::Transaction;

/// Result of the export stage
#[derive(Debug)]
pub enum ExportOutcome {
    /// Export parsed; the list may be empty
    Exported(Vec<Transaction>),
    /// The command succeeded but returned nothing (filter matched nothing)
    NoData,
    /// The command failed or its output could not be parsed
    Failed(Error),
}

impl ExportOutcome {
    /// Transactions to hand to the next stage (none unless exported)
    pub fn transactions(&self) -> &[Transaction] {
        match self {
            Self::Exported(txs) => txs,
            Self::NoData | Self::Failed(_) => &[],
        }
    }
}

/// First day of the lookback window: `today - days`
pub fn start_date(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Export the transactions of `category_id` booked within the last `days` days
pub async fn export_transactions(
    bridge: &dyn FinanceBridge,
    category_id: &str,
    days: u32,
    today: NaiveDate,
) -> ExportOutcome {
    let from = start_date(today, days);
    info!(category = %category_id, from = %from, "Exporting transactions");

    match bridge.export_transactions(category_id, from).await {
        Ok(ExportPayload::Transactions(txs)) => {
            info!(count = txs.len(), "Export parsed");
            ExportOutcome::Exported(txs)
        }
        Ok(ExportPayload::NoData) => {
            info!("Export returned no data");
            ExportOutcome::NoData
        }
        Err(e) => {
            error!(error = %e, "Export failed");
            ExportOutcome::Failed(e)
        }
    }
}
