//! Automation bridge to the finance application
//!
//! mmcat only needs two things from MoneyMoney: export the transactions of a
//! category since a date, and set the category of a single transaction.
//!
//! # Architecture
//!
//! - `FinanceBridge` trait: the two operations the pipeline depends on
//! - `AppleScriptBridge`: production implementation driving `osascript`
//! - `export`: parsing of MoneyMoney's property list export

mod applescript;
pub mod export;

pub use applescript::{escape_applescript, AppleScriptBridge};
pub use export::parse_export;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Transaction, TransactionId};

/// What a successful export produced
#[derive(Debug, Clone)]
pub enum ExportPayload {
    /// The command succeeded but printed nothing
    NoData,
    /// Parsed transactions (possibly an empty list)
    Transactions(Vec<Transaction>),
}

/// Read and write access to the finance application
///
/// Errors from either operation mean the automation call itself failed
/// (non-zero exit, unparsable payload, etc.).
#[async_trait]
pub trait FinanceBridge: Send + Sync {
    /// Export transactions of `category_id` booked on or after `from`
    async fn export_transactions(&self, category_id: &str, from: NaiveDate)
        -> Result<ExportPayload>;

    /// Set the category of one transaction by category name
    async fn set_category(&self, id: &TransactionId, category: &str) -> Result<()>;
}
