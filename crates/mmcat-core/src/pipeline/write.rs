//! Stage 3: write categories back to MoneyMoney

use tracing::{error, info};

use crate::bridge::FinanceBridge;
use crate::error::Error;
use crate::models::{CategoryMap, TransactionId};

/// Outcome of writing one assignment
#[derive(Debug)]
pub struct WriteResult {
    pub id: TransactionId,
    pub category: String,
    pub error: Option<Error>,
}

impl WriteResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-entry results of the write stage, in map order
#[derive(Debug, Default)]
pub struct WriteReport {
    pub results: Vec<WriteResult>,
}

impl WriteReport {
    pub fn updated(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.updated()
    }

    pub fn attempted(&self) -> usize {
        self.results.len()
    }
}

/// Apply every assignment, one bridge call each
///
/// A failed update is logged and recorded; it never stops the remaining ones.
/// `on_result` sees each result as soon as it is known.
pub async fn write_categories<F>(
    bridge: &dyn FinanceBridge,
    assignments: &CategoryMap,
    mut on_result: F,
) -> WriteReport
where
    F: FnMut(&WriteResult),
{
    let mut report = WriteReport::default();

    for (id, category) in assignments {
        let error = match bridge.set_category(id, category).await {
            Ok(()) => {
                info!(id = %id, category = %category, "Category updated");
                None
            }
            Err(e) => {
                error!(id = %id, category = %category, error = %e, "Category update failed");
                Some(e)
            }
        };

        let result = WriteResult {
            id: id.clone(),
            category: category.clone(),
            error,
        };
        on_result(&result);
        report.results.push(result);
    }

    report
}
