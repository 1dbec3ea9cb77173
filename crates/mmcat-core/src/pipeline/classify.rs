//! Stage 2: classify booked transactions with the AI backend
//!
//! All booked transactions go out in a single request. Pending ones are
//! never sent and never updated in this run.

use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::ai::AIBackend;
use crate::error::{Error, Result};
use crate::models::{CategoryMap, CategorySet, ClassificationItem, Transaction, TransactionId};
use crate::prompts::Prompt;

/// Validated classification of one batch
#[derive(Debug, Default, Clone)]
pub struct Classification {
    /// id -> canonical category label, only for submitted ids
    pub assignments: CategoryMap,
    /// Assignments whose label was not in the category set: (id, label given)
    pub coerced: Vec<(TransactionId, String)>,
    /// Ids in the reply that were never submitted
    pub unknown_ids: Vec<TransactionId>,
}

/// Result of the classification stage
#[derive(Debug)]
pub enum ClassifyOutcome {
    /// No booked transactions, the backend was not called
    Skipped,
    Classified(Classification),
    /// The batch failed as a whole
    Failed(Error),
}

impl ClassifyOutcome {
    /// Assignments to write back (empty unless classified)
    pub fn assignments(&self) -> Option<&CategoryMap> {
        match self {
            Self::Classified(c) => Some(&c.assignments),
            Self::Skipped | Self::Failed(_) => None,
        }
    }
}

/// Request items for the booked transactions, in export order
pub fn booked_items(transactions: &[Transaction]) -> Vec<ClassificationItem> {
    transactions
        .iter()
        .filter(|tx| tx.booked)
        .map(ClassificationItem::from)
        .collect()
}

/// Send one batch and validate the reply against the submitted ids and the category set
///
/// Labels outside the set are coerced to the fallback; ids that were not
/// submitted are dropped; for repeated ids the first assignment wins.
pub async fn categorize_items(
    ai: &dyn AIBackend,
    prompt: &Prompt,
    categories: &CategorySet,
    items: &[ClassificationItem],
) -> Result<Classification> {
    let rendered = prompt.render_categorization(categories, items)?;
    debug!(system = %rendered.system, "Categorization system prompt");

    let replies = ai.categorize(&rendered.system, &rendered.user).await?;

    let submitted: HashSet<&TransactionId> = items.iter().map(|i| &i.id).collect();
    let mut classification = Classification::default();

    for reply in replies {
        if !submitted.contains(&reply.id) {
            warn!(id = %reply.id, "AI returned an id that was not submitted, ignoring");
            classification.unknown_ids.push(reply.id);
            continue;
        }
        if classification.assignments.contains_key(&reply.id) {
            warn!(id = %reply.id, "AI returned the same id twice, keeping the first");
            continue;
        }

        let category = match categories.resolve(&reply.category) {
            Some(label) => label.to_string(),
            None => {
                warn!(
                    id = %reply.id,
                    category = %reply.category,
                    fallback = %categories.fallback(),
                    "AI returned a category outside the allowed set, using fallback"
                );
                classification
                    .coerced
                    .push((reply.id.clone(), reply.category.clone()));
                categories.fallback().to_string()
            }
        };
        classification.assignments.insert(reply.id, category);
    }

    Ok(classification)
}

/// Classify the booked subset of `transactions`
pub async fn classify_transactions(
    ai: &dyn AIBackend,
    prompt: &Prompt,
    categories: &CategorySet,
    transactions: &[Transaction],
) -> ClassifyOutcome {
    let items = booked_items(transactions);
    if items.is_empty() {
        info!("No booked transactions to classify");
        return ClassifyOutcome::Skipped;
    }

    info!(
        provider = %ai.provider(),
        model = %ai.model(),
        count = items.len(),
        "Sending batch for categorization"
    );

    match categorize_items(ai, prompt, categories, &items).await {
        Ok(classification) => {
            info!(
                classified = classification.assignments.len(),
                coerced = classification.coerced.len(),
                "Categorization complete"
            );
            ClassifyOutcome::Classified(classification)
        }
        Err(e) => {
            error!(error = %e, "Categorization failed");
            ClassifyOutcome::Failed(e)
        }
    }
}
