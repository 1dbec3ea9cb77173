//! JSON parsing helpers for AI backend responses
//!
//! Models sometimes wrap the JSON object in a code fence or a sentence even
//! when told not to, so the outermost `{ ... }` is extracted before parsing.
//! Anything that does not then match the agreed shape fails the whole batch.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::CategoryAssignment;

/// Reply shape the prompt asks for
#[derive(Debug, Deserialize)]
struct CategorizedResponse {
    categorized_transactions: Vec<CategoryAssignment>,
}

/// Parse a categorization reply into assignments
pub fn parse_categorized(response: &str) -> Result<Vec<CategoryAssignment>> {
    let json_str = extract_json_object(response)?;

    let parsed: CategorizedResponse = serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid categorization JSON from AI: {} | Raw: {}",
            e,
            truncate(json_str, 200)
        ))
    })?;

    Ok(parsed.categorized_transactions)
}

/// Slice out the outermost JSON object in a response
fn extract_json_object(response: &str) -> Result<&str> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(&response[s..=e]),
        _ => Err(Error::InvalidData(format!(
            "No JSON found in AI response | Raw: {}",
            truncate(response, 200)
        ))),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &s[..cut])
}
