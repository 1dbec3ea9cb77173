//! Mock backend for testing
//!
//! Answers categorization requests without a network call. By default it
//! reads the `{id, detail}` payload and picks a category from keywords in the
//! detail text; it can also be told to return a fixed reply or to fail.
//! Every request is recorded so tests can check what was sent.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::FALLBACK_CATEGORY;

use super::AIBackend;

/// What the mock answers with
#[derive(Debug, Clone, Default)]
pub enum MockReply {
    /// Keyword-based categorization of the request payload
    #[default]
    Keyword,
    /// This exact text
    Raw(String),
    /// A backend error
    Fail(String),
}

/// A request received by the mock
#[derive(Debug, Clone)]
pub struct MockCall {
    pub system: String,
    pub user: String,
}

/// Mock AI backend for testing
#[derive(Debug, Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    reply: MockReply,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockBackend {
    /// Create a new mock backend (healthy, keyword replies)
    pub fn new() -> Self {
        Self::with_reply(MockReply::Keyword)
    }

    /// Create a mock with a specific reply mode
    pub fn with_reply(reply: MockReply) -> Self {
        Self {
            healthy: true,
            reply,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that always answers with `text`
    pub fn replying(text: &str) -> Self {
        Self::with_reply(MockReply::Raw(text.to_string()))
    }

    /// Create a mock whose calls always fail
    pub fn failing(message: &str) -> Self {
        Self::with_reply(MockReply::Fail(message.to_string()))
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Requests received so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct RequestItem {
    id: serde_json::Value,
    detail: String,
}

/// Keyword categorization shared with the mock HTTP provider
pub fn categorize_detail(detail: &str) -> &'static str {
    let d = detail.to_lowercase();
    match d.as_str() {
        d if d.contains("grocery") || d.contains("supermarket") || d.contains("amazon") => {
            "Shopping"
        }
        d if d.contains("rent") || d.contains("landlord") || d.contains("mortgage") => {
            "Real Estate"
        }
        d if d.contains("vet") || d.contains("pet") => "Pets",
        d if d.contains("insurance") => "Insurance",
        d if d.contains("fuel") || d.contains("garage") || d.contains("shell") => "Auto",
        d if d.contains("electric") || d.contains("water") || d.contains("gas bill") => {
            "Utilities"
        }
        d if d.contains("netflix") || d.contains("cinema") || d.contains("spotify") => {
            "Leisure & Entertainment"
        }
        _ => FALLBACK_CATEGORY,
    }
}

/// Build a `categorized_transactions` reply for a JSON `{id, detail}` payload
pub fn keyword_reply(user: &str) -> Result<String> {
    let items: Vec<RequestItem> = serde_json::from_str(user)?;
    let results: Vec<serde_json::Value> = items
        .iter()
        .map(|item| {
            serde_json::json!({
                "id": item.id,
                "category": categorize_detail(&item.detail),
            })
        })
        .collect();
    Ok(serde_json::json!({ "categorized_transactions": results }).to_string())
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                system: system.to_string(),
                user: user.to_string(),
            });
        }

        match &self.reply {
            MockReply::Keyword => keyword_reply(user),
            MockReply::Raw(text) => Ok(text.clone()),
            MockReply::Fail(message) => Err(Error::Backend {
                provider: "mock".to_string(),
                status: 500,
                body: message.clone(),
            }),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
