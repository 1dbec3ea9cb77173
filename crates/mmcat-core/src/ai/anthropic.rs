//! Anthropic Messages API backend
//!
//! Sends `POST {base_url}/v1/messages` with the system prompt in the
//! top-level `system` field and the transaction payload as the single user
//! message. The reply's text blocks are concatenated.
//!
//! # Configuration
//!
//! - `ANTHROPIC_API_KEY`: API key (required when provider = "anthropic")
//! - `[hosts] anthropic` / `[models] anthropic` in the config file

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::AIBackend;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API request
#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

/// Message in conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String, // "user", "assistant"
    pub content: String,
}

impl Message {
    /// Create a user message with text content
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: text.into(),
        }
    }
}

/// Content block types
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    /// Any block type mmcat does not use (tool_use, thinking, ...)
    #[serde(other)]
    Other,
}

/// Anthropic Messages API response
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>, // "end_turn", "max_tokens", ...
}

impl MessagesResponse {
    /// Extract text content from the response
    pub fn text(&self) -> Option<String> {
        let texts: Vec<_> = self
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        }
    }
}

/// Anthropic backend
#[derive(Clone)]
pub struct AnthropicBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
}

impl std::fmt::Debug for AnthropicBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicBackend")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl AnthropicBackend {
    /// Create a new Anthropic backend
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            max_tokens: 4096,
        }
    }

    /// Set the output token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Use a preconfigured HTTP client (e.g. one with a timeout)
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Send a messages request
    pub async fn messages(
        &self,
        system: Option<&str>,
        messages: Vec<Message>,
    ) -> Result<MessagesResponse> {
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages,
            system: system.map(String::from),
        };

        debug!(model = %self.model, "Sending Anthropic messages request");

        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend {
                provider: "anthropic".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        debug!(stop_reason = ?parsed.stop_reason, "Anthropic response received");
        Ok(parsed)
    }
}

#[async_trait]
impl AIBackend for AnthropicBackend {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let response = self
            .messages(Some(system), vec![Message::user(user)])
            .await?;

        if response.stop_reason.as_deref() == Some("max_tokens") {
            return Err(Error::InvalidData(format!(
                "Anthropic reply truncated at max_tokens = {}",
                self.max_tokens
            )));
        }

        response
            .text()
            .ok_or_else(|| Error::InvalidData("No text content from Anthropic API".into()))
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!("{}/v1/models", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn provider(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructor() {
        let user = Message::user("Hello");
        assert_eq!(user.role, "user");
        assert_eq!(user.content, "Hello");
    }

    #[test]
    fn test_request_serialization() {
        let request = MessagesRequest {
            model: "claude-3-sonnet-20240229".into(),
            max_tokens: 4096,
            messages: vec![Message::user("[]")],
            system: Some("Categorize".into()),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "claude-3-sonnet-20240229");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["system"], "Categorize");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "[]");
    }

    #[test]
    fn test_request_without_system() {
        let request = MessagesRequest {
            model: "m".into(),
            max_tokens: 10,
            messages: vec![],
            system: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("system").is_none());
    }

    #[test]
    fn test_response_text() {
        let json = r#"{
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "{\"categorized_transactions\":"},
                {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
                {"type": "text", "text": "[]}"}
            ],
            "model": "claude-3-sonnet-20240229",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;

        let response: MessagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.content.len(), 3);
        assert_eq!(
            response.text().as_deref(),
            Some("{\"categorized_transactions\":\n[]}")
        );
    }

    #[test]
    fn test_response_without_text() {
        let json = r#"{"content": [], "stop_reason": "end_turn"}"#;
        let response: MessagesResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_backend_accessors() {
        let backend = AnthropicBackend::new("https://api.anthropic.com/", "claude", "k")
            .with_max_tokens(1024);
        assert_eq!(backend.host(), "https://api.anthropic.com");
        assert_eq!(backend.model(), "claude");
        assert_eq!(backend.provider(), "anthropic");
        assert_eq!(backend.max_tokens(), 1024);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let backend = AnthropicBackend::new("https://api.anthropic.com", "claude", "sk-ant-secret");
        let debug = format!("{:?}", backend);
        assert!(debug.contains("claude"));
        assert!(!debug.contains("sk-ant-secret"));
    }
}
