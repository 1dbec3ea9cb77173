//! Pluggable AI backend abstraction
//!
//! This module provides a provider-agnostic interface for the one AI
//! operation mmcat needs: send a system prompt plus a JSON payload, get text
//! back, and parse it into category assignments.
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all backends
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend` (OpenAI, DeepSeek),
//!   `AnthropicBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = Config::load(&ConfigOverrides::default())?;
//! let client = AIClient::from_config(&config, &config.api_key()?)?;
//! let assignments = client.categorize(&system_prompt, &payload).await?;
//! ```

mod anthropic;
mod mock;
mod openai_compatible;
pub mod parsing;

pub use anthropic::{AnthropicBackend, ContentBlock, Message, MessagesResponse};
pub use mock::{categorize_detail, keyword_reply, MockBackend, MockCall, MockReply};
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::{Config, Provider};
use crate::error::Result;
use crate::models::CategoryAssignment;

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Send one system + user exchange and return the reply text
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Categorize a batch: `payload` is the JSON array of `{id, detail}` items
    ///
    /// Any transport, status or shape problem fails the whole batch.
    async fn categorize(&self, system: &str, payload: &str) -> Result<Vec<CategoryAssignment>> {
        let response = self.complete(system, payload).await?;
        debug!(provider = %self.provider(), "AI response: {}", response);
        parsing::parse_categorized(&response)
    }

    /// Check if the backend is reachable and accepts our credentials
    async fn health_check(&self) -> bool;

    /// Provider name (for logging)
    fn provider(&self) -> &str;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Debug, Clone)]
pub enum AIClient {
    /// OpenAI chat completions API (OpenAI itself, DeepSeek)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Anthropic Messages API
    Anthropic(AnthropicBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create the client for the configured provider
    pub fn from_config(config: &Config, api_key: &str) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(match config.provider {
            Provider::OpenAI | Provider::DeepSeek => AIClient::OpenAICompatible(
                OpenAICompatibleBackend::with_api_key(&config.base_url, &config.model, api_key)
                    .with_provider_name(config.provider.as_str())
                    .with_http_client(http_client),
            ),
            Provider::Anthropic => AIClient::Anthropic(
                AnthropicBackend::new(&config.base_url, &config.model, api_key)
                    .with_max_tokens(config.max_tokens)
                    .with_http_client(http_client),
            ),
        })
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self {
            AIClient::OpenAICompatible(b) => b.complete(system, user).await,
            AIClient::Anthropic(b) => b.complete(system, user).await,
            AIClient::Mock(b) => b.complete(system, user).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Anthropic(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn provider(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.provider(),
            AIClient::Anthropic(b) => b.provider(),
            AIClient::Mock(b) => b.provider(),
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Anthropic(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Anthropic(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
