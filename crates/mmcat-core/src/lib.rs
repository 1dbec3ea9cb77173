//! mmcat Core Library
//!
//! AI-assisted categorization of MoneyMoney transactions:
//! - Automation bridge to MoneyMoney (AppleScript, plist export)
//! - Pluggable AI backends (OpenAI, DeepSeek, Anthropic)
//! - Prompt library for the categorization request
//! - Layered TOML configuration
//! - Export -> classify -> write pipeline

pub mod ai;
pub mod bridge;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod prompts;

/// Test utilities including a mock AI provider server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, AnthropicBackend, MockBackend, OpenAICompatibleBackend};
pub use bridge::{AppleScriptBridge, ExportPayload, FinanceBridge};
pub use config::{Config, ConfigOverrides, ConfigSource, Provider};
pub use error::{Error, Result};
pub use models::{
    CategoryAssignment, CategoryMap, CategorySet, ClassificationItem, Transaction, TransactionId,
    FALLBACK_CATEGORY,
};
pub use pipeline::{
    ClassifyOutcome, ExportOutcome, NoopObserver, Pipeline, PipelineObserver, RunSummary,
    WriteReport, WriteResult,
};
pub use prompts::{Prompt, PromptId, PromptLibrary, RenderedPrompt};
