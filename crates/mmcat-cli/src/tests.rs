//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use clap::Parser;
use mmcat_core::ai::MockBackend;
use mmcat_core::bridge::{ExportPayload, FinanceBridge};
use mmcat_core::config::{Config, ConfigOverrides};
use mmcat_core::error::{Error, Result as CoreResult};
use mmcat_core::models::{CategorySet, Transaction, TransactionId};
use mmcat_core::prompts::{PromptId, PromptLibrary};
use mmcat_core::test_utils::MockProviderServer;
use mmcat_core::AIBackend;

use crate::cli::{Cli, Commands};
use crate::commands::{self, format_transaction_line};

fn tx(id: i64, name: &str, amount: f64, booked: bool) -> Transaction {
    Transaction {
        id: id.into(),
        booking_date: NaiveDate::from_ymd_opt(2026, 10, 2),
        name: name.to_string(),
        purpose: "purpose".to_string(),
        amount,
        currency: "EUR".to_string(),
        booked,
        category: None,
    }
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// Bridge that exports fixed transactions and records updates
struct StaticBridge {
    transactions: Option<Vec<Transaction>>,
    updates: Mutex<Vec<TransactionId>>,
}

#[async_trait]
impl FinanceBridge for StaticBridge {
    async fn export_transactions(&self, _: &str, _: NaiveDate) -> CoreResult<ExportPayload> {
        match &self.transactions {
            Some(txs) => Ok(ExportPayload::Transactions(txs.clone())),
            None => Err(Error::Bridge("MoneyMoney is not running".into())),
        }
    }

    async fn set_category(&self, id: &TransactionId, _: &str) -> CoreResult<()> {
        self.updates.lock().unwrap().push(id.clone());
        Ok(())
    }
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_no_subcommand_defaults_to_run() {
    let cli = Cli::try_parse_from(["mmcat"]).unwrap();
    assert!(cli.command.is_none());
    assert!(!cli.verbose);
}

#[test]
fn test_global_overrides() {
    let cli = Cli::try_parse_from([
        "mmcat",
        "run",
        "--dry-run",
        "--provider",
        "openai",
        "--days",
        "7",
        "--category-id",
        "abc",
    ])
    .unwrap();

    assert_eq!(cli.command, Some(Commands::Run { dry_run: true }));
    let overrides = cli.overrides();
    assert_eq!(overrides.provider.as_deref(), Some("openai"));
    assert_eq!(overrides.days, Some(7));
    assert_eq!(overrides.category_id.as_deref(), Some("abc"));
}

#[test]
fn test_negative_days_rejected() {
    assert!(Cli::try_parse_from(["mmcat", "--days", "-3"]).is_err());
}

#[test]
fn test_test_command_descriptions() {
    let cli = Cli::try_parse_from(["mmcat", "test", "Vet - checkup", "Shell - fuel"]).unwrap();
    assert_eq!(
        cli.command,
        Some(Commands::Test {
            descriptions: vec!["Vet - checkup".into(), "Shell - fuel".into()]
        })
    );
}

// ========== Export Report Tests ==========

#[test]
fn test_format_transaction_line() {
    assert_eq!(
        format_transaction_line(&tx(1, "Grocery Store", -54.3, true)),
        "- 2026-10-02: Grocery Store (-54.30 EUR)"
    );
}

#[test]
fn test_format_transaction_line_without_date() {
    let mut t = tx(1, "Landlord", 1200.0, true);
    t.booking_date = None;
    assert_eq!(format_transaction_line(&t), "- ????-??-??: Landlord (1200.00 EUR)");
}

// ========== Preflight Tests ==========

#[test]
fn test_preflight_unknown_provider_is_fatal() {
    let overrides = ConfigOverrides {
        provider: Some("mistral".into()),
        ..Default::default()
    };
    let file = write_config("");
    let err = commands::preflight(Some(file.path()), &overrides, |_| Some("key".into()))
        .unwrap_err();
    assert!(format!("{:#}", err).contains("mistral"));
}

#[test]
fn test_preflight_missing_credential_is_fatal() {
    let file = write_config("provider = \"anthropic\"\n");
    let err = commands::preflight(Some(file.path()), &ConfigOverrides::default(), |_| None)
        .unwrap_err();
    assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
}

#[test]
fn test_preflight_error_debug_hides_key() {
    let file = write_config("provider = \"openai\"\n");
    let result = commands::preflight(Some(file.path()), &ConfigOverrides::default(), |_| {
        Some("sk-very-secret".to_string())
    });
    let debug = format!("{:?}", result);
    assert!(debug.contains("gpt-4o"));
    assert!(!debug.contains("sk-very-secret"));
}

#[test]
fn test_preflight_uses_provider_key() {
    let file = write_config("provider = \"openai\"\n");
    let (config, client) =
        commands::preflight(Some(file.path()), &ConfigOverrides::default(), |var| {
            (var == "OPENAI_API_KEY").then(|| "sk-test".to_string())
        })
        .unwrap();
    assert_eq!(config.provider.as_str(), "openai");
    assert_eq!(client.model(), "gpt-4o");
}

#[test]
fn test_preflight_missing_config_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(
        commands::preflight(Some(&missing), &ConfigOverrides::default(), |_| Some("k".into()))
            .is_err()
    );
}

// ========== Command Tests ==========

#[test]
fn test_cmd_config() {
    let file = write_config("days = 5\ncategories = [\"Pets\", \"Tax\"]\n");
    let result = commands::cmd_config(Some(file.path()), &ConfigOverrides::default());
    assert!(result.is_ok());
}

#[test]
fn test_cmd_config_invalid_file() {
    let file = write_config("days = \"twenty\"\n");
    assert!(commands::cmd_config(Some(file.path()), &ConfigOverrides::default()).is_err());
}

#[test]
fn test_cmd_prompts() {
    assert!(commands::cmd_prompts(false).is_ok());
    assert!(commands::cmd_prompts(true).is_ok());
}

// ========== Run Output Tests ==========

fn run_fixture() -> (Config, mmcat_core::prompts::Prompt) {
    let config = Config::from_toml("", &ConfigOverrides::default()).unwrap();
    let prompt = PromptLibrary::embedded_only()
        .get(PromptId::CategorizeTransactions)
        .unwrap();
    (config, prompt)
}

#[tokio::test]
async fn test_run_pipeline_updates_booked() {
    let (config, prompt) = run_fixture();
    let bridge = StaticBridge {
        transactions: Some(vec![
            tx(1, "Grocery Store", -20.0, true),
            tx(2, "Vet Clinic", -80.0, true),
            tx(3, "Landlord", -900.0, false),
        ]),
        updates: Mutex::new(Vec::new()),
    };
    let ai = MockBackend::new();
    let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

    let summary = commands::run_pipeline(&config, &bridge, &ai, &prompt, false, today).await;

    assert_eq!(summary.exported, 3);
    assert_eq!(summary.updated, 2);
    assert_eq!(
        *bridge.updates.lock().unwrap(),
        vec![TransactionId::from(1), TransactionId::from(2)]
    );
}

#[tokio::test]
async fn test_run_pipeline_export_failure_still_summarizes() {
    let (config, prompt) = run_fixture();
    let bridge = StaticBridge {
        transactions: None,
        updates: Mutex::new(Vec::new()),
    };
    let ai = MockBackend::new();
    let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

    let summary = commands::run_pipeline(&config, &bridge, &ai, &prompt, false, today).await;

    assert_eq!(summary.exported, 0);
    assert_eq!(summary.updated, 0);
    assert_eq!(ai.call_count(), 0);
}

#[tokio::test]
async fn test_run_pipeline_dry_run() {
    let (config, prompt) = run_fixture();
    let bridge = StaticBridge {
        transactions: Some(vec![tx(1, "Grocery Store", -20.0, true)]),
        updates: Mutex::new(Vec::new()),
    };
    let ai = MockBackend::new();
    let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

    let summary = commands::run_pipeline(&config, &bridge, &ai, &prompt, true, today).await;

    assert!(bridge.updates.lock().unwrap().is_empty());
    assert_eq!(summary.classified, 1);
    assert!(summary.dry_run);
}

// ========== Provider Check Tests ==========

/// Writer that records whether buffered output was flushed
#[derive(Default)]
struct FlushTracker {
    written: Vec<u8>,
    flushed: usize,
}

impl Write for FlushTracker {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flushed = self.written.len();
        Ok(())
    }
}

#[test]
fn test_write_pending_flushes_prefix() {
    let mut out = FlushTracker::default();
    commands::write_pending(&mut out, "Checking provider availability... ").unwrap();
    assert_eq!(out.written, b"Checking provider availability... ");
    assert_eq!(out.flushed, out.written.len());
}

#[test]
fn test_sample_items_numbered_from_one() {
    let items = commands::sample_items(&["a - b".to_string(), "c - d".to_string()]);
    assert_eq!(items[0].id, TransactionId::from(1));
    assert_eq!(items[1].id, TransactionId::from(2));
    assert_eq!(items[1].detail, "c - d");
}

#[tokio::test]
async fn test_classify_samples_with_mock() {
    let (_, prompt) = run_fixture();
    let descriptions: Vec<String> = commands::SAMPLE_DESCRIPTIONS
        .iter()
        .map(|s| s.to_string())
        .collect();

    let result = commands::classify_samples(
        &MockBackend::new(),
        &prompt,
        &CategorySet::default(),
        &descriptions,
    )
    .await
    .unwrap();

    assert_eq!(result.assignments.len(), descriptions.len());
    assert_eq!(result.assignments[&TransactionId::from(3)], "Pets");
}

#[tokio::test]
async fn test_classify_samples_against_provider_server() {
    let server = MockProviderServer::start().await;
    let file = write_config(&format!(
        "provider = \"deepseek\"\n[hosts]\ndeepseek = \"{}\"\n",
        server.openai_url()
    ));
    let (config, client) =
        commands::preflight(Some(file.path()), &ConfigOverrides::default(), |_| {
            Some("sk-test".to_string())
        })
        .unwrap();
    let (_, prompt) = run_fixture();

    assert!(client.health_check().await);
    let result = commands::classify_samples(
        &client,
        &prompt,
        &config.categories,
        &["Landlord - rent".to_string()],
    )
    .await
    .unwrap();

    assert_eq!(result.assignments[&TransactionId::from(1)], "Real Estate");
    assert_eq!(
        server.requests()[0].header("authorization"),
        Some("Bearer sk-test")
    );
}
