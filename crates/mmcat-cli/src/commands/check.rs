//! Provider check command

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use mmcat_core::ai::AIBackend;
use mmcat_core::config::ConfigOverrides;
use mmcat_core::models::{CategorySet, ClassificationItem, TransactionId};
use mmcat_core::pipeline::{categorize_items, Classification};
use mmcat_core::prompts::Prompt;

use super::{env_lookup, load_prompt, preflight};

/// Descriptions used when none are given
pub const SAMPLE_DESCRIPTIONS: &[&str] = &[
    "Grocery Store - weekly shop",
    "Landlord - rent October",
    "Vet Clinic - checkup",
    "Shell - fuel",
    "Netflix - subscription",
];

/// Write a status prefix and flush it before the line is completed
pub fn write_pending<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    out.write_all(message.as_bytes())?;
    out.flush()
}

/// Number the descriptions 1..=n as request items
pub fn sample_items(descriptions: &[String]) -> Vec<ClassificationItem> {
    descriptions
        .iter()
        .enumerate()
        .map(|(i, detail)| ClassificationItem {
            id: TransactionId::from(i as i64 + 1),
            detail: detail.clone(),
        })
        .collect()
}

/// Classify the descriptions in one batch, like a real run would
pub async fn classify_samples(
    ai: &dyn AIBackend,
    prompt: &Prompt,
    categories: &CategorySet,
    descriptions: &[String],
) -> Result<Classification> {
    let items = sample_items(descriptions);
    Ok(categorize_items(ai, prompt, categories, &items).await?)
}

/// Check the configured provider and classify sample descriptions
pub async fn cmd_test(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
    descriptions: &[String],
) -> Result<()> {
    let (config, client) = preflight(config_path, overrides, env_lookup)?;
    let prompt = load_prompt()?;

    println!("🔍 Testing AI provider...\n");
    println!("  Provider: {}", client.provider());
    println!("  Model:    {}", client.model());
    println!("  Host:     {}\n", client.host());

    write_pending(&mut io::stdout(), "Checking provider availability... ")?;
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("⚠️  Health check failed, trying a categorization anyway");
    }

    let descriptions: Vec<String> = if descriptions.is_empty() {
        SAMPLE_DESCRIPTIONS.iter().map(|s| s.to_string()).collect()
    } else {
        descriptions.to_vec()
    };

    println!("\n📋 Categorizing {} descriptions...\n", descriptions.len());

    match classify_samples(&client, &prompt, &config.categories, &descriptions).await {
        Ok(result) => {
            for (item, detail) in sample_items(&descriptions).iter().zip(&descriptions) {
                match result.assignments.get(&item.id) {
                    Some(category) => println!("  \"{}\" → {}", detail, category),
                    None => println!("  \"{}\" → (no result)", detail),
                }
            }
            for (id, label) in &result.coerced {
                println!("\n  ⚠️  #{} came back as '{}', not an allowed category", id, label);
            }
        }
        Err(e) => {
            println!("❌ Error: {}", e);
        }
    }

    Ok(())
}
