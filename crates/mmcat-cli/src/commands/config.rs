//! Configuration inspection command

use std::path::Path;

use anyhow::Result;
use chrono::Local;
use mmcat_core::config::{default_config_path, ConfigOverrides, Provider};
use mmcat_core::pipeline::start_date;

use super::{env_lookup, load_config};

/// Print the effective configuration and where it came from
pub fn cmd_config(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<()> {
    let config = load_config(config_path, overrides)?;

    println!("Configuration ({})\n", config.source);
    println!("  Provider:     {}", config.provider);
    println!("  Model:        {}", config.model);
    println!("  Host:         {}", config.base_url);
    println!("  Category ID:  {}", config.category_id);
    println!(
        "  Window:       {} days (since {})",
        config.days,
        start_date(Local::now().date_naive(), config.days)
    );
    if config.provider == Provider::Anthropic {
        println!("  Max tokens:   {}", config.max_tokens);
    }
    match config.request_timeout {
        Some(t) => println!("  Timeout:      {}s", t.as_secs()),
        None => println!("  Timeout:      none"),
    }

    println!(
        "\nCategories ({}, fallback \"{}\"):",
        config.categories.len(),
        config.categories.fallback()
    );
    for label in config.categories.labels() {
        println!("  - {}", label);
    }

    println!("\nCredentials:");
    for provider in Provider::all() {
        let var = provider.api_key_var();
        let status = if env_lookup(var).is_some_and(|v| !v.trim().is_empty()) {
            "✓ set"
        } else {
            "not set"
        };
        let marker = if *provider == config.provider { "*" } else { " " };
        println!("  {} {:<20} {}", marker, var, status);
    }

    println!();
    println!(
        "User config file: {}",
        default_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not available)".to_string())
    );

    Ok(())
}
