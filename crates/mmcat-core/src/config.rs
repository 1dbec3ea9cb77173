//! Run configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit `--config` path, or the user file (~/.config/mmcat/config.toml)
//! 2. Embedded defaults (compiled into binary) for every key the file leaves out
//!
//! Command-line overrides are applied last. The resulting [`Config`] is built
//! once at startup and handed to each pipeline stage.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::CategorySet;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Supported AI providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAI,
    Anthropic,
    DeepSeek,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::DeepSeek => "deepseek",
        }
    }

    /// Environment variable holding this provider's API key
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    pub fn all() -> &'static [Provider] {
        &[Self::OpenAI, Self::Anthropic, Self::DeepSeek]
    }
}

impl std::str::FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "deepseek" => Ok(Self::DeepSeek),
            _ => Err(Error::UnknownProvider(s.to_string())),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// On-disk config shape; every key is optional so user files can be partial
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    provider: Option<String>,
    category_id: Option<String>,
    days: Option<u32>,
    fallback_category: Option<String>,
    categories: Option<Vec<String>>,
    max_tokens: Option<u32>,
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    models: HashMap<String, String>,
    #[serde(default)]
    hosts: HashMap<String, String>,
}

impl FileConfig {
    /// Fill unset keys from `defaults`
    fn or(mut self, defaults: FileConfig) -> FileConfig {
        for (k, v) in defaults.models {
            self.models.entry(k).or_insert(v);
        }
        for (k, v) in defaults.hosts {
            self.hosts.entry(k).or_insert(v);
        }
        FileConfig {
            provider: self.provider.or(defaults.provider),
            category_id: self.category_id.or(defaults.category_id),
            days: self.days.or(defaults.days),
            fallback_category: self.fallback_category.or(defaults.fallback_category),
            categories: self.categories.or(defaults.categories),
            max_tokens: self.max_tokens.or(defaults.max_tokens),
            request_timeout_secs: self.request_timeout_secs.or(defaults.request_timeout_secs),
            models: self.models,
            hosts: self.hosts,
        }
    }
}

/// Values given on the command line
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub provider: Option<String>,
    pub category_id: Option<String>,
    pub days: Option<u32>,
}

/// Where the config file values came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Embedded,
    File(PathBuf),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedded => write!(f, "built-in defaults"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Effective configuration for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    /// MoneyMoney category UUID to export from
    pub category_id: String,
    /// Lookback window in days
    pub days: u32,
    pub categories: CategorySet,
    /// Model name for the selected provider
    pub model: String,
    /// API base URL for the selected provider
    pub base_url: String,
    pub max_tokens: u32,
    pub request_timeout: Option<Duration>,
    pub source: ConfigSource,
}

impl Config {
    /// Load from the default locations and apply overrides
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        Self::load_from(None, overrides)
    }

    /// Load from an explicit path (or the default locations) and apply overrides
    ///
    /// An explicit path must exist; the default user path is optional.
    pub fn load_from(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let defaults = parse_file_config(DEFAULT_CONFIG)?;

        let (file, source) = match path {
            Some(p) => {
                let content = fs::read_to_string(p).map_err(|e| {
                    Error::Config(format!("Failed to read config {}: {}", p.display(), e))
                })?;
                (parse_file_config(&content)?, ConfigSource::File(p.to_path_buf()))
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(p) => {
                    let content = fs::read_to_string(&p).map_err(|e| {
                        Error::Config(format!("Failed to read config {}: {}", p.display(), e))
                    })?;
                    (parse_file_config(&content)?, ConfigSource::File(p))
                }
                None => (FileConfig::default(), ConfigSource::Embedded),
            },
        };

        Self::resolve(file.or(defaults), overrides, source)
    }

    /// Build from a TOML string layered over the embedded defaults
    pub fn from_toml(content: &str, overrides: &ConfigOverrides) -> Result<Self> {
        let defaults = parse_file_config(DEFAULT_CONFIG)?;
        let file = parse_file_config(content)?;
        Self::resolve(file.or(defaults), overrides, ConfigSource::Embedded)
    }

    fn resolve(file: FileConfig, overrides: &ConfigOverrides, source: ConfigSource) -> Result<Self> {
        let provider_name = overrides
            .provider
            .clone()
            .or(file.provider)
            .ok_or_else(|| Error::Config("No AI provider configured".into()))?;
        let provider: Provider = provider_name.parse()?;

        let category_id = overrides
            .category_id
            .clone()
            .or(file.category_id)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Config("category_id must not be empty".into()))?;

        let days = overrides
            .days
            .or(file.days)
            .ok_or_else(|| Error::Config("days is not set".into()))?;

        let labels = file.categories.unwrap_or_default();
        if labels.iter().all(|l| l.trim().is_empty()) {
            return Err(Error::Config("categories must list at least one label".into()));
        }
        let fallback = file
            .fallback_category
            .ok_or_else(|| Error::Config("fallback_category is not set".into()))?;
        if fallback.trim().is_empty() {
            return Err(Error::Config("fallback_category must not be empty".into()));
        }
        let categories = CategorySet::new(labels, &fallback);

        let model = file
            .models
            .get(provider.as_str())
            .cloned()
            .ok_or_else(|| Error::Config(format!("No model configured for {}", provider)))?;
        let base_url = file
            .hosts
            .get(provider.as_str())
            .map(|h| h.trim_end_matches('/').to_string())
            .ok_or_else(|| Error::Config(format!("No host configured for {}", provider)))?;

        Ok(Self {
            provider,
            category_id,
            days,
            categories,
            model,
            base_url,
            max_tokens: file.max_tokens.unwrap_or(4096),
            request_timeout: file.request_timeout_secs.map(Duration::from_secs),
            source,
        })
    }

    /// Look up the API key for the selected provider
    ///
    /// `lookup` is normally `std::env::var(..).ok()`; absent or blank keys
    /// are a fatal configuration error.
    pub fn api_key_with<F>(&self, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = self.provider.api_key_var();
        lookup(var)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::MissingCredential {
                provider: self.provider.to_string(),
                var: var.to_string(),
            })
    }

    /// Look up the API key for the selected provider from the environment
    pub fn api_key(&self) -> Result<String> {
        self.api_key_with(|var| std::env::var(var).ok())
    }
}

/// Default user config path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mmcat").join("config.toml"))
}

/// The embedded default config text
pub fn default_config_text() -> &'static str {
    DEFAULT_CONFIG
}

fn parse_file_config(content: &str) -> Result<FileConfig> {
    Ok(toml::from_str(content)?)
}
