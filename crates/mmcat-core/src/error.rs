//! Error types for mmcat

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown AI provider '{0}' (choose openai, anthropic or deepseek)")]
    UnknownProvider(String),

    #[error("AI provider is '{provider}' but {var} environment variable is not set")]
    MissingCredential { provider: String, var: String },

    #[error("Automation command failed: {0}")]
    Bridge(String),

    #[error("Property list error: {0}")]
    Plist(#[from] plist::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{provider} API error {status}: {body}")]
    Backend {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Whether this error must abort the process before any work is done
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::UnknownProvider(_)
                | Error::MissingCredential { .. }
                | Error::Toml(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
