//! Error types for orgsearch.

use thiserror::Error;

/// Library-level error type for orgsearch operations.
#[derive(Error, Debug)]
pub enum OrgSearchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The model answered, but the answer held no parseable JSON object.
    #[error("Invalid JSON response: {0}")]
    InvalidResponse(String),

    #[error("No concepts extracted")]
    NoConcepts,

    #[error("Chat completion error: {0}")]
    ChatCompletion(String),

    #[error("Search index error: {0}")]
    Search(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for orgsearch operations.
pub type Result<T> = std::result::Result<T, OrgSearchError>;
