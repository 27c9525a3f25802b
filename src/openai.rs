//! OpenAI-compatible client configuration for the chat-completion service.

use crate::config::ChatSettings;
use crate::error::{OrgSearchError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a chat client pointed at the configured API base.
///
/// Fails when no API key is configured.
pub fn create_client(settings: &ChatSettings) -> Result<Client<OpenAIConfig>> {
    let api_key = settings
        .api_key
        .as_deref()
        .ok_or_else(|| OrgSearchError::Config("GROQ_API_KEY is not set".to_string()))?;

    create_client_with_key(settings, api_key)
}

/// Create a chat client with an explicit key.
pub fn create_client_with_key(settings: &ChatSettings, api_key: &str) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_seconds))
        .build()?;

    let config = OpenAIConfig::new()
        .with_api_base(settings.api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}
