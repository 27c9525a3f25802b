//! Configuration settings for orgsearch.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub chat: ChatSettings,
    pub index: IndexSettings,
    pub retry: RetrySettings,
    pub results: ResultSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Chat-completion service used for concept extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Base URL of an OpenAI-compatible API.
    pub api_base: String,
    /// API key. Usually supplied through `GROQ_API_KEY` instead.
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 1.4,
            max_tokens: 4096,
            top_p: 0.95,
            timeout_seconds: 300,
        }
    }
}

/// Vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Data-plane host of the index. Resolved from `name` when absent.
    pub host: Option<String>,
    /// Index name, used to look up the host through the control plane.
    pub name: Option<String>,
    /// API key. Usually supplied through `PINECONE_API_KEY` instead.
    pub api_key: Option<String>,
    pub namespace: String,
    pub top_k: usize,
    /// Record fields returned with every hit.
    pub fields: Vec<String>,
    pub api_version: String,
    pub control_plane_url: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            host: None,
            name: None,
            api_key: None,
            namespace: "youtube_videos_v2".to_string(),
            top_k: 10,
            fields: vec!["title".to_string(), "url".to_string()],
            api_version: "2025-01".to_string(),
            control_plane_url: "https://api.pinecone.io".to_string(),
        }
    }
}

/// Backoff applied to both outbound calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay_ms: 1000,
        }
    }
}

/// Result presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResultSettings {
    /// Replace generic title words ("Introduction", "Basics", ...) with the
    /// query text. Deprecated, off by default.
    pub rewrite_generic_titles: bool,
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides are applied on top of the file.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Override keys and index location from the environment.
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GROQ_API_KEY") {
            self.chat.api_key = Some(key);
        }
        if let Some(key) = get("PINECONE_API_KEY") {
            self.index.api_key = Some(key);
        }
        if let Some(name) = get("PINECONE_INDEX") {
            self.index.name = Some(name);
        }
        if let Some(host) = get("PINECONE_HOST") {
            self.index.host = Some(host);
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::OrgSearchError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("orgsearch")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded custom prompt directory, if configured.
    pub fn prompt_dir(&self) -> Option<PathBuf> {
        self.prompts.custom_dir.as_deref().map(Self::expand_path)
    }
}
