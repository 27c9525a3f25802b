//! Configuration module for orgsearch.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ConceptPrompts, Prompts};
pub use settings::{
    ChatSettings, GeneralSettings, IndexSettings, PromptSettings, ResultSettings,
    RetrySettings, ServerSettings, Settings,
};
