//! Pre-flight checks before contacting external services.
//!
//! Validates that required keys and index location are configured
//! before starting operations that would otherwise fail on the first request.

use crate::config::Settings;
use crate::error::{OrgSearchError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Serving needs both services.
    Serve,
    /// A one-off search needs both services.
    Search,
    /// Concept extraction only needs the chat service.
    Concepts,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Serve | Operation::Search => {
            check_chat_key(settings)?;
            check_index(settings)?;
        }
        Operation::Concepts => {
            check_chat_key(settings)?;
        }
    }
    Ok(())
}

fn check_chat_key(settings: &Settings) -> Result<()> {
    match settings.chat.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => Ok(()),
        _ => Err(OrgSearchError::Config(
            "GROQ_API_KEY not set. Set it with: export GROQ_API_KEY='gsk_...'".to_string(),
        )),
    }
}

fn check_index(settings: &Settings) -> Result<()> {
    if settings.index.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
        return Err(OrgSearchError::Config(
            "PINECONE_API_KEY not set. Set it with: export PINECONE_API_KEY='pcsk_...'".to_string(),
        ));
    }
    if settings.index.host.is_none() && settings.index.name.is_none() {
        return Err(OrgSearchError::Config(
            "No index configured. Set PINECONE_HOST or PINECONE_INDEX.".to_string(),
        ));
    }
    Ok(())
}
