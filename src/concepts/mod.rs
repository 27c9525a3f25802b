//! STEM concept extraction.
//!
//! A language model is asked for the concepts behind a question and answers
//! with `{"concepts": "A, B, C"}`, usually wrapped in a fenced `json` block.
//! The streamed answer is collected into one buffer and parsed here.

mod chat;

pub use chat::ChatConceptExtractor;

use crate::error::{OrgSearchError, Result};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\s*([\s\S]*?)\s*```").expect("Invalid regex"));

/// Trait for turning a question into a comma-separated concept string.
#[async_trait]
pub trait ConceptExtractor: Send + Sync {
    /// Extract concepts for `text`. The returned string is never empty.
    async fn extract(&self, text: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ConceptPayload {
    #[serde(default)]
    concepts: Option<serde_json::Value>,
}

/// Drain a fragment stream into a single trimmed buffer.
///
/// Stops at the first error.
pub async fn collect_fragments<S, E>(stream: S) -> std::result::Result<String, E>
where
    S: Stream<Item = std::result::Result<String, E>>,
{
    futures::pin_mut!(stream);

    let mut buffer = String::new();
    while let Some(fragment) = stream.next().await {
        buffer.push_str(&fragment?);
    }

    Ok(buffer.trim().to_string())
}

/// Pick the JSON text out of a model response.
///
/// Returns the contents of the first fenced `json` block, or the whole
/// (trimmed) response when there is none.
pub fn json_candidate(response: &str) -> &str {
    match JSON_BLOCK.captures(response).and_then(|caps| caps.get(1)) {
        Some(block) => block.as_str().trim(),
        None => response.trim(),
    }
}

/// Parse a model response into a non-empty concept string.
pub fn parse_concepts(response: &str) -> Result<String> {
    let candidate = json_candidate(response);

    let payload: ConceptPayload = serde_json::from_str(candidate)
        .map_err(|e| OrgSearchError::InvalidResponse(e.to_string()))?;

    let concepts = match payload.concepts {
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        // Some models return a list despite the instructions.
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    };

    if concepts.is_empty() {
        return Err(OrgSearchError::NoConcepts);
    }

    Ok(concepts)
}
