//! Record search against a hosted vector index.
//!
//! Provides a trait-based interface so the HTTP layer can be exercised
//! without a live index.

mod pinecone;

pub use pinecone::{normalize_host, resolve_host, PineconeClient};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A text query against a namespace of the index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Text embedded by the index to find similar records.
    pub text: String,
    /// Maximum number of hits.
    pub top_k: usize,
    /// Record fields returned with every hit.
    pub fields: Vec<String>,
}

impl SearchQuery {
    /// Build the query text from the user's question and the extracted concepts.
    ///
    /// Produces `"{question}. {concepts}."`.
    pub fn combined(question: &str, concepts: &str, top_k: usize, fields: Vec<String>) -> Self {
        Self {
            text: format!("{}. {}.", question, concepts),
            top_k,
            fields,
        }
    }
}

/// A ranked record returned by the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Relevance score (higher is better).
    #[serde(rename = "_score", default)]
    pub score: f64,
    /// The projected record fields.
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl SearchHit {
    /// Get a string field from the projection.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }
}

/// Trait for record search implementations.
#[async_trait]
pub trait RecordSearch: Send + Sync {
    /// Run a query and return hits in the order the index ranked them.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>>;
}
