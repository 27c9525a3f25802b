//! Search pipeline orchestrator for orgsearch.
//!
//! Coordinates concept extraction, record search and result formatting.

use crate::concepts::{ChatConceptExtractor, ConceptExtractor};
use crate::config::Settings;
use crate::error::{OrgSearchError, Result};
use crate::format::{format_hits, FormatOptions, SearchResult};
use crate::retry::RetryPolicy;
use crate::search::{PineconeClient, RecordSearch, SearchQuery};
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the question → videos pipeline.
///
/// Holds the two long-lived service clients; cheap to share behind an `Arc`.
pub struct Orchestrator {
    extractor: Arc<dyn ConceptExtractor>,
    searcher: Arc<dyn RecordSearch>,
    top_k: usize,
    fields: Vec<String>,
    format_options: FormatOptions,
}

impl Orchestrator {
    /// Create the orchestrator and its service clients from settings.
    pub async fn new(settings: &Settings) -> Result<Self> {
        let extractor = ChatConceptExtractor::from_settings(settings)?;
        let searcher = PineconeClient::connect(&settings.index)
            .await?
            .with_retry(RetryPolicy::from(&settings.retry));

        info!(
            "Using model {} and namespace {}",
            settings.chat.model,
            searcher.namespace()
        );

        Ok(Self::with_components(
            Arc::new(extractor),
            Arc::new(searcher),
            settings,
        ))
    }

    /// Create an orchestrator around existing components.
    pub fn with_components(
        extractor: Arc<dyn ConceptExtractor>,
        searcher: Arc<dyn RecordSearch>,
        settings: &Settings,
    ) -> Self {
        Self {
            extractor,
            searcher,
            top_k: settings.index.top_k,
            fields: settings.index.fields.clone(),
            format_options: FormatOptions {
                rewrite_generic_titles: settings.results.rewrite_generic_titles,
            },
        }
    }

    /// Run the full pipeline: extract concepts, search, format.
    #[instrument(skip(self))]
    pub async fn search(&self, text: &str) -> Result<Vec<SearchResult>> {
        validate(text)?;

        let concepts = self.extractor.extract(text).await?;
        if concepts.trim().is_empty() {
            return Err(OrgSearchError::NoConcepts);
        }

        let query = SearchQuery::combined(text, &concepts, self.top_k, self.fields.clone());
        let hits = self.searcher.search(&query).await?;

        let results = format_hits(hits, text, self.format_options);
        info!("Returning {} results", results.len());
        Ok(results)
    }
}

fn validate(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(OrgSearchError::InvalidInput("Missing query text".to_string()));
    }
    Ok(())
}
