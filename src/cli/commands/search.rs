//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, settings: Settings) -> Result<()> {
    preflight::check(Operation::Search, &settings)?;

    let orchestrator = Orchestrator::new(&settings).await?;

    let spinner = Output::spinner("Searching...");
    let results = orchestrator.search(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) if results.is_empty() => {
            Output::warning(&format!("No results found for {}", query));
            Output::info("Try a different search term or check your spelling.");
        }
        Ok(results) => {
            Output::success(&format!("Found {} results", results.len()));
            for (i, result) in results.iter().enumerate() {
                Output::search_result(i + 1, &result.title, &result.url, result.similarity_score);
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
