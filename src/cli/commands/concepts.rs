//! Concepts command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::concepts::{ChatConceptExtractor, ConceptExtractor};
use crate::config::Settings;
use anyhow::Result;

/// Run the concepts command.
pub async fn run_concepts(query: &str, settings: Settings) -> Result<()> {
    preflight::check(Operation::Concepts, &settings)?;

    let extractor = ChatConceptExtractor::from_settings(&settings)?;

    let spinner = Output::spinner("Extracting concepts...");
    let concepts = extractor.extract(query).await;
    spinner.finish_and_clear();

    let concepts = concepts.inspect_err(|e| Output::error(&format!("Extraction failed: {}", e)))?;

    Output::header("Concepts");
    for concept in concepts.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        println!("  {} {}", console::style("*").cyan(), concept);
    }

    Ok(())
}
