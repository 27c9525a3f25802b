//! orgsearch - STEM video search
//!
//! Finds educational videos for a free-text STEM question.
//!
//! # Overview
//!
//! A search runs in three steps:
//! - A language model extracts the key concepts behind the question
//! - The question and concepts are sent together to a hosted vector index
//! - The ranked hits become `{title, url, similarity_score}` records
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `retry` - Exponential-backoff retry for outbound calls
//! - `concepts` - Concept extraction over a streamed chat completion
//! - `search` - Vector index client
//! - `format` - Display records for hits
//! - `suggestions` - Example questions for the search box
//! - `orchestrator` - Pipeline coordination
//! - `cli` - Command line and HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use orgsearch::config::Settings;
//! use orgsearch::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(&settings).await?;
//!
//!     for result in orchestrator.search("What are Newton's laws of motion?").await? {
//!         println!("{:.2} {} {}", result.similarity_score, result.title, result.url);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod concepts;
pub mod config;
pub mod error;
pub mod format;
pub mod openai;
pub mod orchestrator;
pub mod retry;
pub mod search;
pub mod suggestions;

pub use error::{OrgSearchError, Result};
