//! Display records for search hits.

use crate::search::SearchHit;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// Word boundaries are ASCII-only: accented letters count as separators.
static GENERIC_TITLE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^A-Za-z0-9_])((?i:introduction|guide|basics|concepts))([^A-Za-z0-9_]|$)")
        .expect("Invalid regex")
});

/// A search result as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// Relevance in [0, 1].
    pub similarity_score: f64,
}

/// Options controlling how hits become display records.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Replace the first generic title word with the query text.
    pub rewrite_generic_titles: bool,
}

/// Replace the first "Introduction", "Guide", "Basics" or "Concepts"
/// (any case, whole word) in `title` with `query`.
pub fn rewrite_title(title: &str, query: &str) -> String {
    GENERIC_TITLE_WORD
        .replace(title, |caps: &Captures| format!("{}{}{}", &caps[1], query, &caps[3]))
        .into_owned()
}

/// Map index hits 1:1 to display records, keeping their order.
pub fn format_hits(hits: Vec<SearchHit>, query: &str, options: FormatOptions) -> Vec<SearchResult> {
    hits.into_iter()
        .map(|hit| {
            let title = hit.field_str("title").unwrap_or_default();
            let title = if options.rewrite_generic_titles {
                rewrite_title(title, query)
            } else {
                title.to_string()
            };

            SearchResult {
                title,
                url: hit.field_str("url").unwrap_or_default().to_string(),
                similarity_score: clamp_score(hit.score),
            }
        })
        .collect()
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
