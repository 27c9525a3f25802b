//! Example questions offered while the user types.

/// Maximum number of suggestions shown at once.
pub const MAX_SUGGESTIONS: usize = 5;

pub const SUGGESTIONS: &[&str] = &[
    "What is the derivative of a function?",
    "How do you solve a system of linear equations?",
    "What are Newton's laws of motion?",
    "How does chemical equilibrium work?",
    "What is the difference between DNA and RNA?",
    "How do integrals relate to area under a curve?",
    "What are the fundamental forces of physics?",
    "How does the pH scale work in chemistry?",
    "What is the Pythagorean theorem used for?",
    "How does probability theory apply to real-world problems?",
];

/// Suggestions containing `input` (case-insensitive), at most [`MAX_SUGGESTIONS`].
///
/// Empty input yields nothing.
pub fn filter_suggestions(input: &str) -> Vec<&'static str> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    SUGGESTIONS
        .iter()
        .copied()
        .filter(|s| s.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .collect()
}
