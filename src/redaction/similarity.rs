//! Similarity scores on a 0-100 scale

use crate::redaction::normalizer::normalize;

/// Normalized Levenshtein similarity, scaled to 0-100 and rounded
///
/// # Examples
///
/// ```
/// use veil::redaction::similarity::similarity;
///
/// assert_eq!(similarity("smith", "smith"), 100);
/// assert_eq!(similarity("smyth", "smith"), 80);
/// assert_eq!(similarity("", ""), 100);
/// ```
pub fn similarity(a: &str, b: &str) -> u8 {
    let score = strsim::normalized_levenshtein(a, b) * 100.0;
    score.round().clamp(0.0, 100.0) as u8
}

/// Similarity of two phrases after normalizing and sorting their words
///
/// Word order does not matter: `"Peter Begle"` and `"begle, peter"` score 100.
pub fn token_sort_similarity(a: &str, b: &str) -> u8 {
    similarity(&sorted_words(a), &sorted_words(b))
}

fn sorted_words(text: &str) -> String {
    let normalized = normalize(text);
    let mut words: Vec<&str> = normalized.split_whitespace().collect();
    words.sort_unstable();
    words.join(" ")
}
