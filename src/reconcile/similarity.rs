//! Text similarity used to pair external records with fresh blocks.

use std::collections::HashSet;

use crate::text::{SeparatingNormalizer, TextNormalizer};

/// Strategy for scoring how well two texts match, in `[0, 1]`.
pub trait Similarity: Send + Sync {
    /// Score `record` text against `candidate` text.
    fn score(&self, record: &str, candidate: &str) -> f64;

    /// Return the name of this strategy for debugging.
    fn name(&self) -> &'static str;
}

/// Overlap coefficient of distinct normalized tokens.
///
/// `score = |A ∩ B| / max(1, min(|A|, |B|))`, so a short text fully contained
/// in a longer one scores 1.0. Either side without tokens scores 0.
///
/// # Examples
///
/// ```
/// use canvas_oxide::reconcile::{Similarity, TokenOverlap};
///
/// let sim = TokenOverlap::default();
/// assert_eq!(sim.score("apple banana", "banana apple cherry"), 1.0);
/// assert_eq!(sim.score("", "x"), 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokenOverlap {
    normalizer: SeparatingNormalizer,
}

impl TokenOverlap {
    /// Score with a custom token alphabet.
    pub fn new(normalizer: SeparatingNormalizer) -> Self {
        Self { normalizer }
    }

    /// The normalizer in use.
    pub fn normalizer(&self) -> &SeparatingNormalizer {
        &self.normalizer
    }
}

impl Similarity for TokenOverlap {
    fn score(&self, record: &str, candidate: &str) -> f64 {
        overlap_coefficient(&self.normalizer.token_set(record), &self.normalizer.token_set(candidate))
    }

    fn name(&self) -> &'static str {
        "TokenOverlap"
    }
}

/// Overlap coefficient of two token sets.
pub fn overlap_coefficient(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let common = b.iter().filter(|t| a.contains(*t)).count();
    common as f64 / a.len().min(b.len()).max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contained_text_scores_one() {
        let sim = TokenOverlap::default();
        assert_eq!(sim.score("apple banana", "banana apple cherry"), 1.0);
        assert_eq!(sim.score("banana apple cherry", "apple banana"), 1.0);
    }

    #[test]
    fn test_empty_scores_zero() {
        let sim = TokenOverlap::default();
        assert_eq!(sim.score("", "x"), 0.0);
        assert_eq!(sim.score("x", ""), 0.0);
        assert_eq!(sim.score("...", "---"), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        let sim = TokenOverlap::default();
        // {market, size} vs {market, share, today}: 1 common of min 2
        assert_eq!(sim.score("Market size", "market share today"), 0.5);
    }

    #[test]
    fn test_duplicates_do_not_inflate() {
        let sim = TokenOverlap::default();
        assert_eq!(sim.score("data data data", "data science"), 1.0);
        assert_eq!(sim.score("a b", "a a a c d"), 0.5);
    }

    #[test]
    fn test_repeated_candidate_tokens_stay_within_one() {
        let sim = TokenOverlap::default();
        let score = sim.score("a b c", "a a a a d e f");
        assert!((score - 1.0 / 3.0).abs() < 1e-12);
        assert!(sim.score("x y", "x x x x y y y") <= 1.0);
    }

    #[test]
    fn test_punctuation_and_case_ignored() {
        let sim = TokenOverlap::default();
        assert_eq!(sim.score("Total addressable market!", "TOTAL-ADDRESSABLE market"), 1.0);
    }

    #[test]
    fn test_native_alphabet_tokens() {
        let sim = TokenOverlap::default();
        assert_eq!(sim.score("Объём рынка", "объём рынка 50 млрд"), 1.0);
        let ascii = TokenOverlap::new(SeparatingNormalizer::ascii_only());
        assert_eq!(ascii.score("Объём рынка", "объём рынка"), 0.0);
    }
}
