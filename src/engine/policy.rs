//! Match policies.
//!
//! A [`MatchPolicy`] answers one question for the search: does the input token
//! match this tree word, and how closely? The answer is a weight in `[0, 1]`
//! (`None` means no match). Open word classes match any token but weigh less
//! than a literal hit, which is what lets specific rules outrank general ones.
//!
//! Policies are picked when the tree is built and are shared read-only by every
//! query, hence the `Send + Sync` bound.

use crate::{Word, WordKind};
use std::fmt;

/// How literals are compared on the current path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Compare normalized (lowercased) text.
    Normal,
    /// Path went through an exact marker: compare against the token as typed.
    Verbatim,
}

/// Per-class edge weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyWeights {
    pub literal: f32,
    pub variable: f32,
    pub wildcard: f32,
    pub glob: f32,
}

impl Default for PolicyWeights {
    fn default() -> Self {
        PolicyWeights { literal: 1.0, variable: 0.8, wildcard: 0.6, glob: 0.5 }
    }
}

impl PolicyWeights {
    /// Weight of an open word class. `None` for literals and markers.
    pub fn open(&self, kind: WordKind) -> Option<f32> {
        match kind {
            WordKind::Variable => Some(self.variable),
            WordKind::Wildcard => Some(self.wildcard),
            WordKind::Glob => Some(self.glob),
            WordKind::Literal | WordKind::ExactMarker => None,
        }
    }
}

pub trait MatchPolicy: Send + Sync + fmt::Debug {
    /// Weight of matching `input` against tree word `pattern`, or `None`.
    ///
    /// Never called for exact markers, which consume no input.
    fn weight(&self, pattern: &Word, input: &Word, mode: MatchMode) -> Option<f32>;
}

/// Literal hits only on equal text.
#[derive(Debug, Clone, Default)]
pub struct StrictMatchPolicy {
    pub weights: PolicyWeights,
}

impl StrictMatchPolicy {
    pub fn new(weights: PolicyWeights) -> Self {
        StrictMatchPolicy { weights }
    }
}

impl MatchPolicy for StrictMatchPolicy {
    fn weight(&self, pattern: &Word, input: &Word, mode: MatchMode) -> Option<f32> {
        match pattern.kind {
            WordKind::Literal => literal_eq(pattern, input, mode).then_some(self.weights.literal),
            kind => self.weights.open(kind),
        }
    }
}

/// Tolerates small typos in user literals.
///
/// A rule word of at least [`MIN_TYPO_LEN`] characters matches a token within
/// `len / 3` edits (at least one), scaled down by the edit ratio and capped at
/// `typo_weight`. Shorter words and verbatim comparisons stay strict.
/// Shortest rule word that accepts a typo. Below this a single edit changes
/// most of the word (`am` -> `an`, `i` -> `u`).
pub const MIN_TYPO_LEN: usize = 3;

#[derive(Debug, Clone)]
pub struct FuzzyMatchPolicy {
    pub weights: PolicyWeights,
    pub typo_weight: f32,
}

impl Default for FuzzyMatchPolicy {
    fn default() -> Self {
        FuzzyMatchPolicy { weights: PolicyWeights::default(), typo_weight: 0.9 }
    }
}

impl FuzzyMatchPolicy {
    pub fn new(weights: PolicyWeights) -> Self {
        FuzzyMatchPolicy { weights, ..Self::default() }
    }
}

impl MatchPolicy for FuzzyMatchPolicy {
    fn weight(&self, pattern: &Word, input: &Word, mode: MatchMode) -> Option<f32> {
        match pattern.kind {
            WordKind::Literal => {
                if literal_eq(pattern, input, mode) {
                    return Some(self.weights.literal);
                }
                if mode == MatchMode::Verbatim {
                    return None;
                }
                let len = pattern.text.chars().count();
                if len < MIN_TYPO_LEN {
                    return None;
                }
                let dist = strsim::levenshtein(&pattern.text, &input.text);
                if dist > (len / 3).max(1) {
                    return None;
                }
                let closeness = 1.0 - dist as f32 / len as f32;
                let weight = (self.weights.literal * closeness).min(self.typo_weight);
                (weight > 0.0).then_some(weight)
            }
            kind => self.weights.open(kind),
        }
    }
}

fn literal_eq(pattern: &Word, input: &Word, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Normal => pattern.text == input.text,
        MatchMode::Verbatim => pattern.text == input.original,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(text: &str) -> Word {
        Word::literal(text.to_lowercase(), text)
    }

    #[test]
    fn strict_literals() {
        let policy = StrictMatchPolicy::default();
        assert_eq!(policy.weight(&lit("hello"), &lit("Hello"), MatchMode::Normal), Some(1.0));
        assert_eq!(policy.weight(&lit("hello"), &lit("help"), MatchMode::Normal), None);
    }

    #[test]
    fn open_classes_weigh_less_than_literals() {
        let policy = StrictMatchPolicy::default();
        let input = lit("anything");
        let var = policy.weight(&Word::variable("x"), &input, MatchMode::Normal).unwrap();
        let wild = policy.weight(&Word::wildcard(), &input, MatchMode::Normal).unwrap();
        let glob = policy.weight(&Word::glob(), &input, MatchMode::Normal).unwrap();
        assert!(1.0 > var && var > wild && wild > glob);
    }

    #[test]
    fn verbatim_compares_original_case() {
        let policy = StrictMatchPolicy::default();
        let pattern = Word::literal("Hello", "Hello");
        assert_eq!(policy.weight(&pattern, &lit("Hello"), MatchMode::Verbatim), Some(1.0));
        assert_eq!(policy.weight(&pattern, &lit("hello"), MatchMode::Verbatim), None);
    }

    #[test]
    fn fuzzy_accepts_small_typos() {
        let policy = FuzzyMatchPolicy::default();
        let w = policy.weight(&lit("weather"), &lit("wether"), MatchMode::Normal).unwrap();
        assert!(w < 1.0 && w > 0.5);
        assert_eq!(policy.weight(&lit("weather"), &lit("weather"), MatchMode::Normal), Some(1.0));
        assert_eq!(policy.weight(&lit("cat"), &lit("dog"), MatchMode::Normal), None);
        assert_eq!(policy.weight(&Word::literal("Hello", "Hello"), &lit("Helo"), MatchMode::Verbatim), None);
    }

    #[test]
    fn fuzzy_keeps_short_words_strict() {
        let policy = FuzzyMatchPolicy::default();
        assert_eq!(policy.weight(&lit("i"), &lit("u"), MatchMode::Normal), None);
        assert_eq!(policy.weight(&lit("am"), &lit("an"), MatchMode::Normal), None);
        assert_eq!(policy.weight(&lit("am"), &lit("am"), MatchMode::Normal), Some(1.0));

        let w = policy.weight(&lit("cat"), &lit("car"), MatchMode::Normal).unwrap();
        assert!(w > 0.0 && w < 1.0);
    }

    #[test]
    fn fuzzy_never_reports_zero_weight_matches() {
        let weights = PolicyWeights { literal: 0.0, ..PolicyWeights::default() };
        let policy = FuzzyMatchPolicy { weights, typo_weight: 0.9 };
        assert_eq!(policy.weight(&lit("weather"), &lit("wether"), MatchMode::Normal), None);
    }
}
