//! Scoring algorithms.
//!
//! The search collects one edge weight per consumed token. A
//! [`ScoringAlgorithm`] reduces that list to a single score and ranks
//! completed matches against each other.
//!
//! ## Ranking
//!
//! The default [`ScoringAlgorithm::compare`] orders records by:
//!
//! 1. higher score
//! 2. paths without open words (`*`, `**`, `$var`) before paths with them
//! 3. exact (quoted) rules before ordinary ones
//! 4. longer run of literals before the first open word
//! 5. earlier inserted output
//!
//! The last key makes the order total, so equal inputs always rank the same.

use super::search::MatchRecord;
use std::cmp::Ordering;
use std::fmt;

bitflags::bitflags! {
    /// Word classes seen along a matched path.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PathFlags: u8 {
        const HAS_WILDCARD = 1 << 0;
        const HAS_GLOB     = 1 << 1;
        const HAS_VARIABLE = 1 << 2;
        const EXACT        = 1 << 3;

        const OPEN = Self::HAS_WILDCARD.bits() | Self::HAS_GLOB.bits() | Self::HAS_VARIABLE.bits();
    }
}

pub trait ScoringAlgorithm: Send + Sync + fmt::Debug {
    /// Reduce per-edge weights to one score. An empty path scores 0.
    fn score(&self, weights: &[f32]) -> f32;

    /// Rank two records; `Ordering::Less` means `a` is the better match.
    fn compare(&self, a: &MatchRecord, b: &MatchRecord) -> Ordering {
        rank_by_specificity(a, b)
    }
}

/// Arithmetic mean of the edge weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageScoring;

impl ScoringAlgorithm for AverageScoring {
    fn score(&self, weights: &[f32]) -> f32 {
        if weights.is_empty() {
            return 0.0;
        }
        weights.iter().sum::<f32>() / weights.len() as f32
    }
}

/// Score of the weakest edge: a path is only as specific as its loosest word.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeakestLinkScoring;

impl ScoringAlgorithm for WeakestLinkScoring {
    fn score(&self, weights: &[f32]) -> f32 {
        weights.iter().copied().reduce(f32::min).unwrap_or(0.0)
    }
}

/// Default tie-break chain shared by the built-in algorithms.
pub fn rank_by_specificity(a: &MatchRecord, b: &MatchRecord) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.flags.intersects(PathFlags::OPEN).cmp(&b.flags.intersects(PathFlags::OPEN)))
        .then_with(|| b.flags.contains(PathFlags::EXACT).cmp(&a.flags.contains(PathFlags::EXACT)))
        .then_with(|| b.literal_prefix.cmp(&a.literal_prefix))
        .then_with(|| a.output.seq.cmp(&b.output.seq))
}
