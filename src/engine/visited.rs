//! Loop detection for the scored search.
//!
//! The tree itself is acyclic, but the search state is `(node, offset)`, and
//! that state can be reached more than once: a `**` node re-enters itself for
//! every extra token it swallows, and two globs in a row reach the same
//! `(node, offset)` through different splits of the input.
//!
//! ```text
//! rule:   ** **          input: a b c
//!
//! G1(a) ─ G2(b) ─ G2(c)            -> (G2, 3) first arrival, explored
//! G1(a) ─ G1(b) ─ G2(c)            -> (G2, 3) again, pruned
//! ```
//!
//! Every arrival at a state has walked the same root-to-node path and has the
//! same tokens left, so whatever can follow is identical; only the score of
//! the part already walked differs. The detector keeps the best partial score
//! seen per state and lets an arrival through only when it improves on it.
//! Under the strict policy converging arrivals score alike and each state is
//! explored once. A fuzzy literal can make a later arrival strictly better,
//! in which case the state is explored again and its results replace the
//! earlier ones.
//!
//! The memo belongs to one search call and is dropped with it.

use super::tree::NodeId;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Partial scores closer than this count as equal, so float rounding across
/// different glob splits never triggers a re-walk.
const IMPROVEMENT_EPSILON: f32 = 1e-6;

#[derive(Debug, Default)]
pub(crate) struct LoopDetector {
    best: HashMap<(NodeId, usize), f32>,
}

impl LoopDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an arrival at `(node, offset)` whose path so far scores
    /// `partial`. Returns `false` when an earlier arrival scored at least as
    /// well.
    pub fn enter(&mut self, node: NodeId, offset: usize, partial: f32) -> bool {
        match self.best.entry((node, offset)) {
            Entry::Vacant(slot) => {
                slot.insert(partial);
                true
            }
            Entry::Occupied(mut slot) if partial > *slot.get() + IMPROVEMENT_EPSILON => {
                slot.insert(partial);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Distinct states entered so far.
    pub fn len(&self) -> usize {
        self.best.len()
    }
}
