//! Matching engine.
//!
//! This module holds everything between a raw phrase and a ranked list of
//! matches. The public [`Engine`](crate::Engine) in `api.rs` is a thin layer on
//! top that owns a [`Tree`] and turns records into replies.
//!
//! ## How the parts work together
//!
//! ```text
//! rule phrase ── classifier::tokenize_rule_input ──┐
//!                (classifier.rs)                   │
//!                                                  v
//!                                   Tree::add (tree.rs)
//!                                     - reuse shared prefix
//!                                     - attach CandidateOutput
//!
//! user phrase ── classifier::tokenize_user_input ──┐
//!                                                  v
//!                                   Search::run (search.rs)
//!                                     - MatchPolicy per edge  (policy.rs)
//!                                     - VarStack per path     (varstack.rs)
//!                                     - LoopDetector          (visited.rs)
//!                                     - ScoringAlgorithm rank (scoring.rs)
//!                                                  │
//!                                                  v
//!                                   Vec<MatchRecord> + SearchMetrics
//!                                                  │
//!                                   expand::expand_with (expand.rs)
//!                                                  v
//!                                             reply text
//! ```
//!
//! ## Responsibilities by module
//!
//! - `classifier.rs`: phrase -> typed `Word`s, symbol filtering, rule syntax
//!   errors.
//! - `tree.rs`: the prefix tree arena and rule insertion.
//! - `search.rs`: scored depth-first walk producing `MatchRecord`s.
//! - `visited.rs`: per-query `(node, offset)` set that keeps the walk finite.
//! - `varstack.rs`: scoped captures and their snapshots.
//! - `policy.rs` / `scoring.rs`: the two pluggable strategies.
//! - `expand.rs`: placeholder and recursive-segment substitution.
//! - `metrics.rs`: counters for verbose output.
//!
//! ## Debugging
//!
//! The engine logs through `tracing`: `debug` for rule insertion and query
//! outcomes, `trace` for every match and pruned revisit.

#[path = "engine/classifier.rs"]
pub(crate) mod classifier;
#[path = "engine/expand.rs"]
pub(crate) mod expand;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/policy.rs"]
mod policy;
#[path = "engine/scoring.rs"]
mod scoring;
#[path = "engine/search.rs"]
mod search;
#[path = "engine/tree.rs"]
mod tree;
#[path = "engine/varstack.rs"]
mod varstack;
#[path = "engine/visited.rs"]
mod visited;

#[cfg(test)]
#[path = "engine/tests.rs"]
mod tests;

pub use metrics::SearchMetrics;
pub use policy::{FuzzyMatchPolicy, MatchMode, MatchPolicy, PolicyWeights, StrictMatchPolicy};
pub use scoring::{AverageScoring, PathFlags, ScoringAlgorithm, WeakestLinkScoring, rank_by_specificity};
pub use search::MatchRecord;
pub use tree::Tree;
pub use varstack::{Binding, Bindings};
