//! Search metrics.
//!
//! Counters collected by every search. They are cheap (a few integers and one
//! timer) so they are always on; callers that want them use
//! `Tree::search_with_metrics` or the verbose engine API.

use std::time::Duration;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SearchMetrics {
    /// Elapsed time of the traversal, including ranking.
    pub total: Duration,
    /// Number of user tokens searched.
    pub tokens: usize,
    /// Distinct `(node, offset)` states explored.
    pub nodes_visited: usize,
    /// Revisits refused by the loop detector.
    pub loops_pruned: usize,
    /// Completed matches (one per candidate output).
    pub matches: usize,
    /// Deepest recursion reached, in edges from the root.
    pub max_depth: usize,
}
