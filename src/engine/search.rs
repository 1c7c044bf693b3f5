//! Scored depth-first search.
//!
//! This module is the operational core of the engine: it walks the match tree
//! against the user's tokens and records every rule input that consumes the
//! whole input.
//!
//! ## Key concepts
//!
//! - **State**: `(node, offset)`, a tree position plus the number of tokens
//!   consumed so far.
//! - **Edge**: a child word. Literals ask the match policy; `*` and `$var`
//!   take one token unconditionally; `**` takes one token and may stay put to
//!   take more; the exact marker takes none and switches literals to verbatim
//!   comparison.
//! - **End word**: a state with `offset == tokens.len()` on a node carrying
//!   outputs. Each output there becomes a [`MatchRecord`].
//!
//! ## Walk
//!
//! The walk is depth-first but driven by an explicit work stack, so its
//! memory grows on the heap with the input instead of on the call stack.
//!
//! ```text
//! pending: [.., Enter(state, edge)]
//!
//! Enter(state, edge)
//!   ├─ push edge weight [and capture]
//!   ├─ loop detector: no better than an earlier arrival? -> unwind, prune
//!   ├─ end word?      -> keep records (score + bindings snapshot)
//!   ├─ push Leave(heights before the edge)
//!   └─ push Enter for each matching child edge (and the ** self edge),
//!      reversed so the first child is walked first
//!
//! Leave(heights)
//!   └─ truncate weights and variable stack back to the heights
//! ```
//!
//! Weights and captures are unwound to recorded heights rather than popped
//! one by one, so every exit from a branch (match, dead end, prune) leaves
//! both stacks describing the current path. All per-query state lives in
//! [`Search`] and is dropped when the query ends.

use super::metrics::SearchMetrics;
use super::policy::MatchMode;
use super::scoring::PathFlags;
use super::tree::{NodeId, ROOT, Tree};
use super::varstack::{Bindings, VarStack};
use super::visited::LoopDetector;
use crate::{CandidateOutput, Word, WordKind};
use indexmap::IndexMap;
use std::time::Instant;
use tracing::{debug, trace};

/// One complete match: the output it reached, how well it matched and what it
/// captured.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub score: f32,
    pub output: CandidateOutput,
    /// Captures, named as in the input phrase that produced `output`.
    pub bindings: Bindings,
    pub flags: PathFlags,
    /// Literal edges before the first open word.
    pub literal_prefix: usize,
    /// Edge weights, one per consumed token.
    pub weights: Vec<f32>,
}

/// Path-local facts carried down the walk by value.
#[derive(Debug, Clone, Copy)]
struct PathState {
    flags: PathFlags,
    literal_prefix: usize,
    mode: MatchMode,
    depth: usize,
}

impl PathState {
    fn start() -> Self {
        PathState { flags: PathFlags::empty(), literal_prefix: 0, mode: MatchMode::Normal, depth: 0 }
    }

    fn exact(self) -> Self {
        PathState { flags: self.flags | PathFlags::EXACT, mode: MatchMode::Verbatim, depth: self.depth + 1, ..self }
    }

    /// State after consuming one token through an edge of `kind`.
    fn through(self, kind: WordKind) -> Self {
        let mut next = PathState { depth: self.depth + 1, ..self };
        match kind {
            WordKind::Literal if !self.flags.intersects(PathFlags::OPEN) => next.literal_prefix += 1,
            WordKind::Wildcard => next.flags |= PathFlags::HAS_WILDCARD,
            WordKind::Glob => next.flags |= PathFlags::HAS_GLOB,
            WordKind::Variable => next.flags |= PathFlags::HAS_VARIABLE,
            _ => {}
        }
        next
    }
}

/// What crossing an edge adds to the path. `None` for the zero-width exact
/// marker.
#[derive(Debug, Clone, Copy)]
struct Crossing<'t> {
    weight: f32,
    /// `(name, value)` for variable edges.
    capture: Option<(&'t str, &'t str)>,
}

#[derive(Debug)]
enum Step<'t> {
    Enter { node: NodeId, offset: usize, path: PathState, crossing: Option<Crossing<'t>> },
    Leave { weights: usize, captures: usize },
}

pub(crate) struct Search<'t> {
    tree: &'t Tree,
    tokens: &'t [Word],
    pending: Vec<Step<'t>>,
    stack: VarStack,
    weights: Vec<f32>,
    visited: LoopDetector,
    /// Records per end node; a better arrival at the same end replaces them.
    finished: IndexMap<NodeId, Vec<MatchRecord>>,
    metrics: SearchMetrics,
}

impl<'t> Search<'t> {
    pub fn new(tree: &'t Tree, tokens: &'t [Word]) -> Self {
        Search {
            tree,
            tokens,
            pending: Vec::new(),
            stack: VarStack::new(),
            weights: Vec::with_capacity(tokens.len()),
            visited: LoopDetector::new(),
            finished: IndexMap::new(),
            metrics: SearchMetrics { tokens: tokens.len(), ..SearchMetrics::default() },
        }
    }

    /// Run the search and return ranked records with metrics.
    pub fn run(mut self) -> (Vec<MatchRecord>, SearchMetrics) {
        let start = Instant::now();

        if !self.tokens.is_empty() {
            self.pending.push(Step::Enter { node: ROOT, offset: 0, path: PathState::start(), crossing: None });
        }
        while let Some(step) = self.pending.pop() {
            match step {
                Step::Enter { node, offset, path, crossing } => self.enter(node, offset, path, crossing),
                Step::Leave { weights, captures } => self.unwind(weights, captures),
            }
        }
        debug_assert_eq!(self.stack.len(), 0);

        let tree = self.tree;
        let mut records: Vec<MatchRecord> = self.finished.into_values().flatten().collect();
        records.sort_by(|a, b| tree.scoring.compare(a, b));

        self.metrics.nodes_visited = self.visited.len();
        self.metrics.matches = records.len();
        self.metrics.total = start.elapsed();
        debug!(
            tokens = self.metrics.tokens,
            matches = self.metrics.matches,
            visited = self.metrics.nodes_visited,
            pruned = self.metrics.loops_pruned,
            "search finished"
        );
        (records, self.metrics)
    }

    fn enter(&mut self, id: NodeId, offset: usize, path: PathState, crossing: Option<Crossing<'t>>) {
        let heights = (self.weights.len(), self.stack.len());
        if let Some(crossing) = crossing {
            self.weights.push(crossing.weight);
            if let Some((name, value)) = crossing.capture {
                self.stack.push(name, value, crossing.weight, self.tree.node(id).depth);
            }
        }

        let partial = self.tree.scoring.score(&self.weights);
        if !self.visited.enter(id, offset, partial) {
            self.metrics.loops_pruned += 1;
            trace!(node = id, offset, partial, "revisit pruned");
            self.unwind(heights.0, heights.1);
            return;
        }
        self.metrics.max_depth = self.metrics.max_depth.max(path.depth);

        if offset == self.tokens.len() {
            self.end_word(id, path);
        }

        self.pending.push(Step::Leave { weights: heights.0, captures: heights.1 });
        let first = self.pending.len();

        let tree = self.tree;
        let node = tree.node(id);
        for (word, &child) in &node.children {
            self.schedule(word, child, offset, path);
        }
        if let Some(word) = node.word.as_ref().filter(|w| w.kind == WordKind::Glob) {
            self.schedule(word, id, offset, path);
        }

        self.pending[first..].reverse();
    }

    fn unwind(&mut self, weights: usize, captures: usize) {
        self.weights.truncate(weights);
        self.stack.truncate(captures);
    }

    /// Queue the edge `word` into `target` if it can be crossed from `offset`.
    fn schedule(&mut self, word: &'t Word, target: NodeId, offset: usize, path: PathState) {
        if word.kind == WordKind::ExactMarker {
            if offset == 0 {
                self.pending.push(Step::Enter { node: target, offset, path: path.exact(), crossing: None });
            }
            return;
        }

        let Some(token) = self.tokens.get(offset) else {
            return;
        };
        let Some(weight) = self.tree.policy.weight(word, token, path.mode) else {
            return;
        };

        let capture = (word.kind == WordKind::Variable).then(|| (word.text.as_str(), token.original.as_str()));
        self.pending.push(Step::Enter {
            node: target,
            offset: offset + 1,
            path: path.through(word.kind),
            crossing: Some(Crossing { weight, capture }),
        });
    }

    fn end_word(&mut self, id: NodeId, path: PathState) {
        let tree = self.tree;
        let node = tree.node(id);
        if node.outputs.is_empty() {
            return;
        }

        let score = tree.scoring.score(&self.weights);
        let snapshot = self.stack.snapshot();

        let records = node
            .outputs
            .iter()
            .map(|output| {
                trace!(rule = %output.rule, seq = output.seq, score, "match");
                MatchRecord {
                    score,
                    output: output.clone(),
                    bindings: snapshot.renamed(&output.variables),
                    flags: path.flags,
                    literal_prefix: path.literal_prefix,
                    weights: self.weights.clone(),
                }
            })
            .collect();
        self.finished.insert(id, records);
    }
}
