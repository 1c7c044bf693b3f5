//! The match tree.
//!
//! Every rule input is a word sequence; the tree shares common prefixes so
//! that one walk over the user's tokens tests all rules at once.
//!
//! ```text
//! rules:  hello world        -> "hi!"
//!         hello *            -> "hello to you"
//!         hello world again  -> "again?"
//!
//! (root)
//!   └─ hello
//!        ├─ world            [hi!]
//!        │    └─ again       [again?]
//!        └─ *                [hello to you]
//! ```
//!
//! Nodes live in an arena and are addressed by [`NodeId`]; each parent owns
//! its children through an insertion-ordered map keyed by [`Word`], so no two
//! siblings share a word and iteration order is stable. Nodes are never
//! removed; [`Tree::reset`] drops the whole arena.
//!
//! `add` takes `&mut self` and `search` takes `&self`: mutation and queries
//! are serialized by the borrow checker, and a built tree can be shared by
//! concurrent readers.

use super::classifier::is_exact;
use super::metrics::SearchMetrics;
use super::policy::{MatchPolicy, StrictMatchPolicy};
use super::scoring::{AverageScoring, ScoringAlgorithm};
use super::search::{MatchRecord, Search};
use crate::{CandidateOutput, Word, WordKind};
use indexmap::IndexMap;
use tracing::trace;

/// Index of a node in the tree arena.
pub(crate) type NodeId = usize;

pub(crate) const ROOT: NodeId = 0;

#[derive(Debug)]
pub(crate) struct Node {
    /// `None` only for the root.
    pub word: Option<Word>,
    /// Edges from the root; equals the index of `word` in its rule input + 1.
    pub depth: usize,
    pub children: IndexMap<Word, NodeId>,
    pub outputs: Vec<CandidateOutput>,
}

impl Node {
    fn new(word: Option<Word>, depth: usize) -> Self {
        Node { word, depth, children: IndexMap::new(), outputs: Vec::new() }
    }
}

pub struct Tree {
    nodes: Vec<Node>,
    next_seq: u64,
    pub(crate) policy: Box<dyn MatchPolicy>,
    pub(crate) scoring: Box<dyn ScoringAlgorithm>,
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("nodes", &self.nodes.len())
            .field("outputs", &self.output_count())
            .field("policy", &self.policy)
            .field("scoring", &self.scoring)
            .finish()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Empty tree with the strict match policy and average scoring.
    pub fn new() -> Self {
        Self::with_strategies(Box::new(StrictMatchPolicy::default()), Box::new(AverageScoring))
    }

    pub fn with_strategies(policy: Box<dyn MatchPolicy>, scoring: Box<dyn ScoringAlgorithm>) -> Self {
        Tree { nodes: vec![Node::new(None, 0)], next_seq: 0, policy, scoring }
    }

    /// Insert `words`, reusing existing edges, and attach `output` to the
    /// node where the sequence ends.
    ///
    /// The tree fills in the output's variable names, exact flag and
    /// insertion sequence. An empty sequence is ignored (the root never
    /// carries outputs).
    pub fn add(&mut self, words: &[Word], mut output: CandidateOutput) {
        if words.is_empty() {
            return;
        }

        let mut current = ROOT;
        for word in words {
            current = self.child_or_insert(current, word);
        }

        output.variables = words
            .iter()
            .enumerate()
            .filter(|(_, w)| w.kind == WordKind::Variable)
            .map(|(idx, w)| (idx + 1, w.text.clone()))
            .collect();
        output.exact = is_exact(words);
        output.seq = self.next_seq;
        self.next_seq += 1;

        trace!(node = current, rule = %output.rule, seq = output.seq, "output attached");
        self.nodes[current].outputs.push(output);
    }

    fn child_or_insert(&mut self, parent: NodeId, word: &Word) -> NodeId {
        if let Some(&child) = self.nodes[parent].children.get(word) {
            return child;
        }
        let id = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(Node::new(Some(word.clone()), depth));
        self.nodes[parent].children.insert(word.clone(), id);
        id
    }

    /// All complete matches for `tokens`, best first.
    pub fn search(&self, tokens: &[Word]) -> Vec<MatchRecord> {
        self.search_with_metrics(tokens).0
    }

    pub fn search_with_metrics(&self, tokens: &[Word]) -> (Vec<MatchRecord>, SearchMetrics) {
        Search::new(self, tokens).run()
    }

    /// Drop every node and output, keeping the strategies.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::new(None, 0));
        self.next_seq = 0;
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn output_count(&self) -> usize {
        self.nodes.iter().map(|n| n.outputs.len()).sum()
    }
}
