extern crate self as chatrule;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;

pub use api::{Engine, MatchSummary, Options, Response, RuleSpec, VerboseResponse};
pub use engine::{
    AverageScoring, Binding, Bindings, FuzzyMatchPolicy, MatchMode, MatchPolicy, MatchRecord, PathFlags,
    PolicyWeights, ScoringAlgorithm, SearchMetrics, StrictMatchPolicy, Tree, WeakestLinkScoring,
    rank_by_specificity,
};
pub use error::{EngineError, ExpansionError, InputSyntaxError, Result};

use std::fmt;
use std::hash::{Hash, Hasher};

// --- Core types --------------------------------------------------------------

/// Caller-supplied identifier of a rule, reported back when the rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub u64);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for RuleId {
    fn from(id: u64) -> Self {
        RuleId(id)
    }
}

/// Word classes recognized in rule inputs. User input only ever produces
/// `Literal` words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordKind {
    /// Plain word, compared after normalization.
    Literal,
    /// `*`: exactly one arbitrary token, not captured.
    Wildcard,
    /// `**`: one or more arbitrary tokens, not captured.
    Glob,
    /// `$name`: exactly one arbitrary token, captured under `name`.
    Variable,
    /// Leading marker of a quoted rule input; consumes no token.
    ExactMarker,
}

/// A typed token.
///
/// `text` is the comparison form: lowercased for ordinary literals, as written
/// for literals of exact rules, the variable name for variables and empty for
/// the other classes. `original` is the token before case folding and is
/// never part of equality.
///
/// Literals compare by `(kind, text)`. Every other class compares by kind
/// alone, so `$a` and `$b` in the same position share one tree edge.
#[derive(Debug, Clone)]
pub struct Word {
    pub kind: WordKind,
    pub text: String,
    pub original: String,
}

impl Word {
    pub fn literal(text: impl Into<String>, original: impl Into<String>) -> Self {
        Word { kind: WordKind::Literal, text: text.into(), original: original.into() }
    }

    pub fn wildcard() -> Self {
        Word { kind: WordKind::Wildcard, text: String::new(), original: "*".to_string() }
    }

    pub fn glob() -> Self {
        Word { kind: WordKind::Glob, text: String::new(), original: "**".to_string() }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        let name = name.into();
        let original = format!("${name}");
        Word { kind: WordKind::Variable, text: name, original }
    }

    pub fn exact_marker() -> Self {
        Word { kind: WordKind::ExactMarker, text: String::new(), original: "\"".to_string() }
    }

    /// True for word classes that accept any token.
    pub fn is_open(&self) -> bool {
        matches!(self.kind, WordKind::Wildcard | WordKind::Glob | WordKind::Variable)
    }
}

impl PartialEq for Word {
    fn eq(&self, other: &Self) -> bool {
        match (self.kind, other.kind) {
            (WordKind::Literal, WordKind::Literal) => self.text == other.text,
            (a, b) => a == b,
        }
    }
}

impl Eq for Word {}

impl Hash for Word {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        if self.kind == WordKind::Literal {
            self.text.hash(state);
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WordKind::Literal => f.write_str(&self.text),
            _ => f.write_str(&self.original),
        }
    }
}

/// An output attached to the node where a rule input ends.
///
/// `variables` maps the tree depth of each variable word in the input phrase
/// that produced this output to the name that phrase used. `seq` is assigned
/// by the tree on insertion and orders outputs tree-wide.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateOutput {
    pub template: String,
    pub rule: RuleId,
    pub variables: Vec<(usize, String)>,
    pub exact: bool,
    pub seq: u64,
}

impl CandidateOutput {
    pub fn new(template: impl Into<String>, rule: RuleId) -> Self {
        CandidateOutput { template: template.into(), rule, variables: Vec::new(), exact: false, seq: 0 }
    }
}
