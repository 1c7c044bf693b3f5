//! Error types.
//!
//! Only rule-authoring mistakes and a fully failed query reach the caller.
//! Conditions local to one traversal branch (no match, a pruned revisit, one
//! candidate failing to expand) are recovered inside the engine.

use crate::RuleId;
use thiserror::Error;

/// Why a rule input phrase could not be turned into a word sequence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputSyntaxError {
    /// The phrase contains no words after symbol filtering.
    #[error("phrase has no words")]
    Empty,

    /// A double quote appears somewhere other than around the whole phrase.
    #[error("quote at byte {0} does not wrap the whole phrase")]
    MisplacedQuote(usize),

    /// The phrase is quoted but nothing is inside the quotes.
    #[error("exact phrase is empty")]
    EmptyExactPhrase,

    /// A `$` marker without a valid variable name after it.
    #[error("invalid variable marker '{0}'")]
    InvalidVariable(String),

    /// A `*` that is neither a standalone `*` nor `**`.
    #[error("wildcard '{0}' must be a standalone * or **")]
    InvalidWildcard(String),
}

/// Why an output template could not be expanded for a match.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    /// The template references a variable the matched path never bound.
    #[error("variable '${0}' is not bound")]
    UnboundVariable(String),

    /// A `{{ ... }}` segment found no rule to answer it.
    #[error("no rule matches recursive input '{0}'")]
    NoRecursiveMatch(String),

    /// Recursive `{{ ... }}` lookups nested deeper than allowed.
    #[error("recursive response exceeded depth {0}")]
    RecursionLimit(usize),
}

/// Errors surfaced by [`Engine`](crate::Engine).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("rule {rule}: malformed input '{phrase}': {source}")]
    MalformedRuleInput { rule: RuleId, phrase: String, source: InputSyntaxError },

    /// Every ranked candidate failed to expand; carries the best one's error.
    #[error("no candidate output could be expanded: {0}")]
    Expansion(#[from] ExpansionError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
