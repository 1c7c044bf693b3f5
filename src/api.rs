use crate::engine::classifier::{tokenize_rule_input, tokenize_user_input};
use crate::engine::expand::expand_with;
use crate::engine::{
    AverageScoring, MatchPolicy, MatchRecord, PathFlags, PolicyWeights, ScoringAlgorithm, SearchMetrics,
    StrictMatchPolicy, Tree,
};
use crate::error::{EngineError, ExpansionError, Result};
use crate::{CandidateOutput, RuleId, Word};
use tracing::debug;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// How deep `{{ ... }}` outputs may nest before a candidate is rejected.
    pub max_recursion_depth: usize,
    /// Edge weights for the default match policy.
    pub weights: PolicyWeights,
}

impl Default for Options {
    fn default() -> Self {
        Options { max_recursion_depth: 8, weights: PolicyWeights::default() }
    }
}

/// A rule as handed over by the rule store: several input phrases sharing the
/// same set of outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub id: RuleId,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl RuleSpec {
    pub fn new<S: AsRef<str>>(id: RuleId, inputs: &[S], outputs: &[S]) -> Self {
        RuleSpec {
            id,
            inputs: inputs.iter().map(|s| s.as_ref().to_string()).collect(),
            outputs: outputs.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }
}

/// Reply to one user input.
///
/// `matched` lists the rule that fired first, followed by rules reached
/// through recursive `{{ ... }}` outputs. An empty list means nothing matched
/// and the caller should use its own fallback reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub text: String,
    pub matched: Vec<RuleId>,
}

impl Response {
    pub fn no_match() -> Self {
        Self::default()
    }

    pub fn is_match(&self) -> bool {
        !self.matched.is_empty()
    }
}

/// A ranked match in verbose output.
#[derive(Debug, Clone)]
pub struct MatchSummary {
    pub rule: RuleId,
    pub template: String,
    pub score: f32,
    pub flags: PathFlags,
    pub bindings: Vec<(String, String)>,
    /// Expanded reply, or why expansion failed.
    pub expanded: std::result::Result<String, ExpansionError>,
}

/// Result of [`Engine::response_verbose`].
#[derive(Debug, Clone)]
pub struct VerboseResponse {
    pub input: String,
    pub tokens: Vec<String>,
    pub response: Result<Response>,
    /// Every match, best first.
    pub ranked: Vec<MatchSummary>,
    pub metrics: SearchMetrics,
}

/// Rule-based response engine.
///
/// Build it by adding rules, then query it. Adding takes `&mut self` and
/// querying `&self`, so a built engine can be shared by concurrent readers
/// while any edit goes through exclusive access.
///
/// # Example
/// ```
/// use chatrule::{Engine, RuleId};
///
/// let mut engine = Engine::new();
/// engine.add_rule(RuleId(1), &["my name is $name"], &["Nice to meet you, $name!"]).unwrap();
///
/// let reply = engine.response("My name is Ann").unwrap();
/// assert_eq!(reply.text, "Nice to meet you, Ann!");
/// ```
#[derive(Debug)]
pub struct Engine {
    tree: Tree,
    options: Options,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        let policy = StrictMatchPolicy::new(options.weights);
        Self::with_strategies(options, policy, AverageScoring)
    }

    /// Engine with custom strategies. `options.weights` only feeds the default
    /// policy, so a custom `policy` carries its own weights.
    pub fn with_strategies(
        options: Options,
        policy: impl MatchPolicy + 'static,
        scoring: impl ScoringAlgorithm + 'static,
    ) -> Self {
        Engine { tree: Tree::with_strategies(Box::new(policy), Box::new(scoring)), options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Add a rule. Every input phrase gets every output as a candidate.
    ///
    /// All inputs are checked before anything is inserted: one malformed
    /// phrase rejects the whole rule.
    pub fn add_rule<S: AsRef<str>>(&mut self, id: RuleId, inputs: &[S], outputs: &[S]) -> Result<()> {
        let parsed = parse_inputs(id, inputs)?;
        self.insert(id, &parsed, outputs);
        Ok(())
    }

    fn insert<S: AsRef<str>>(&mut self, id: RuleId, inputs: &[Vec<Word>], outputs: &[S]) {
        for words in inputs {
            for output in outputs {
                self.tree.add(words, CandidateOutput::new(output.as_ref(), id));
            }
        }
        debug!(rule = %id, inputs = inputs.len(), outputs = outputs.len(), "rule added");
    }

    /// Replace every rule with `rules`.
    ///
    /// The new rule set is validated first; on error the engine keeps its
    /// current rules.
    pub fn rebuild<I>(&mut self, rules: I) -> Result<()>
    where
        I: IntoIterator<Item = RuleSpec>,
    {
        let mut parsed = Vec::new();
        for rule in rules {
            let inputs = parse_inputs(rule.id, rule.inputs.as_slice())?;
            parsed.push((rule, inputs));
        }

        self.tree.reset();
        for (rule, inputs) in &parsed {
            self.insert(rule.id, inputs, rule.outputs.as_slice());
        }
        debug!(rules = parsed.len(), nodes = self.tree.node_count(), "rules rebuilt");
        Ok(())
    }

    /// Best reply for `input`.
    ///
    /// Candidates are tried best first; one whose output cannot be expanded
    /// is skipped. An error is returned only when matches exist and none of
    /// them expands.
    pub fn response(&self, input: &str) -> Result<Response> {
        Ok(self.resolve(input, 0)?)
    }

    /// Every expandable reply for `input`, best first.
    pub fn responses(&self, input: &str) -> Vec<String> {
        let tokens = tokenize_user_input(input);
        self.tree
            .search(&tokens)
            .iter()
            .filter_map(|record| self.expand_record(record, 0).ok())
            .map(|response| response.text)
            .collect()
    }

    /// Like [`response`](Self::response), with the ranked match list and
    /// search metrics.
    pub fn response_verbose(&self, input: &str) -> VerboseResponse {
        let tokens = tokenize_user_input(input);
        let (records, metrics) = self.tree.search_with_metrics(&tokens);

        let expansions: Vec<_> = records.iter().map(|record| self.expand_record(record, 0)).collect();

        let response = match (expansions.iter().find_map(|e| e.as_ref().ok()), expansions.first()) {
            (Some(best), _) => Ok(best.clone()),
            (None, Some(Err(err))) => Err(EngineError::from(err.clone())),
            _ => Ok(Response::no_match()),
        };

        let ranked = records
            .iter()
            .zip(expansions)
            .map(|(record, expansion)| MatchSummary {
                rule: record.output.rule,
                template: record.output.template.clone(),
                score: record.score,
                flags: record.flags,
                bindings: record.bindings.iter().map(|b| (b.name.clone(), b.value.clone())).collect(),
                expanded: expansion.map(|r| r.text),
            })
            .collect();

        VerboseResponse {
            input: input.to_string(),
            tokens: tokens.iter().map(|w| w.text.clone()).collect(),
            response,
            ranked,
            metrics,
        }
    }

    fn resolve(&self, input: &str, depth: usize) -> std::result::Result<Response, ExpansionError> {
        let tokens = tokenize_user_input(input);
        if tokens.is_empty() {
            return Ok(Response::no_match());
        }

        let records = self.tree.search(&tokens);
        let mut first_error = None;

        for record in &records {
            match self.expand_record(record, depth) {
                Ok(response) => {
                    debug!(input, rule = %record.output.rule, score = record.score, depth, "response selected");
                    return Ok(response);
                }
                Err(err) => {
                    debug!(input, rule = %record.output.rule, error = %err, "candidate skipped");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                debug!(input, "no match");
                Ok(Response::no_match())
            }
        }
    }

    fn expand_record(&self, record: &MatchRecord, depth: usize) -> std::result::Result<Response, ExpansionError> {
        let mut matched = vec![record.output.rule];
        let max_depth = self.options.max_recursion_depth;

        let text = expand_with(&record.output.template, &record.bindings, |inner| {
            if depth >= max_depth {
                return Err(ExpansionError::RecursionLimit(max_depth));
            }
            let nested = self.resolve(inner, depth + 1)?;
            if !nested.is_match() {
                return Err(ExpansionError::NoRecursiveMatch(inner.to_string()));
            }
            matched.extend(nested.matched);
            Ok(nested.text)
        })?;

        Ok(Response { text, matched })
    }
}

fn parse_inputs<S: AsRef<str>>(id: RuleId, inputs: &[S]) -> Result<Vec<Vec<Word>>> {
    inputs
        .iter()
        .map(|phrase| {
            tokenize_rule_input(phrase.as_ref()).map_err(|source| EngineError::MalformedRuleInput {
                rule: id,
                phrase: phrase.as_ref().to_string(),
                source,
            })
        })
        .collect()
}
