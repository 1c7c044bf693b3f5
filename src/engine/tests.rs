use crate::engine::classifier::{tokenize_rule_input, tokenize_user_input};
use crate::engine::{AverageScoring, FuzzyMatchPolicy, PathFlags, Tree, WeakestLinkScoring};
use crate::{CandidateOutput, Engine, EngineError, ExpansionError, Options, RuleId};

fn engine(rules: &[(u64, &str, &str)]) -> Engine {
    let mut engine = Engine::new();
    for (id, input, output) in rules {
        engine.add_rule(RuleId(*id), &[*input], &[*output]).unwrap();
    }
    engine
}

#[test]
fn literal_query_hits_max_score() {
    let cases: Vec<&str> = vec!["hello", "how are you", "what is your name", "tell me a joke please"];

    for phrase in cases {
        let mut tree = Tree::new();
        let words = tokenize_rule_input(phrase).unwrap();
        tree.add(&words, CandidateOutput::new("ok", RuleId(1)));
        tree.add(&tokenize_rule_input("*").unwrap(), CandidateOutput::new("any", RuleId(2)));

        let records = tree.search(&tokenize_user_input(phrase));
        assert_eq!(records[0].output.rule, RuleId(1), "phrase: {phrase}");
        assert_eq!(records[0].score, 1.0, "phrase: {phrase}");
    }
}

#[test]
fn literal_beats_wildcard() {
    let engine = engine(&[(1, "hello *", "wild"), (2, "hello world", "literal")]);

    assert_eq!(engine.responses("hello world"), vec!["literal", "wild"]);
    let reply = engine.response("hello world").unwrap();
    assert_eq!(reply.matched, vec![RuleId(2)]);
    assert_eq!(engine.response("hello there").unwrap().text, "wild");
}

#[test]
fn variable_substitution_follows_the_token() {
    let engine = engine(&[(1, "my name is $name", "Nice to meet you, $name. Bye $name!")]);

    let ann = engine.response("my name is Ann").unwrap();
    let bob = engine.response("my name is Bob").unwrap();
    assert_eq!(ann.text, "Nice to meet you, Ann. Bye Ann!");
    assert_eq!(bob.text, "Nice to meet you, Bob. Bye Bob!");
    assert_eq!(ann.matched, bob.matched);
}

#[test]
fn merged_variable_nodes_keep_rule_names() {
    let engine = engine(&[(1, "i like $food", "mmm $food"), (2, "i like $thing", "why $thing?")]);

    assert_eq!(engine.responses("I like pizza"), vec!["mmm pizza", "why pizza?"]);
}

#[test]
fn exact_rule_requires_full_verbatim_match() {
    let engine = engine(&[(1, "\"exact phrase\"", "exact")]);

    assert_eq!(engine.response("exact phrase").unwrap().text, "exact");
    assert!(!engine.response("exact phrase extra").unwrap().is_match());
    assert!(!engine.response("Exact Phrase").unwrap().is_match());
}

#[test]
fn exact_rule_ranks_above_equal_plain_rule() {
    let engine = engine(&[(1, "good night", "plain"), (2, "\"good night\"", "quoted")]);

    assert_eq!(engine.responses("good night"), vec!["quoted", "plain"]);
    assert_eq!(engine.responses("Good night"), vec!["plain"]);
}

#[test]
fn longer_literal_prefix_breaks_ties() {
    let engine = engine(&[(1, "* what $x", "late $x"), (2, "what * $x", "early $x")]);

    // Same weights in a different order: the literal-first path wins.
    assert_eq!(engine.responses("what what love"), vec!["early love", "late love"]);
}

#[test]
fn earliest_output_wins_full_ties() {
    let mut engine = Engine::new();
    engine.add_rule(RuleId(1), &["hi"], &["first", "second"]).unwrap();
    engine.add_rule(RuleId(2), &["hi"], &["third"]).unwrap();

    assert_eq!(engine.responses("hi"), vec!["first", "second", "third"]);
    assert_eq!(engine.response("hi").unwrap().text, "first");
}

#[test]
fn multiple_inputs_share_outputs() {
    let mut engine = Engine::new();
    engine.add_rule(RuleId(4), &["hi", "hey there", "good * to you"], &["hello!"]).unwrap();

    for input in ["hi", "hey there", "good day to you"] {
        let reply = engine.response(input).unwrap();
        assert_eq!(reply.text, "hello!", "input: {input}");
        assert_eq!(reply.matched, vec![RuleId(4)]);
    }
}

#[test]
fn repeated_queries_are_identical() {
    let engine = engine(&[(1, "hello *", "a"), (2, "hello world", "b"), (3, "** world", "c"), (4, "$x $y", "d $x")]);

    let first = engine.responses("hello world");
    for _ in 0..5 {
        assert_eq!(engine.responses("hello world"), first);
    }
    assert_eq!(first, vec!["b", "a", "d hello", "c"]);
}

#[test]
fn empty_input_is_not_an_error() {
    let engine = engine(&[(1, "hello", "hi"), (2, "**", "anything")]);

    assert!(engine.responses("").is_empty());
    assert!(engine.responses(" ?! ").is_empty());
    assert_eq!(engine.response("").unwrap(), crate::Response::no_match());
}

#[test]
fn unbound_variable_falls_back_to_next_candidate() {
    let engine = engine(&[(1, "hello", "hi $name"), (2, "*", "fallback")]);

    let reply = engine.response("hello").unwrap();
    assert_eq!(reply.text, "fallback");
    assert_eq!(reply.matched, vec![RuleId(2)]);
}

#[test]
fn all_candidates_failing_is_an_error() {
    let engine = engine(&[(1, "hello", "hi $name"), (2, "*", "yo $nick")]);

    assert_eq!(
        engine.response("hello"),
        Err(EngineError::Expansion(ExpansionError::UnboundVariable("name".to_string())))
    );
    assert!(engine.responses("hello").is_empty());
}

#[test]
fn recursive_outputs_chain_rules() {
    let engine = engine(&[
        (1, "hi", "{{ hello }}"),
        (2, "hello", "Hello there!"),
        (3, "weather in $city", "Sunny in $city."),
        (4, "is it nice in $place", "Let me check. {{ weather in $place }}"),
    ]);

    let reply = engine.response("hi").unwrap();
    assert_eq!(reply.text, "Hello there!");
    assert_eq!(reply.matched, vec![RuleId(1), RuleId(2)]);

    let reply = engine.response("is it nice in Rome?").unwrap();
    assert_eq!(reply.text, "Let me check. Sunny in Rome.");
    assert_eq!(reply.matched, vec![RuleId(4), RuleId(3)]);
}

#[test]
fn self_referencing_outputs_hit_the_depth_limit() {
    let options = Options { max_recursion_depth: 3, ..Options::default() };
    let mut engine = Engine::with_options(options);
    engine.add_rule(RuleId(1), &["ping"], &["{{ pong }}"]).unwrap();
    engine.add_rule(RuleId(2), &["pong"], &["{{ ping }}"]).unwrap();

    assert_eq!(engine.response("ping"), Err(EngineError::Expansion(ExpansionError::RecursionLimit(3))));
}

#[test]
fn recursive_segment_without_match_skips_candidate() {
    let engine = engine(&[(1, "hi", "{{ nobody answers this }}"), (2, "*", "plain hi")]);

    assert_eq!(engine.response("hi").unwrap().text, "plain hi");
}

#[test]
fn convergent_glob_paths_terminate() {
    // Long shared prefix with glob-heavy suffixes: every split of the input
    // among the globs converges on the same (node, offset) states.
    let prefix = (0..40).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
    let mut tree = Tree::new();
    for suffix in ["** ** **", "** * **", "** $x ** **", "* ** *"] {
        let words = tokenize_rule_input(&format!("{prefix} {suffix}")).unwrap();
        tree.add(&words, CandidateOutput::new(suffix, RuleId(1)));
    }

    let query = format!("{prefix} {}", (0..30).map(|i| format!("t{i}")).collect::<Vec<_>>().join(" "));
    let (records, metrics) = tree.search_with_metrics(&tokenize_user_input(&query));

    assert_eq!(records.len(), 4);
    assert!(metrics.loops_pruned > 0);
    // Each state is explored once: bounded by nodes * (tokens + 1).
    assert!(metrics.nodes_visited <= tree.node_count() * (metrics.tokens + 1));
    assert!(records.iter().all(|r| r.flags.intersects(PathFlags::OPEN)));
}

#[test]
fn glob_captures_around_variables() {
    let engine = engine(&[(1, "** my name is $name **", "Hello $name")]);

    assert_eq!(engine.response("well hi my name is Ann nice to meet you").unwrap().text, "Hello Ann");
    assert!(!engine.response("my name is Ann").unwrap().is_match());
}

#[test]
fn search_does_not_mutate_tree() {
    let engine = engine(&[(1, "hello *", "a"), (2, "** world", "b")]);
    let nodes = engine.tree().node_count();
    let outputs = engine.tree().output_count();

    let _ = engine.responses("hello world");
    let _ = engine.response_verbose("hello big world");

    assert_eq!(engine.tree().node_count(), nodes);
    assert_eq!(engine.tree().output_count(), outputs);
}

#[test]
fn fuzzy_policy_tolerates_typos() {
    let mut engine = Engine::with_strategies(Options::default(), FuzzyMatchPolicy::default(), WeakestLinkScoring);
    engine.add_rule(RuleId(1), &["what is the weather"], &["sunny"]).unwrap();
    engine.add_rule(RuleId(2), &["what is the *"], &["no idea"]).unwrap();

    assert_eq!(engine.response("what is the wether").unwrap().text, "sunny");
    assert_eq!(engine.response("what is the time").unwrap().text, "no idea");
    assert_eq!(engine.responses("what is the weather"), vec!["sunny", "no idea"]);
}

#[test]
fn engine_is_shareable_across_threads() {
    let engine = std::sync::Arc::new(engine(&[(1, "hello $who", "hi $who")]));

    let handles: Vec<_> = ["ann", "bob", "cy"]
        .into_iter()
        .map(|name| {
            let engine = std::sync::Arc::clone(&engine);
            std::thread::spawn(move || engine.response(&format!("hello {name}")).unwrap().text)
        })
        .collect();

    let replies: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(replies, vec!["hi ann", "hi bob", "hi cy"]);
}

#[test]
fn only_the_best_candidate_error_is_reported() {
    let engine = engine(&[(1, "*", "yo $nick"), (2, "**", "{{ nobody answers this }}"), (3, "hello", "hi $name")]);

    let expected = EngineError::Expansion(ExpansionError::UnboundVariable("name".to_string()));
    assert_eq!(engine.response("hello"), Err(expected.clone()));

    let verbose = engine.response_verbose("hello");
    assert_eq!(verbose.response, Err(expected));
    let rules: Vec<RuleId> = verbose.ranked.iter().map(|m| m.rule).collect();
    assert_eq!(rules, vec![RuleId(3), RuleId(1), RuleId(2)]);
    assert!(verbose.ranked.iter().all(|m| m.expanded.is_err()));
}

#[test]
fn huge_input_is_answered() {
    let engine = engine(&[(1, "**", "that is a lot"), (2, "** $last", "ends with $last")]);
    let input = format!("{} done", vec!["word"; 10_000].join(" "));

    let reply = engine.response(&input).unwrap();
    assert_eq!(reply.text, "ends with done");
    assert_eq!(engine.responses(&input), vec!["ends with done", "that is a lot"]);
}

#[test]
fn pruning_keeps_the_best_split() {
    let mut engine = Engine::with_strategies(Options::default(), FuzzyMatchPolicy::default(), AverageScoring);
    engine.add_rule(RuleId(1), &["** hello ** $w"], &["got $w"]).unwrap();

    let verbose = engine.response_verbose("a helo hello b c");
    assert_eq!(verbose.ranked.len(), 1);
    assert!((verbose.ranked[0].score - 0.66).abs() < 1e-6, "score: {}", verbose.ranked[0].score);
    assert_eq!(verbose.ranked[0].bindings, vec![("w".to_string(), "c".to_string())]);
    assert_eq!(verbose.response.unwrap().text, "got c");
}

#[test]
fn strict_pruning_matches_unpruned_scores() {
    // Every split of the input among the globs scores the same, so the one
    // record left per output carries that score.
    let engine = engine(&[(1, "** $x ** end", "x=$x"), (2, "** ** **", "three")]);

    let verbose = engine.response_verbose("a b c d end");
    assert!(verbose.metrics.loops_pruned > 0);
    let scores: Vec<f32> = verbose.ranked.iter().map(|m| m.score).collect();
    assert_eq!(verbose.ranked.len(), 2);
    assert!((scores[0] - (0.5 * 3.0 + 0.8 + 1.0) / 5.0).abs() < 1e-6);
    assert!((scores[1] - 0.5).abs() < 1e-6);
    assert_eq!(verbose.ranked[0].bindings, vec![("x".to_string(), "b".to_string())]);
}

#[test]
fn fuzzy_short_words_need_exact_spelling() {
    let mut engine = Engine::with_strategies(Options::default(), FuzzyMatchPolicy::default(), AverageScoring);
    engine.add_rule(RuleId(1), &["i am $name"], &["hi $name"]).unwrap();

    assert!(!engine.response("u am bob").unwrap().is_match());
    assert!(!engine.response("i an bob").unwrap().is_match());
    assert_eq!(engine.response("I am Bob").unwrap().text, "hi Bob");
}

