mod debug_report;

use chatrule::{AverageScoring, Engine, FuzzyMatchPolicy, Options, RuleId, StrictMatchPolicy, WeakestLinkScoring};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::{self, IsTerminal, Read};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CHATRULE_LOG";
const DEFAULT_LOG: &str = "chatrule=warn";
const RULE_SEPARATOR: &str = "=>";

fn main() {
    init_tracing();

    let matches = command().get_matches();
    let config = match CliConfig::from_matches(&matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let engine = match config.build_engine() {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };

    let verbose = engine.response_verbose(&config.input);
    debug_report::print_run(&verbose, config.show_all, config.color);

    if verbose.response.is_err() {
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn command() -> Command {
    Command::new("chatrule")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Match an input against rules and print the ranked replies")
        .arg(
            Arg::new("rule")
                .short('r')
                .long("rule")
                .value_name("INPUT => OUTPUT")
                .help("Rule to load; repeat for more. Rules are numbered from 1 in order")
                .action(ArgAction::Append),
        )
        .arg(Arg::new("fuzzy").long("fuzzy").help("Tolerate small typos in literals").action(ArgAction::SetTrue))
        .arg(
            Arg::new("scoring")
                .long("scoring")
                .value_name("ALGORITHM")
                .help("How edge weights combine into a score")
                .value_parser(["average", "weakest"])
                .default_value("average"),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .help("List every ranked match, not just the top five")
                .action(ArgAction::SetTrue),
        )
        .arg(Arg::new("color").long("color").help("Force ANSI color output").action(ArgAction::SetTrue))
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable ANSI color output")
                .action(ArgAction::SetTrue)
                .overrides_with("color"),
        )
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .help("Text to match; read from stdin when omitted")
                .num_args(1..)
                .trailing_var_arg(true),
        )
}

#[derive(Debug)]
struct CliConfig {
    rules: Vec<(String, String)>,
    input: String,
    fuzzy: bool,
    weakest: bool,
    show_all: bool,
    color: bool,
}

impl CliConfig {
    fn from_matches(matches: &ArgMatches) -> Result<Self, String> {
        let rules = matches
            .get_many::<String>("rule")
            .unwrap_or_default()
            .map(|rule| split_rule(rule))
            .collect::<Result<Vec<_>, _>>()?;

        let input = match matches.get_many::<String>("input") {
            Some(words) => words.map(String::as_str).collect::<Vec<_>>().join(" "),
            None => read_stdin_input()?,
        };
        if input.trim().is_empty() {
            return Err("error: no input provided".to_string());
        }

        let color = if matches.get_flag("no-color") {
            false
        } else {
            matches.get_flag("color") || io::stdout().is_terminal()
        };

        Ok(CliConfig {
            rules,
            input,
            fuzzy: matches.get_flag("fuzzy"),
            weakest: matches.get_one::<String>("scoring").is_some_and(|s| s == "weakest"),
            show_all: matches.get_flag("all"),
            color,
        })
    }

    fn build_engine(&self) -> chatrule::Result<Engine> {
        let options = Options::default();
        let weights = options.weights;
        let mut engine = match (self.fuzzy, self.weakest) {
            (false, false) => Engine::with_options(options),
            (false, true) => Engine::with_strategies(options, StrictMatchPolicy::new(weights), WeakestLinkScoring),
            (true, false) => Engine::with_strategies(options, FuzzyMatchPolicy::new(weights), AverageScoring),
            (true, true) => Engine::with_strategies(options, FuzzyMatchPolicy::new(weights), WeakestLinkScoring),
        };

        for (idx, (input, output)) in self.rules.iter().enumerate() {
            engine.add_rule(RuleId(idx as u64 + 1), &[input.as_str()], &[output.as_str()])?;
        }
        Ok(engine)
    }
}

fn split_rule(rule: &str) -> Result<(String, String), String> {
    let (input, output) = rule
        .split_once(RULE_SEPARATOR)
        .ok_or_else(|| format!("error: rule '{rule}' is missing '{RULE_SEPARATOR}'"))?;
    Ok((input.trim().to_string(), output.trim().to_string()))
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> Result<CliConfig, String> {
        let matches = command().try_get_matches_from(args).map_err(|err| err.to_string())?;
        CliConfig::from_matches(&matches)
    }

    #[test]
    fn rules_and_trailing_input() {
        let args = ["chatrule", "--rule", "hi => hello", "-r", "bye=>ciao", "--no-color", "hi", "there"];
        let config = config(&args).unwrap();
        let expected = vec![("hi".to_string(), "hello".to_string()), ("bye".to_string(), "ciao".to_string())];
        assert_eq!(config.rules, expected);
        assert_eq!(config.input, "hi there");
        assert!(!config.color);
        assert!(!config.weakest);
    }

    #[test]
    fn rule_without_separator_is_rejected() {
        let err = config(&["chatrule", "--rule", "hi hello", "hi"]).unwrap_err();
        assert!(err.contains("missing '=>'"));
    }

    #[test]
    fn unknown_scoring_is_rejected() {
        assert!(config(&["chatrule", "--scoring", "median", "hi"]).is_err());
    }

    #[test]
    fn built_engine_numbers_rules_in_order() {
        let args = ["chatrule", "-r", "hi => hello", "-r", "* => what?", "--scoring", "weakest", "hi"];
        let config = config(&args).unwrap();
        let engine = config.build_engine().unwrap();
        let reply = engine.response(&config.input).unwrap();
        assert_eq!(reply.text, "hello");
        assert_eq!(reply.matched, vec![RuleId(1)]);
        assert_eq!(engine.responses("yo"), vec!["what?"]);
    }
}
