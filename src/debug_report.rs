use chatrule::{MatchSummary, PathFlags, SearchMetrics, VerboseResponse};

const TOP_MATCHES: usize = 5;

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(run: &VerboseResponse, show_all: bool, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Matching: \"{}\"", run.input.trim()), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Tokens ━━━", ansi::GRAY));
    if run.tokens.is_empty() {
        println!("{}", palette.dim("  (none)"));
    } else {
        println!("  {}", palette.paint(run.tokens.join(" · "), ansi::BLUE));
    }

    println!("\n{}", palette.paint("━━━ Matches ━━━", ansi::GRAY));
    if run.ranked.is_empty() {
        println!("{}", palette.dim("  No rule matched"));
        println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
        println!("  • A rule input is longer or shorter than the input");
        println!("  • Literals differ (try --fuzzy)");
        println!("  • Quoted rules compare case and every word exactly");
        println!("\n{}", palette.dim("  Tip: Set CHATRULE_LOG=chatrule=trace to follow the search"));
    } else {
        print_matches(&run.ranked, show_all, &palette);
    }

    println!("\n{}", palette.paint("━━━ Response ━━━", ansi::GRAY));
    match &run.response {
        Ok(response) if response.is_match() => {
            let rules: Vec<String> = response.matched.iter().map(|id| id.to_string()).collect();
            println!("  {}", palette.bold(palette.paint(&response.text, ansi::GREEN)));
            println!("  {} {}", palette.dim("rules:"), palette.paint(rules.join(" → "), ansi::CYAN));
        }
        Ok(_) => println!("{}", palette.dim("  (no response)")),
        Err(err) => println!("  {}", palette.paint(format!("✗ {err}"), ansi::RED)),
    }

    println!("\n{}", palette.paint("━━━ Search ━━━", ansi::GRAY));
    print_metrics(&run.metrics, &palette);
    println!();
}

fn print_matches(ranked: &[MatchSummary], show_all: bool, palette: &ansi::Palette) {
    let shown = if show_all { ranked.len() } else { ranked.len().min(TOP_MATCHES) };

    for (idx, m) in ranked.iter().take(shown).enumerate() {
        println!(
            "  {} {} {} {} {}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            palette.paint(format!("{:.3}", m.score), ansi::YELLOW),
            palette.paint(m.rule.to_string(), ansi::CYAN),
            palette.dim("│"),
            palette.dim(&m.template),
        );

        match &m.expanded {
            Ok(text) => println!("      {} {}", palette.dim("→"), palette.bold(palette.paint(text, ansi::GREEN))),
            Err(err) => println!("      {} {}", palette.dim("→"), palette.paint(format!("✗ {err}"), ansi::RED)),
        }

        let mut details = vec![format!("{} {}", palette.dim("flags:"), palette.paint(fmt_flags(m.flags), ansi::BLUE))];
        if !m.bindings.is_empty() {
            let bound: Vec<String> = m.bindings.iter().map(|(name, value)| format!("${name}={value}")).collect();
            details.push(format!("{} {}", palette.dim("bindings:"), palette.paint(bound.join(" "), ansi::BLUE)));
        }
        let sep = format!("  {} ", palette.dim("│"));
        println!("      {}", details.join(sep.as_str()));
    }

    if ranked.len() > shown {
        println!("  {}", palette.dim(format!("... +{} more (use --all)", ranked.len() - shown)));
    }
}

fn print_metrics(metrics: &SearchMetrics, palette: &ansi::Palette) {
    println!(
        "  Visited: {}  │  Pruned: {}  │  Depth: {}  │  Matches: {}",
        palette.paint(metrics.nodes_visited.to_string(), ansi::BLUE),
        palette.paint(metrics.loops_pruned.to_string(), ansi::YELLOW),
        palette.paint(metrics.max_depth.to_string(), ansi::BLUE),
        palette.paint(metrics.matches.to_string(), ansi::GREEN),
    );
    println!("  Total: {}", palette.paint(format!("{:?}", metrics.total), ansi::GREEN));
}

fn fmt_flags(flags: PathFlags) -> String {
    let names: Vec<&str> = [
        (PathFlags::EXACT, "exact"),
        (PathFlags::HAS_VARIABLE, "$var"),
        (PathFlags::HAS_WILDCARD, "*"),
        (PathFlags::HAS_GLOB, "**"),
    ]
    .into_iter()
    .filter(|(flag, _)| flags.contains(*flag))
    .map(|(_, name)| name)
    .collect();

    if names.is_empty() { "literal".to_string() } else { names.join(" ") }
}
