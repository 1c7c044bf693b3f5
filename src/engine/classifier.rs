//! Word classification.
//!
//! Turns raw phrases into typed [`Word`] sequences. Rule inputs and user input
//! share the same symbol filtering so that literals authored in a rule compare
//! equal to the words a user types; only rule inputs recognize the special
//! word classes.
//!
//! ## Rule input grammar
//!
//! ```text
//! hello *  there     * matches one token
//! tell me about **   ** matches one or more tokens
//! my name is $name   $name matches one token and binds it
//! "Exact Phrase"     quoted: literals only, compared verbatim
//! ```
//!
//! Punctuation is stripped from literals (apostrophes join, other symbols split)
//! and ignored around markers, so `$name?` reads as `$name` and the possessive
//! `$name's` reads as `$name` (the variable takes the whole user token). A `*`
//! that is not a standalone `*` or `**` (`*hello*`, `***`) is rejected.

use crate::error::InputSyntaxError;
use crate::{Word, WordKind};

const WILDCARD: &str = "*";
const GLOB: &str = "**";
const VARIABLE_PREFIX: char = '$';
const QUOTE: char = '"';

/// Tokenize a rule input phrase.
pub fn tokenize_rule_input(phrase: &str) -> Result<Vec<Word>, InputSyntaxError> {
    let lead = phrase.len() - phrase.trim_start().len();
    let phrase = phrase.trim();

    if phrase.contains(QUOTE) {
        let inner = exact_inner(phrase, lead)?;
        let mut words = vec![Word::exact_marker()];
        words.extend(literals(inner, true));
        if words.len() == 1 {
            return Err(InputSyntaxError::EmptyExactPhrase);
        }
        return Ok(words);
    }

    let mut words = Vec::new();
    for raw in phrase.split_whitespace() {
        let marker = raw.trim_matches(|c: char| !is_marker_char(c));
        match marker {
            GLOB => words.push(Word::glob()),
            WILDCARD => words.push(Word::wildcard()),
            m if m.starts_with(VARIABLE_PREFIX) => words.push(parse_variable(m)?),
            m if m.contains(WILDCARD) => return Err(InputSyntaxError::InvalidWildcard(m.to_string())),
            _ => words.extend(literals(raw, false)),
        }
    }

    if words.is_empty() { Err(InputSyntaxError::Empty) } else { Ok(words) }
}

/// Tokenize user input. Never fails; an empty or all-symbol phrase yields an
/// empty sequence, which callers treat as "no match possible".
pub fn tokenize_user_input(phrase: &str) -> Vec<Word> {
    literals(phrase, false)
}

/// True if the sequence came from a quoted rule input.
pub fn is_exact(words: &[Word]) -> bool {
    words.first().is_some_and(|w| w.kind == WordKind::ExactMarker)
}

fn is_marker_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '*' || c == VARIABLE_PREFIX
}

/// Return the text between the wrapping quotes, or the offset of the first
/// quote that does not wrap the phrase. `lead` is the whitespace trimmed off
/// the caller's phrase, so offsets point into the original text.
fn exact_inner(phrase: &str, lead: usize) -> Result<&str, InputSyntaxError> {
    let quotes: Vec<usize> = phrase.match_indices(QUOTE).map(|(idx, _)| idx).collect();
    let last = phrase.len() - 1;

    match quotes.as_slice() {
        [0, end] if *end == last => Ok(&phrase[1..last]),
        _ => {
            let offending = quotes.iter().copied().find(|&q| q != 0 && q != last).or(quotes.last().copied());
            Err(InputSyntaxError::MisplacedQuote(lead + offending.unwrap_or(0)))
        }
    }
}

fn parse_variable(marker: &str) -> Result<Word, InputSyntaxError> {
    let caps = regex!(r"^\$([A-Za-z_][A-Za-z0-9_]*)(?:['\x{2019}]s?)?$")
        .captures(marker)
        .ok_or_else(|| InputSyntaxError::InvalidVariable(marker.to_string()))?;
    Ok(Word::variable(&caps[1]))
}

/// Split `text` into literal words after symbol filtering. With `verbatim`
/// the comparison form keeps its case.
fn literals(text: &str, verbatim: bool) -> Vec<Word> {
    filter_symbols(text)
        .split_whitespace()
        .map(|original| {
            let text = if verbatim { original.to_string() } else { original.to_lowercase() };
            Word::literal(text, original)
        })
        .collect()
}

/// Drop apostrophes and turn every other non-alphanumeric character into a
/// word break.
fn filter_symbols(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}'))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect()
}
