//! Output expansion.
//!
//! Turns a matched output template into the reply text:
//!
//! ```text
//! template:  "Nice to meet you, $name! {{ weather in $city }}"
//!                                 │              │
//!                 bindings ───────┘              │
//!                 recursive lookup ──────────────┘
//! ```
//!
//! - `$name` is replaced by the captured value; `$$` writes a literal `$`.
//!   A `$` not followed by a name is left alone (`costs $5`).
//! - `{{ text }}` is replaced by the engine's reply to `text`, after variables
//!   inside it are substituted. The caller supplies the lookup so this module
//!   stays independent of the engine.
//!
//! Failures are per candidate: the engine moves on to the next ranked match.

use super::varstack::Bindings;
use crate::error::ExpansionError;

/// Substitute `$name` placeholders from `bindings`.
pub fn expand(template: &str, bindings: &Bindings) -> Result<String, ExpansionError> {
    let re = regex!(r"\$(\$|[A-Za-z_][A-Za-z0-9_]*)");
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in re.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        match name.as_str() {
            "$" => out.push('$'),
            name => {
                let value =
                    bindings.value_of(name).ok_or_else(|| ExpansionError::UnboundVariable(name.to_string()))?;
                out.push_str(value);
            }
        }
        last = whole.end();
    }

    out.push_str(&template[last..]);
    Ok(out)
}

/// Substitute placeholders, then resolve every `{{ ... }}` segment through
/// `lookup`.
pub fn expand_with<F>(template: &str, bindings: &Bindings, mut lookup: F) -> Result<String, ExpansionError>
where
    F: FnMut(&str) -> Result<String, ExpansionError>,
{
    let substituted = expand(template, bindings)?;
    let re = regex!(r"\{\{\s*(.*?)\s*\}\}");
    let mut out = String::with_capacity(substituted.len());
    let mut last = 0;

    for caps in re.captures_iter(&substituted) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&substituted[last..whole.start()]);
        out.push_str(&lookup(inner.as_str())?);
        last = whole.end();
    }

    out.push_str(&substituted[last..]);
    Ok(out)
}
