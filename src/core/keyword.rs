//! Keyword unit processing: `--name[=value] [values...]` to a name/value pair.
//!
//! Accepted spellings:
//! - `--count 3` and `--count=3` give `count = 3`
//! - bare `--verbose` gives `True`, bare `--no-cache` gives `cache = False`
//! - `--dry-run` gives `dry_run`
//! - `--tags a b` gives a tuple, `--tags [a b]` a list

use super::error::EngineError;
use super::joiner;
use super::literal::coerce;
use super::types::{KeywordEntry, KeywordUnit, TypedValue};

/// Outer bracket shape of a multi-token value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wrap {
    List,
    Tuple,
}

/// Strip one or two leading dashes.
fn strip_dashes(marker: &str) -> &str {
    marker
        .strip_prefix("--")
        .or_else(|| marker.strip_prefix('-'))
        .unwrap_or(marker)
}

/// Whether the tokens, read as one space-joined string, sit inside a single
/// outer `[...]` or `(...)` that only closes at the very end.
fn outer_wrap(tokens: &[String]) -> Option<Wrap> {
    let first = tokens.first()?;
    let last = tokens.last()?;
    let (open, close, wrap) = match first.chars().next()? {
        '[' => ('[', ']', Wrap::List),
        '(' => ('(', ')', Wrap::Tuple),
        _ => return None,
    };
    if !last.ends_with(close) {
        return None;
    }

    let joined = tokens.join(" ");
    let end = joined.chars().count() - 1;
    let mut depth = 0usize;
    for (idx, ch) in joined.chars().enumerate() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 && idx != end {
                return None;
            }
        }
    }
    (depth == 0).then_some(wrap)
}

/// Drop the outer brackets from the first and last token.
fn unwrap_tokens(mut tokens: Vec<String>) -> Vec<String> {
    if let Some(first) = tokens.first_mut() {
        first.remove(0);
    }
    if let Some(last) = tokens.last_mut() {
        last.pop();
    }
    tokens.retain(|t| !t.trim().is_empty());
    tokens
}

fn coerce_each(tokens: &[String]) -> Result<Vec<TypedValue>, EngineError> {
    tokens.iter().map(|t| coerce(t)).collect()
}

/// Finalize one keyword unit.
pub fn process_unit(unit: &KeywordUnit) -> Result<KeywordEntry, EngineError> {
    let raw = strip_dashes(&unit.marker);
    let mut values = unit.values.clone();
    let name = match raw.split_once('=') {
        Some((name, first_value)) => {
            values.insert(0, first_value.to_string());
            name
        }
        None => raw,
    };

    if values.is_empty() {
        let (name, flag) = match name.strip_prefix("no-") {
            Some(negated) => (negated, false),
            None => (name, true),
        };
        return Ok(KeywordEntry::new(
            name.replace('-', "_"),
            TypedValue::Boolean(flag),
        ));
    }
    let name = name.replace('-', "_");

    let tokens = joiner::joined(values);
    if tokens.len() > 1 {
        if let Some(wrap) = outer_wrap(&tokens) {
            let items = coerce_each(&unwrap_tokens(tokens))?;
            let value = match wrap {
                Wrap::List => TypedValue::List(items),
                Wrap::Tuple => TypedValue::Tuple(items),
            };
            return Ok(KeywordEntry::new(name, value));
        }
    }

    let mut items = coerce_each(&tokens)?;
    let value = match items.len() {
        1 => items.remove(0),
        _ => TypedValue::Tuple(items),
    };
    Ok(KeywordEntry::new(name, value))
}
