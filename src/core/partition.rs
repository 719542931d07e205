//! Token partitioning: positional prefix and keyword units.
//!
//! A KeywordMarker is one or two dashes followed by a non-digit, so negative
//! numbers such as `-5` or `--3` stay positional values. A bare `-` or `--`
//! is a plain value too.

use super::types::{CommandLine, KeywordUnit};
use regex::Regex;
use std::sync::LazyLock;

static KEYWORD_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:--\D|-[^-\d])").expect("keyword marker pattern is valid"));

/// Whether a token introduces a keyword argument.
pub fn is_keyword_marker(token: &str) -> bool {
    KEYWORD_MARKER.is_match(token)
}

/// Split an argument vector (index 0 is the program name) into a positional
/// prefix and keyword units.
pub fn partition(argv: &[String]) -> CommandLine {
    let rest = argv.get(1..).unwrap_or_default();
    let first_marker = rest
        .iter()
        .position(|t| is_keyword_marker(t))
        .unwrap_or(rest.len());

    let positional_prefix = rest[..first_marker].to_vec();
    let mut keyword_units: Vec<KeywordUnit> = Vec::new();
    for token in &rest[first_marker..] {
        if is_keyword_marker(token) {
            keyword_units.push(KeywordUnit {
                marker: token.clone(),
                values: Vec::new(),
            });
        } else if let Some(unit) = keyword_units.last_mut() {
            unit.values.push(token.clone());
        }
    }

    CommandLine {
        positional_prefix,
        keyword_units,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn argv(tokens: &[&str]) -> Vec<String> {
        std::iter::once("prog")
            .chain(tokens.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_marker_classification() {
        assert!(is_keyword_marker("--verbose"));
        assert!(is_keyword_marker("-v"));
        assert!(is_keyword_marker("--dry-run=1"));
        assert!(is_keyword_marker("-.5"));
        assert!(!is_keyword_marker("-5"));
        assert!(!is_keyword_marker("--5"));
        assert!(!is_keyword_marker("-"));
        assert!(!is_keyword_marker("--"));
        assert!(is_keyword_marker("---x"));
        assert!(!is_keyword_marker("verbose"));
        assert!(!is_keyword_marker(""));
    }

    #[test]
    fn test_partition_no_markers() {
        let cl = partition(&argv(&["pkg", "sub", "-5", "x"]));
        assert_eq!(cl.positional_prefix, vec!["pkg", "sub", "-5", "x"]);
        assert!(cl.keyword_units.is_empty());
    }

    #[test]
    fn test_partition_units() {
        let cl = partition(&argv(&["pkg", "--tags", "a", "b", "-v", "--n=3", "-1"]));
        assert_eq!(cl.positional_prefix, vec!["pkg"]);
        assert_eq!(cl.keyword_units.len(), 3);
        assert_eq!(cl.keyword_units[0].marker, "--tags");
        assert_eq!(cl.keyword_units[0].values, vec!["a", "b"]);
        assert!(cl.keyword_units[1].values.is_empty());
        assert_eq!(cl.keyword_units[2].marker, "--n=3");
        assert_eq!(cl.keyword_units[2].values, vec!["-1"]);
    }

    #[test]
    fn test_partition_double_dash_numbers_are_values() {
        let cl = partition(&argv(&["calc", "--5", "--", "--n", "--3"]));
        assert_eq!(cl.positional_prefix, vec!["calc", "--5", "--"]);
        assert_eq!(cl.keyword_units.len(), 1);
        assert_eq!(cl.keyword_units[0].marker, "--n");
        assert_eq!(cl.keyword_units[0].values, vec!["--3"]);
    }

    #[test]
    fn test_partition_skips_program_name() {
        let cl = partition(&argv(&[]));
        assert!(cl.positional_prefix.is_empty());
        assert!(cl.keyword_units.is_empty());
        assert_eq!(partition(&[]), CommandLine::default());
        // A program name that looks like a flag is never scanned.
        let cl = partition(&["--prog".to_string(), "x".to_string()]);
        assert_eq!(cl.positional_prefix, vec!["x"]);
    }

    proptest! {
        #[test]
        fn prop_no_markers_means_all_positional(
            tokens in proptest::collection::vec("[a-z0-9.,\\[\\]]{0,6}|-[0-9]{1,3}", 0..8)
        ) {
            let mut args = vec!["prog".to_string()];
            args.extend(tokens.iter().cloned());
            let cl = partition(&args);
            prop_assert!(cl.keyword_units.is_empty());
            prop_assert_eq!(cl.positional_prefix, tokens);
        }

        #[test]
        fn prop_partition_preserves_tokens(
            tokens in proptest::collection::vec("--?[a-z]{1,4}|[a-z0-9]{1,4}", 0..10)
        ) {
            let mut args = vec!["prog".to_string()];
            args.extend(tokens.iter().cloned());
            let cl = partition(&args);
            let mut rebuilt = cl.positional_prefix.clone();
            for unit in &cl.keyword_units {
                rebuilt.push(unit.marker.clone());
                rebuilt.extend(unit.values.iter().cloned());
            }
            prop_assert_eq!(rebuilt, tokens);
        }
    }
}
