//! Engine data model: typed values, keyword entries, resolution targets.
//!
//! Every value here is built fresh from one argument vector and dropped once
//! the resolved call has been dispatched. Nothing is cached between runs.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Typed values
// ============================================================================

/// The result of coercing one command-line token.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    String(String),
    List(Vec<TypedValue>),
    Tuple(Vec<TypedValue>),
    /// Insertion-ordered key/value pairs. Keys are unique.
    Mapping(Vec<(TypedValue, TypedValue)>),
    /// Insertion-ordered, structurally deduplicated elements.
    Set(Vec<TypedValue>),
}

impl TypedValue {
    /// Short kind name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::Integer(_) => "int",
            TypedValue::Float(_) => "float",
            TypedValue::Boolean(_) => "bool",
            TypedValue::Null => "None",
            TypedValue::String(_) => "str",
            TypedValue::List(_) => "list",
            TypedValue::Tuple(_) => "tuple",
            TypedValue::Mapping(_) => "dict",
            TypedValue::Set(_) => "set",
        }
    }

    /// Whether this value may be a set element or mapping key.
    pub fn is_hashable(&self) -> bool {
        match self {
            TypedValue::List(_) | TypedValue::Mapping(_) | TypedValue::Set(_) => false,
            TypedValue::Tuple(items) => items.iter().all(TypedValue::is_hashable),
            _ => true,
        }
    }

    /// `None`, empty strings and empty aggregates. Numbers and booleans are
    /// never empty, zero and `False` included.
    pub fn is_empty(&self) -> bool {
        match self {
            TypedValue::Integer(_) | TypedValue::Float(_) | TypedValue::Boolean(_) => false,
            TypedValue::Null => true,
            TypedValue::String(s) => s.is_empty(),
            TypedValue::List(v) | TypedValue::Tuple(v) | TypedValue::Set(v) => v.is_empty(),
            TypedValue::Mapping(m) => m.is_empty(),
        }
    }

    /// Render for an external process argument: strings verbatim,
    /// everything else in printed (re-parseable) form.
    pub fn to_arg(&self) -> String {
        match self {
            TypedValue::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    // Prefer single quotes, switch to double when that avoids escaping.
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    write!(f, "{}", quote)?;
    for c in s.chars() {
        match c {
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            c if c == quote => write!(f, "\\{}", c)?,
            c if (c as u32) < 0x20 || c as u32 == 0x7f => write!(f, "\\x{:02x}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "{}", quote)
}

fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        write!(f, "nan")
    } else if v.is_infinite() {
        write!(f, "{}", if v > 0.0 { "inf" } else { "-inf" })
    } else {
        // Debug always keeps a '.' or an exponent, so it reads back as a float.
        write!(f, "{:?}", v)
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[TypedValue]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Integer(i) => write!(f, "{}", i),
            TypedValue::Float(v) => write_float(f, *v),
            TypedValue::Boolean(true) => write!(f, "True"),
            TypedValue::Boolean(false) => write!(f, "False"),
            TypedValue::Null => write!(f, "None"),
            TypedValue::String(s) => write_quoted(f, s),
            TypedValue::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
            TypedValue::Tuple(items) => {
                write!(f, "(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            TypedValue::Mapping(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            // `{}` is an empty mapping, so an empty set has no literal form.
            TypedValue::Set(items) if items.is_empty() => write!(f, "set()"),
            TypedValue::Set(items) => {
                write!(f, "{{")?;
                write_items(f, items)?;
                write!(f, "}}")
            }
        }
    }
}

impl Serialize for TypedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypedValue::Integer(i) => serializer.serialize_i64(*i),
            TypedValue::Float(v) => serializer.serialize_f64(*v),
            TypedValue::Boolean(b) => serializer.serialize_bool(*b),
            TypedValue::Null => serializer.serialize_unit(),
            TypedValue::String(s) => serializer.serialize_str(s),
            TypedValue::List(items) | TypedValue::Tuple(items) | TypedValue::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            TypedValue::Mapping(pairs) => {
                // JSON object keys are strings; non-string keys use their printed form.
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (k, v) in pairs {
                    map.serialize_entry(&k.to_arg(), v)?;
                }
                map.end()
            }
        }
    }
}

// ============================================================================
// Keyword arguments
// ============================================================================

/// One finalized keyword argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordEntry {
    /// Keyword name with dashes normalized to underscores.
    pub name: String,
    /// A scalar for a single value, a Tuple or List for several.
    pub value: TypedValue,
}

impl KeywordEntry {
    pub fn new(name: impl Into<String>, value: TypedValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A KeywordMarker token plus every token up to the next marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordUnit {
    pub marker: String,
    pub values: Vec<String>,
}

/// The argument vector split at the first KeywordMarker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    pub positional_prefix: Vec<String>,
    pub keyword_units: Vec<KeywordUnit>,
}

/// Final, coerced arguments for a direct call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedArguments {
    pub positional: Vec<TypedValue>,
    pub keyword: IndexMap<String, TypedValue>,
}

// ============================================================================
// Resolution
// ============================================================================

/// What the symbol resolver found for a positional prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// A callable in `namespace`, with the positional tokens left to coerce.
    Callable {
        namespace: String,
        name: String,
        residual: Vec<String>,
    },
    /// The namespace's launcher script and the untouched remaining argv.
    Launcher {
        namespace: String,
        script: PathBuf,
        remainder: Vec<String>,
    },
}

/// The engine's output, handed to the invocation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Call {
        namespace: String,
        callable: String,
        arguments: ParsedArguments,
    },
    Launcher {
        namespace: String,
        script: PathBuf,
        tokens: Vec<String>,
    },
}

/// Join a namespace path onto the root name, e.g. `tools` + `net.dns`.
pub fn qualified_name(root: &str, namespace: &str) -> String {
    match (root.is_empty(), namespace.is_empty()) {
        (_, true) => root.to_string(),
        (true, false) => namespace.to_string(),
        (false, false) => format!("{}.{}", root, namespace),
    }
}

impl Dispatch {
    /// Dot-qualified description of the dispatch target (relative to root).
    pub fn target_name(&self) -> String {
        match self {
            Dispatch::Call {
                namespace,
                callable,
                ..
            } => qualified_name(namespace, callable),
            Dispatch::Launcher {
                namespace, script, ..
            } => format!("{} ({})", namespace, script.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars() {
        assert_eq!(TypedValue::Integer(-3).to_string(), "-3");
        assert_eq!(TypedValue::Float(1.0).to_string(), "1.0");
        assert_eq!(TypedValue::Float(0.25).to_string(), "0.25");
        assert_eq!(TypedValue::Boolean(true).to_string(), "True");
        assert_eq!(TypedValue::Boolean(false).to_string(), "False");
        assert_eq!(TypedValue::Null.to_string(), "None");
    }

    #[test]
    fn test_display_strings_quoted() {
        assert_eq!(TypedValue::String("bar".into()).to_string(), "'bar'");
        assert_eq!(TypedValue::String("it's".into()).to_string(), "\"it's\"");
        assert_eq!(
            TypedValue::String("a\nb\\".into()).to_string(),
            "'a\\nb\\\\'"
        );
        assert_eq!(
            TypedValue::String("'\"".into()).to_string(),
            "'\\'\"'"
        );
    }

    #[test]
    fn test_display_aggregates() {
        let one = TypedValue::Integer(1);
        let two = TypedValue::Integer(2);
        assert_eq!(
            TypedValue::List(vec![one.clone(), two.clone()]).to_string(),
            "[1, 2]"
        );
        assert_eq!(TypedValue::Tuple(vec![one.clone()]).to_string(), "(1,)");
        assert_eq!(TypedValue::Tuple(vec![]).to_string(), "()");
        assert_eq!(
            TypedValue::Mapping(vec![(TypedValue::String("a".into()), one.clone())]).to_string(),
            "{'a': 1}"
        );
        assert_eq!(TypedValue::Set(vec![one, two]).to_string(), "{1, 2}");
        assert_eq!(TypedValue::Set(vec![]).to_string(), "set()");
    }

    #[test]
    fn test_hashable() {
        assert!(TypedValue::Integer(1).is_hashable());
        assert!(TypedValue::Tuple(vec![TypedValue::Null]).is_hashable());
        assert!(!TypedValue::List(vec![]).is_hashable());
        assert!(!TypedValue::Tuple(vec![TypedValue::Set(vec![])]).is_hashable());
    }

    #[test]
    fn test_to_arg_strings_verbatim() {
        assert_eq!(TypedValue::String("x y".into()).to_arg(), "x y");
        assert_eq!(TypedValue::List(vec![TypedValue::Integer(1)]).to_arg(), "[1]");
    }

    #[test]
    fn test_is_empty() {
        assert!(TypedValue::String(String::new()).is_empty());
        assert!(TypedValue::Null.is_empty());
        assert!(TypedValue::Mapping(vec![]).is_empty());
        assert!(TypedValue::Set(vec![]).is_empty());
        assert!(!TypedValue::Integer(7).is_empty());
        assert!(!TypedValue::Integer(0).is_empty());
        assert!(!TypedValue::Float(0.0).is_empty());
        assert!(!TypedValue::Boolean(false).is_empty());
    }

    #[test]
    fn test_serialize_json() {
        let v = TypedValue::Mapping(vec![
            (TypedValue::String("k".into()), TypedValue::Tuple(vec![TypedValue::Null])),
            (TypedValue::Integer(2), TypedValue::Float(0.5)),
        ]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"k":[null],"2":0.5}"#);
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(qualified_name("tools", ""), "tools");
        assert_eq!(qualified_name("tools", "net.dns"), "tools.net.dns");
        assert_eq!(qualified_name("", "net"), "net");
    }
}
