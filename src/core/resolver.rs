//! Symbol resolution: positional prefix to namespace and callable.
//!
//! The longest run of leading tokens that names a known sub-namespace wins.
//! Inside it, the callable is picked in this order:
//! 1. the first residual token, when it names a visible callable
//! 2. the conventional `main` entry point
//! 3. the namespace's launcher script (the remaining argv goes through raw)
//! 4. a placeholder in parse-only mode, otherwise a resolution error

use super::error::EngineError;
use super::types::{qualified_name, ResolvedTarget};
use std::collections::HashSet;
use std::path::PathBuf;

/// Conventional name of a namespace's default entry point.
pub const DEFAULT_ENTRY_POINT: &str = "main";

/// Target substituted in parse-only mode when nothing resolves.
pub const PARSE_ONLY_TARGET: &str = "<parse-only>";

/// Read-only view of the namespace tree being searched.
///
/// Namespace paths are relative to the root and dot-joined; `""` is the root.
pub trait NamespaceTree {
    /// Name of the root namespace.
    fn root(&self) -> &str;

    /// Every known sub-namespace path.
    fn sub_namespaces(&self) -> Vec<String>;

    /// Names of the callables visible directly in `namespace`.
    fn callables(&self, namespace: &str) -> Vec<String>;

    /// Launcher script associated with `namespace`, if any.
    fn launcher(&self, namespace: &str) -> Option<PathBuf>;

    fn has_callable(&self, namespace: &str, name: &str) -> bool {
        self.callables(namespace).iter().any(|c| c == name)
    }
}

/// Longest prefix of `prefix` naming a known sub-namespace.
/// Returns the namespace path and how many tokens it consumed.
pub fn find_namespace(prefix: &[String], known: &HashSet<String>) -> (String, usize) {
    for len in (1..=prefix.len()).rev() {
        let candidate = prefix[..len].join(".");
        if known.contains(&candidate) {
            return (candidate, len);
        }
    }
    (String::new(), 0)
}

/// Resolve the target for a command line.
///
/// `argv` is the full argument vector (program name first); `prefix` is its
/// positional prefix. Launcher mode hands back `argv` from just after the
/// consumed namespace tokens, untouched.
pub fn resolve(
    tree: &dyn NamespaceTree,
    argv: &[String],
    prefix: &[String],
    parse_only: bool,
) -> Result<ResolvedTarget, EngineError> {
    let known: HashSet<String> = tree.sub_namespaces().into_iter().collect();
    let (namespace, consumed) = find_namespace(prefix, &known);
    let residual = &prefix[consumed..];
    tracing::debug!(
        namespace = %qualified_name(tree.root(), &namespace),
        consumed,
        "matched namespace"
    );

    if let Some(selector) = residual.first() {
        if tree.has_callable(&namespace, selector) {
            tracing::debug!(callable = %selector, "selected callable");
            return Ok(ResolvedTarget::Callable {
                namespace,
                name: selector.clone(),
                residual: residual[1..].to_vec(),
            });
        }
    }

    if tree.has_callable(&namespace, DEFAULT_ENTRY_POINT) {
        tracing::debug!("using default entry point");
        return Ok(ResolvedTarget::Callable {
            namespace,
            name: DEFAULT_ENTRY_POINT.to_string(),
            residual: residual.to_vec(),
        });
    }

    if let Some(script) = tree.launcher(&namespace) {
        tracing::debug!(script = %script.display(), "falling back to launcher");
        let remainder = argv.get(1 + consumed..).unwrap_or_default().to_vec();
        return Ok(ResolvedTarget::Launcher {
            namespace,
            script,
            remainder,
        });
    }

    if parse_only {
        tracing::warn!(
            namespace = %qualified_name(tree.root(), &namespace),
            "nothing to call, substituting placeholder"
        );
        return Ok(ResolvedTarget::Callable {
            namespace,
            name: PARSE_ONLY_TARGET.to_string(),
            residual: residual.to_vec(),
        });
    }

    Err(EngineError::Resolution {
        namespace: qualified_name(tree.root(), &namespace),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeTree {
        callables: HashMap<String, Vec<String>>,
        launchers: HashMap<String, PathBuf>,
        extra: Vec<String>,
    }

    impl FakeTree {
        fn with(mut self, ns: &str, names: &[&str]) -> Self {
            self.callables
                .insert(ns.to_string(), names.iter().map(|s| s.to_string()).collect());
            self
        }

        fn launcher_at(mut self, ns: &str, script: &str) -> Self {
            self.launchers.insert(ns.to_string(), PathBuf::from(script));
            self
        }
    }

    impl NamespaceTree for FakeTree {
        fn root(&self) -> &str {
            "root"
        }

        fn sub_namespaces(&self) -> Vec<String> {
            self.callables
                .keys()
                .chain(self.launchers.keys())
                .chain(self.extra.iter())
                .filter(|k| !k.is_empty())
                .cloned()
                .collect()
        }

        fn callables(&self, namespace: &str) -> Vec<String> {
            self.callables.get(namespace).cloned().unwrap_or_default()
        }

        fn launcher(&self, namespace: &str) -> Option<PathBuf> {
            self.launchers.get(namespace).cloned()
        }
    }

    fn strs(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    fn argv(tokens: &[&str]) -> Vec<String> {
        let mut v = vec!["prog".to_string()];
        v.extend(strs(tokens));
        v
    }

    #[test]
    fn test_find_namespace_longest_prefix() {
        let known: HashSet<String> = strs(&["pkg", "pkg.sub"]).into_iter().collect();
        let (ns, used) = find_namespace(&strs(&["pkg", "sub", "thing", "arg1"]), &known);
        assert_eq!(ns, "pkg.sub");
        assert_eq!(used, 2);
        let (ns, used) = find_namespace(&strs(&["pkg", "other"]), &known);
        assert_eq!(ns, "pkg");
        assert_eq!(used, 1);
        let (ns, used) = find_namespace(&strs(&["nope"]), &known);
        assert_eq!(ns, "");
        assert_eq!(used, 0);
    }

    #[test]
    fn test_resolve_nested_callable_selector() {
        let tree = FakeTree::default()
            .with("pkg", &[])
            .with("pkg.sub", &["thing"]);
        let args = argv(&["pkg", "sub", "thing", "arg1"]);
        let target = resolve(&tree, &args, &args[1..], false).unwrap();
        assert_eq!(
            target,
            ResolvedTarget::Callable {
                namespace: "pkg.sub".into(),
                name: "thing".into(),
                residual: strs(&["arg1"]),
            }
        );
    }

    #[test]
    fn test_resolve_default_entry_point() {
        let tree = FakeTree::default().with("pkg.sub", &["main", "thing"]);
        let args = argv(&["pkg", "sub", "other", "x"]);
        let target = resolve(&tree, &args, &args[1..], false).unwrap();
        assert_eq!(
            target,
            ResolvedTarget::Callable {
                namespace: "pkg.sub".into(),
                name: "main".into(),
                residual: strs(&["other", "x"]),
            }
        );
    }

    #[test]
    fn test_resolve_root_namespace() {
        let tree = FakeTree::default().with("", &["hello"]);
        let args = argv(&["hello", "world"]);
        let target = resolve(&tree, &args, &args[1..], false).unwrap();
        assert_eq!(
            target,
            ResolvedTarget::Callable {
                namespace: "".into(),
                name: "hello".into(),
                residual: strs(&["world"]),
            }
        );
    }

    #[test]
    fn test_resolve_launcher_keeps_raw_remainder() {
        let tree = FakeTree::default().launcher_at("tool", "/opt/tool.sh");
        let args = argv(&["tool", "run", "--fast", "[1,", "2]"]);
        // Positional prefix stops at the first keyword marker.
        let target = resolve(&tree, &args, &args[1..3], false).unwrap();
        assert_eq!(
            target,
            ResolvedTarget::Launcher {
                namespace: "tool".into(),
                script: PathBuf::from("/opt/tool.sh"),
                remainder: strs(&["run", "--fast", "[1,", "2]"]),
            }
        );
    }

    #[test]
    fn test_resolve_callable_beats_launcher() {
        let tree = FakeTree::default()
            .with("tool", &["run"])
            .launcher_at("tool", "/opt/tool.sh");
        let args = argv(&["tool", "run"]);
        let target = resolve(&tree, &args, &args[1..], false).unwrap();
        assert!(matches!(target, ResolvedTarget::Callable { ref name, .. } if name == "run"));
    }

    #[test]
    fn test_resolve_failure_names_namespace() {
        let tree = FakeTree {
            extra: strs(&["pkg"]),
            ..FakeTree::default()
        };
        let args = argv(&["pkg", "x"]);
        let err = resolve(&tree, &args, &args[1..], false).unwrap_err();
        assert_eq!(
            err,
            EngineError::Resolution {
                namespace: "root.pkg".into()
            }
        );
    }

    #[test]
    fn test_resolve_parse_only_placeholder() {
        let tree = FakeTree::default();
        let args = argv(&["a", "b"]);
        let target = resolve(&tree, &args, &args[1..], true).unwrap();
        assert_eq!(
            target,
            ResolvedTarget::Callable {
                namespace: "".into(),
                name: PARSE_ONLY_TARGET.into(),
                residual: strs(&["a", "b"]),
            }
        );
    }

    #[test]
    fn test_resolve_selector_only_from_residual() {
        // "pkg" is a namespace, not a callable selector.
        let tree = FakeTree::default().with("pkg", &["main"]).with("", &["pkg"]);
        let args = argv(&["pkg"]);
        let target = resolve(&tree, &args, &args[1..], false).unwrap();
        assert!(matches!(
            target,
            ResolvedTarget::Callable { ref namespace, ref name, .. }
                if namespace == "pkg" && name == "main"
        ));
    }
}
