//! Static namespace registry: the tree the resolver walks.
//!
//! Built from a manifest file or registered in code. Parents of every
//! registered namespace are known too, even when nothing was declared there.

pub mod manifest;

use crate::core::resolver::NamespaceTree;
use indexmap::IndexMap;
use manifest::{CallableSpec, Manifest, NamespaceSpec};
use std::path::{Path, PathBuf};

/// In-memory namespace tree.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    root: String,
    namespaces: IndexMap<String, NamespaceSpec>,
}

impl Registry {
    pub fn new(root: &str) -> Self {
        let mut namespaces = IndexMap::new();
        namespaces.insert(String::new(), NamespaceSpec::default());
        Self {
            root: root.to_string(),
            namespaces,
        }
    }

    /// Build from a validated manifest. Relative launcher paths are taken
    /// relative to `base_dir`.
    pub fn from_manifest(manifest: Manifest, base_dir: &Path) -> Self {
        let mut reg = Registry::new(&manifest.root);
        for (path, mut spec) in manifest.namespaces {
            if let Some(launcher) = spec.launcher.take() {
                spec.launcher = Some(if launcher.is_relative() {
                    base_dir.join(launcher)
                } else {
                    launcher
                });
            }
            reg.add_namespace(&path);
            reg.namespaces.insert(path, spec);
        }
        reg
    }

    /// Register a namespace and all of its parents.
    pub fn add_namespace(&mut self, path: &str) -> &mut NamespaceSpec {
        let mut prefix = String::new();
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
            self.namespaces.entry(prefix.clone()).or_default();
        }
        self.namespaces.entry(path.to_string()).or_default()
    }

    pub fn add_callable(&mut self, namespace: &str, name: &str, command: Vec<String>) {
        self.add_namespace(namespace).callables.insert(
            name.to_string(),
            CallableSpec {
                command,
                description: None,
                literal_output: false,
            },
        );
    }

    pub fn set_launcher(&mut self, namespace: &str, script: PathBuf, interpreter: Option<String>) {
        let spec = self.add_namespace(namespace);
        spec.launcher = Some(script);
        spec.interpreter = interpreter;
    }

    /// Look up a callable's command.
    pub fn callable(&self, namespace: &str, name: &str) -> Option<&CallableSpec> {
        self.namespaces.get(namespace)?.callables.get(name)
    }

    /// Interpreter configured for a namespace's launcher.
    pub fn interpreter(&self, namespace: &str) -> Option<&str> {
        self.namespaces.get(namespace)?.interpreter.as_deref()
    }

    /// Every namespace, root first, in registration order.
    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &NamespaceSpec)> {
        self.namespaces.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl NamespaceTree for Registry {
    fn root(&self) -> &str {
        &self.root
    }

    fn sub_namespaces(&self) -> Vec<String> {
        self.namespaces
            .keys()
            .filter(|k| !k.is_empty())
            .cloned()
            .collect()
    }

    fn callables(&self, namespace: &str) -> Vec<String> {
        self.namespaces
            .get(namespace)
            .map(|ns| ns.callables.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn launcher(&self, namespace: &str) -> Option<PathBuf> {
        self.namespaces.get(namespace)?.launcher.clone()
    }
}

/// Parse, validate and load a manifest file.
pub fn load_registry(path: &Path) -> Result<Registry, String> {
    let manifest = manifest::parse_manifest_file(path)?;
    let errors = manifest::validate_manifest(&manifest);
    if !errors.is_empty() {
        for e in &errors {
            tracing::error!("{}: {}", path.display(), e);
        }
        return Err(format!(
            "{}: {} validation error(s): {}",
            path.display(),
            errors.len(),
            errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        ));
    }
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    tracing::debug!(
        manifest = %path.display(),
        namespaces = manifest.namespaces.len(),
        "loaded manifest"
    );
    Ok(Registry::from_manifest(manifest, base_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parents_are_known() {
        let mut reg = Registry::new("r");
        reg.add_callable("a.b.c", "run", vec!["true".into()]);
        let mut known = reg.sub_namespaces();
        known.sort();
        assert_eq!(known, vec!["a", "a.b", "a.b.c"]);
        assert!(reg.callables("a.b").is_empty());
        assert_eq!(reg.callables("a.b.c"), vec!["run"]);
    }

    #[test]
    fn test_root_not_a_sub_namespace() {
        let mut reg = Registry::new("r");
        reg.add_callable("", "hello", vec!["echo".into()]);
        assert!(reg.sub_namespaces().is_empty());
        assert!(reg.has_callable("", "hello"));
        assert_eq!(reg.root(), "r");
    }

    #[test]
    fn test_launcher_and_interpreter() {
        let mut reg = Registry::new("r");
        reg.set_launcher("tool", PathBuf::from("/x/tool.sh"), Some("bash".into()));
        assert_eq!(reg.launcher("tool"), Some(PathBuf::from("/x/tool.sh")));
        assert_eq!(reg.interpreter("tool"), Some("bash"));
        assert_eq!(reg.launcher("other"), None);
    }

    #[test]
    fn test_load_registry_resolves_relative_launcher() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nscall.yaml");
        std::fs::write(
            &path,
            r#"
version: "1.0"
root: tools
namespaces:
  net.dns:
    callables:
      lookup: { command: [host] }
  ops:
    launcher: scripts/ops.sh
"#,
        )
        .unwrap();
        let reg = load_registry(&path).unwrap();
        assert_eq!(reg.root(), "tools");
        assert_eq!(
            reg.launcher("ops"),
            Some(dir.path().join("scripts/ops.sh"))
        );
        assert!(reg.sub_namespaces().contains(&"net".to_string()));
        assert_eq!(reg.callable("net.dns", "lookup").unwrap().command, vec!["host"]);
    }

    #[test]
    fn test_load_registry_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nscall.yaml");
        std::fs::write(&path, "version: \"2.0\"\nroot: \"\"\n").unwrap();
        let err = load_registry(&path).unwrap_err();
        assert!(err.contains("2 validation error(s)"));
    }
}
