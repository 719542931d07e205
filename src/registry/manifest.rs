//! Namespace manifest: YAML parsing and validation.
//!
//! Parses nscall.yaml and validates structural constraints:
//! - Version must be "1.0"
//! - Root name must not be empty
//! - Namespace paths are dot-joined segments without whitespace
//! - Callables have a dot-free name and a non-empty command
//! - Launcher paths are non-empty

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root manifest: the namespace tree a command line is resolved against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Schema version (must be "1.0")
    pub version: String,

    /// Root namespace name, used in messages
    pub root: String,

    /// Namespaces by dot-joined path; `""` is the root itself
    #[serde(default)]
    pub namespaces: IndexMap<String, NamespaceSpec>,
}

/// One namespace node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceSpec {
    #[serde(default)]
    pub description: Option<String>,

    /// Callables visible in this namespace (order-preserving)
    #[serde(default)]
    pub callables: IndexMap<String, CallableSpec>,

    /// Script run with the raw command line when nothing else matches
    #[serde(default)]
    pub launcher: Option<PathBuf>,

    /// Program used to run the launcher (e.g. "bash"); direct exec when unset
    #[serde(default)]
    pub interpreter: Option<String>,
}

/// An external command exposed as a callable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallableSpec {
    /// Program and fixed leading arguments
    pub command: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Read stdout back as a literal so structured results pretty-print
    #[serde(default)]
    pub literal_output: bool,
}

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a manifest file from disk.
pub fn parse_manifest_file(path: &Path) -> Result<Manifest, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_manifest(&content)
}

/// Parse a manifest from a string.
pub fn parse_manifest(yaml: &str) -> Result<Manifest, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

fn valid_path(path: &str) -> bool {
    path.is_empty()
        || path
            .split('.')
            .all(|seg| !seg.is_empty() && !seg.chars().any(char::is_whitespace))
}

/// Validate a parsed manifest. Returns a list of errors (empty = valid).
pub fn validate_manifest(manifest: &Manifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if manifest.version != "1.0" {
        errors.push(ValidationError {
            message: format!("version must be \"1.0\", got \"{}\"", manifest.version),
        });
    }

    if manifest.root.trim().is_empty() {
        errors.push(ValidationError {
            message: "root must not be empty".to_string(),
        });
    }

    for (path, ns) in &manifest.namespaces {
        if !valid_path(path) {
            errors.push(ValidationError {
                message: format!("invalid namespace path '{}'", path),
            });
        }

        for (name, callable) in &ns.callables {
            if name.is_empty() || name.contains('.') {
                errors.push(ValidationError {
                    message: format!("namespace '{}' has invalid callable name '{}'", path, name),
                });
            }
            if callable.command.is_empty() || callable.command[0].is_empty() {
                errors.push(ValidationError {
                    message: format!("callable '{}' in namespace '{}' has no command", name, path),
                });
            }
        }

        if let Some(launcher) = &ns.launcher {
            if launcher.as_os_str().is_empty() {
                errors.push(ValidationError {
                    message: format!("namespace '{}' has an empty launcher path", path),
                });
            }
        }
        if ns.interpreter.is_some() && ns.launcher.is_none() {
            errors.push(ValidationError {
                message: format!("namespace '{}' sets interpreter without launcher", path),
            });
        }
    }

    errors
}
