//! Engine error model.
//!
//! Only two failures leave the engine. Benign literal failures never show up
//! here: they come back as `Ok(TypedValue::String)` from coercion.

/// A fatal engine failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// No sub-namespace, callable or launcher matched.
    #[error("no callable found in namespace '{namespace}'")]
    Resolution {
        /// Fully-qualified name of the namespace that was searched.
        namespace: String,
    },

    /// A token parsed as a literal but is structurally invalid.
    #[error("invalid literal {token:?}: {reason}")]
    LiteralSyntax { token: String, reason: String },
}

impl EngineError {
    pub fn literal(token: &str, reason: impl Into<String>) -> Self {
        EngineError::LiteralSyntax {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_message_names_namespace() {
        let e = EngineError::Resolution {
            namespace: "tools.net".into(),
        };
        assert_eq!(e.to_string(), "no callable found in namespace 'tools.net'");
    }

    #[test]
    fn test_literal_message() {
        let e = EngineError::literal("{[1]}", "unhashable type: 'list'");
        assert!(e.to_string().contains("{[1]}"));
        assert!(e.to_string().contains("unhashable"));
    }
}
