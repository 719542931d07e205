//! The engine pipeline: argv in, dispatch out.
//!
//! partition → resolve → coerce positional → process keyword units.
//! Launcher targets skip coercion entirely.

use super::error::EngineError;
use super::keyword::process_unit;
use super::literal::coerce_all;
use super::partition::partition;
use super::resolver::{resolve, NamespaceTree};
use super::types::{Dispatch, ParsedArguments, ResolvedTarget};
use indexmap::IndexMap;

/// Engine switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Substitute a placeholder target instead of failing resolution.
    pub parse_only: bool,
}

/// Turn a process argument vector into a dispatch.
pub fn parse_command_line(
    argv: &[String],
    tree: &dyn NamespaceTree,
    options: EngineOptions,
) -> Result<Dispatch, EngineError> {
    let line = partition(argv);
    tracing::debug!(
        positional = line.positional_prefix.len(),
        keyword_units = line.keyword_units.len(),
        "partitioned command line"
    );

    match resolve(tree, argv, &line.positional_prefix, options.parse_only)? {
        ResolvedTarget::Launcher {
            namespace,
            script,
            remainder,
        } => Ok(Dispatch::Launcher {
            namespace,
            script,
            tokens: remainder,
        }),
        ResolvedTarget::Callable {
            namespace,
            name,
            residual,
        } => {
            let positional = coerce_all(residual)?;
            let mut keyword = IndexMap::new();
            for unit in &line.keyword_units {
                let entry = process_unit(unit)?;
                if keyword.insert(entry.name.clone(), entry.value).is_some() {
                    tracing::warn!(keyword = %entry.name, "keyword given more than once, last value wins");
                }
            }
            Ok(Dispatch::Call {
                namespace,
                callable: name,
                arguments: ParsedArguments {
                    positional,
                    keyword,
                },
            })
        }
    }
}
