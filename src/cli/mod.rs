//! CLI glue: options, diagnostic printing, dispatch and result rendering.

use crate::core::engine::{self, EngineOptions};
use crate::core::literal;
use crate::core::resolver::NamespaceTree;
use crate::core::types::{qualified_name, Dispatch, TypedValue};
use crate::registry::{self, Registry};
use crate::transport;
use clap::Args;
use std::path::{Path, PathBuf};

const PRETTY_WIDTH: usize = 80;

/// Options for one run. Everything from the first positional onward is the
/// command line handed to the engine.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the namespace manifest
    #[arg(long, env = "NSCALL_MANIFEST", default_value = "nscall.yaml")]
    pub manifest: PathBuf,

    /// Print the resolved target and parsed arguments instead of calling
    #[arg(long)]
    pub parse_only: bool,

    /// Print --parse-only output as JSON
    #[arg(long, requires = "parse_only")]
    pub json: bool,

    /// List namespaces, callables and launchers
    #[arg(long, conflicts_with = "parse_only")]
    pub list: bool,

    /// Print the manifest path in use and exit
    #[arg(long)]
    pub manifest_path: bool,

    /// Namespace path, callable and arguments
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

/// Run the CLI. Returns the process exit code.
pub fn dispatch(args: RunArgs) -> Result<i32, String> {
    if args.manifest_path {
        println!("{}", display_path(&args.manifest));
        return Ok(0);
    }

    let registry = load_for(&args)?;
    if args.list {
        print!("{}", format_tree(&registry));
        return Ok(0);
    }

    let argv: Vec<String> = std::iter::once(env!("CARGO_PKG_NAME").to_string())
        .chain(args.command)
        .collect();
    let options = EngineOptions {
        parse_only: args.parse_only,
    };
    let dispatch =
        engine::parse_command_line(&argv, &registry, options).map_err(|e| e.to_string())?;

    if args.parse_only {
        println!("{}", format_parsed(registry.root(), &dispatch, args.json)?);
        return Ok(0);
    }
    execute(&registry, dispatch)
}

/// Load the manifest; parse-only runs tolerate a missing file.
fn load_for(args: &RunArgs) -> Result<Registry, String> {
    if args.parse_only && !args.manifest.exists() {
        tracing::warn!(
            manifest = %args.manifest.display(),
            "manifest not found, parsing against an empty tree"
        );
        return Ok(Registry::new(env!("CARGO_PKG_NAME")));
    }
    registry::load_registry(&args.manifest)
}

fn display_path(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn execute(registry: &Registry, dispatch: Dispatch) -> Result<i32, String> {
    match dispatch {
        Dispatch::Launcher {
            namespace,
            script,
            tokens,
        } => transport::run_launcher(&script, registry.interpreter(&namespace), &tokens),
        Dispatch::Call {
            namespace,
            callable,
            arguments,
        } => {
            let full_name = qualified_name(registry.root(), &qualified_name(&namespace, &callable));
            let spec = registry
                .callable(&namespace, &callable)
                .ok_or_else(|| format!("unknown callable {}", full_name))?;
            let out = transport::run_callable(spec, &arguments)?;
            if !out.stderr.is_empty() {
                eprint!("{}", out.stderr);
            }
            if !out.success() {
                return Err(format!("{} exited with status {}", full_name, out.exit_code));
            }
            let result = if spec.literal_output {
                literal::coerce(out.stdout.trim_end()).map_err(|e| e.to_string())?
            } else {
                TypedValue::String(out.stdout)
            };
            if let Some(text) = render_result(&result) {
                print!("{}", text);
                if !text.ends_with('\n') {
                    println!();
                }
            }
            Ok(0)
        }
    }
}

/// Text shown for a call result: nothing when empty, strings verbatim,
/// everything else pretty-printed.
pub fn render_result(value: &TypedValue) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    match value {
        TypedValue::String(s) => Some(s.clone()),
        other => Some(pretty(other)),
    }
}

/// Structural pretty-printer. Aggregates wider than the page are broken one
/// element per line, aligned after the opening bracket.
pub fn pretty(value: &TypedValue) -> String {
    let mut out = String::new();
    pretty_into(value, 0, &mut out);
    out
}

fn pretty_into(value: &TypedValue, indent: usize, out: &mut String) {
    let flat = value.to_string();
    if value.is_empty() || indent + flat.chars().count() <= PRETTY_WIDTH {
        out.push_str(&flat);
        return;
    }
    match value {
        TypedValue::List(items) => pretty_block("[", "]", items.iter().map(|v| (None, v)), indent, out),
        TypedValue::Tuple(items) => {
            let close = if items.len() == 1 { ",)" } else { ")" };
            pretty_block("(", close, items.iter().map(|v| (None, v)), indent, out)
        }
        TypedValue::Set(items) => pretty_block("{", "}", items.iter().map(|v| (None, v)), indent, out),
        TypedValue::Mapping(pairs) => {
            pretty_block("{", "}", pairs.iter().map(|(k, v)| (Some(k), v)), indent, out)
        }
        _ => out.push_str(&flat),
    }
}

fn pretty_block<'a>(
    open: &str,
    close: &str,
    entries: impl Iterator<Item = (Option<&'a TypedValue>, &'a TypedValue)>,
    indent: usize,
    out: &mut String,
) {
    out.push_str(open);
    let inner = indent + open.len();
    for (i, (key, value)) in entries.enumerate() {
        if i > 0 {
            out.push_str(",\n");
            out.push_str(&" ".repeat(inner));
        }
        let mut column = inner;
        if let Some(key) = key {
            let key = key.to_string();
            column += key.chars().count() + 2;
            out.push_str(&key);
            out.push_str(": ");
        }
        pretty_into(value, column, out);
    }
    out.push_str(close);
}

/// Describe a dispatch for --parse-only.
pub fn format_parsed(root: &str, dispatch: &Dispatch, json: bool) -> Result<String, String> {
    let target = qualified_name(root, &dispatch.target_name());
    match dispatch {
        Dispatch::Call { arguments, .. } => {
            if json {
                let doc = serde_json::json!({
                    "target": target,
                    "positional": arguments.positional,
                    "keyword": arguments.keyword,
                });
                return serde_json::to_string_pretty(&doc)
                    .map_err(|e| format!("JSON serialize error: {}", e));
            }
            let mut lines = vec![format!("target: {}", target)];
            lines.push(format!("positional: {}", arguments.positional.len()));
            for (i, value) in arguments.positional.iter().enumerate() {
                lines.push(format!("  [{}] {} ({})", i, value, value.kind()));
            }
            lines.push(format!("keyword: {}", arguments.keyword.len()));
            for (name, value) in &arguments.keyword {
                lines.push(format!("  {} = {} ({})", name, value, value.kind()));
            }
            Ok(lines.join("\n"))
        }
        Dispatch::Launcher { script, tokens, .. } => {
            if json {
                let doc = serde_json::json!({
                    "target": target,
                    "launcher": script.display().to_string(),
                    "tokens": tokens,
                });
                return serde_json::to_string_pretty(&doc)
                    .map_err(|e| format!("JSON serialize error: {}", e));
            }
            Ok(format!(
                "target: {}\nlauncher: {}\ntokens: {:?}",
                target,
                script.display(),
                tokens
            ))
        }
    }
}

/// Render the namespace tree for --list.
pub fn format_tree(registry: &Registry) -> String {
    let mut out = String::new();
    for (path, ns) in registry.namespaces() {
        if path.is_empty() && ns.callables.is_empty() && ns.launcher.is_none() {
            continue;
        }
        out.push_str(&qualified_name(registry.root(), path));
        if let Some(launcher) = &ns.launcher {
            out.push_str(&format!(" [launcher: {}", launcher.display()));
            if let Some(interpreter) = registry.interpreter(path) {
                out.push_str(&format!(" via {}", interpreter));
            }
            out.push(']');
        }
        if let Some(desc) = &ns.description {
            out.push_str(&format!(" - {}", desc));
        }
        out.push('\n');
        for (name, callable) in &ns.callables {
            match &callable.description {
                Some(desc) => out.push_str(&format!("  {} - {}\n", name, desc)),
                None => out.push_str(&format!("  {}\n", name)),
            }
        }
    }
    if out.is_empty() {
        out.push_str(&format!("{}: no namespaces registered\n", registry.root()));
    }
    out
}
