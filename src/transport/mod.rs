//! Process transport: running manifest callables and launcher scripts.

pub mod local;

use crate::core::types::{ParsedArguments, TypedValue};
use crate::registry::manifest::CallableSpec;
use std::path::Path;

/// Output from running a callable's command.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Render parsed arguments as process arguments.
///
/// Positional values go first; keywords follow as `--name=value`, except
/// booleans, which become `--name` / `--no-name`. Underscores in names turn
/// back into dashes.
pub fn render_arguments(args: &ParsedArguments) -> Vec<String> {
    let mut out: Vec<String> = args.positional.iter().map(TypedValue::to_arg).collect();
    for (name, value) in &args.keyword {
        let flag = name.replace('_', "-");
        match value {
            TypedValue::Boolean(true) => out.push(format!("--{}", flag)),
            TypedValue::Boolean(false) => out.push(format!("--no-{}", flag)),
            other => out.push(format!("--{}={}", flag, other.to_arg())),
        }
    }
    out
}

/// Run a manifest callable with the given arguments, capturing its output.
pub fn run_callable(spec: &CallableSpec, args: &ParsedArguments) -> Result<ExecOutput, String> {
    let (program, fixed) = spec
        .command
        .split_first()
        .ok_or_else(|| "callable has an empty command".to_string())?;
    let mut argv = fixed.to_vec();
    argv.extend(render_arguments(args));
    tracing::debug!(program = %program, args = ?argv, "running callable");
    local::exec_capture(program, &argv)
}

/// Run a launcher script with the raw remaining command line.
pub fn run_launcher(
    script: &Path,
    interpreter: Option<&str>,
    tokens: &[String],
) -> Result<i32, String> {
    let script_arg = script.to_string_lossy().to_string();
    tracing::debug!(script = %script_arg, interpreter = ?interpreter, "running launcher");
    match interpreter {
        Some(program) => {
            let mut argv = vec![script_arg];
            argv.extend(tokens.iter().cloned());
            local::exec_inherit(program, &argv)
        }
        None => local::exec_inherit(&script_arg, tokens),
    }
}
