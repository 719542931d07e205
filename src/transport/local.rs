//! Local process execution.

use super::ExecOutput;
use std::process::{Command, Stdio};

/// Run a program to completion, capturing stdout and stderr.
pub fn exec_capture(program: &str, args: &[String]) -> Result<ExecOutput, String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| format!("failed to spawn {}: {}", program, e))?;

    Ok(ExecOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Run a program attached to our own stdio. Returns its exit code.
pub fn exec_inherit(program: &str, args: &[String]) -> Result<i32, String> {
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|e| format!("failed to spawn {}: {}", program, e))?;
    Ok(status.code().unwrap_or(-1))
}
