//! Bash tool (§4.4): a sandboxed subprocess with a timeout and output
//! truncation. Interrupt does not kill an in-flight process (§5) — only this
//! tool's own timeout bounds it.

use crate::guard::WorkspaceGuard;
use crate::registry::{ExecutionContext, Tool};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::process::Command;

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const MAX_TIMEOUT_SECS: u64 = 600;

pub struct BashTool {
    /// The POSIX-ish shell interpreter resolved at construction time
    /// (§9: resolve at start-up rather than branching on OS at call time).
    shell: String,
}

impl BashTool {
    pub fn new() -> Self {
        Self {
            shell: resolve_shell(),
        }
    }
}

impl Default for BashTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Locate a bash-compatible interpreter on `PATH`, falling back to the
/// platform default shell. A faithful rewrite resolves this once rather than
/// hard-coding a single path as the teacher source did for one platform.
fn resolve_shell() -> String {
    for candidate in ["bash", "sh"] {
        if which(candidate) {
            return candidate.to_string();
        }
    }
    if cfg!(windows) {
        "cmd".to_string()
    } else {
        "/bin/sh".to_string()
    }
}

fn which(name: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| {
            std::env::split_paths(&paths).any(|dir| dir.join(name).is_file())
        })
        .unwrap_or(false)
}

#[async_trait]
impl Tool for BashTool {
    fn name(&self) -> &str {
        "Bash"
    }

    fn description(&self) -> &str {
        "Execute a shell command in the workspace directory. Captures combined stdout and \
         stderr. Refuses a short list of catastrophic commands outright."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {"type": "string", "description": "Shell command to run"},
                "timeout": {"type": "integer", "description": "Timeout in seconds (default 60, max 600)"}
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ExecutionContext) -> String {
        let Some(command) = args["command"].as_str() else {
            return "Error: missing required parameter 'command'".to_string();
        };

        if let Err(e) = ctx.guard.check_command(command) {
            return e.to_tool_result();
        }

        let timeout_secs = args["timeout"]
            .as_u64()
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .min(MAX_TIMEOUT_SECS);

        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .current_dir(ctx.guard.root())
            .output();

        match tokio::time::timeout(Duration::from_secs(timeout_secs), child).await {
            Ok(Ok(output)) => format_output(&output),
            Ok(Err(e)) => format!("Error: {e}"),
            Err(_) => format!("Error: Command timed out ({timeout_secs}s)"),
        }
    }
}

fn format_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let mut combined = String::new();
    combined.push_str(stdout.trim_end());
    if !stderr.trim().is_empty() {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(stderr.trim_end());
    }

    if !output.status.success() {
        combined = format!(
            "Exit code: {}\n{combined}",
            output.status.code().unwrap_or(-1)
        );
    }

    let combined = combined.trim();
    if combined.is_empty() {
        "(no output)".to_string()
    } else {
        WorkspaceGuard::truncate_output(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn ctx(root: &std::path::Path) -> ExecutionContext {
        ExecutionContext::new(
            Arc::new(WorkspaceGuard::new(root)),
            Arc::new(forgecode_core::NullSink),
        )
    }

    #[tokio::test]
    async fn runs_in_workspace_directory() {
        let dir = tempdir().unwrap();
        let result = BashTool::new().execute(json!({"command": "pwd"}), &ctx(dir.path())).await;
        assert!(result.contains(&dir.path().canonicalize().unwrap().to_string_lossy().to_string())
            || result.contains(&dir.path().to_string_lossy().to_string()));
    }

    #[tokio::test]
    async fn empty_output_becomes_placeholder() {
        let dir = tempdir().unwrap();
        let result = BashTool::new().execute(json!({"command": "true"}), &ctx(dir.path())).await;
        assert_eq!(result, "(no output)");
    }

    #[tokio::test]
    async fn dangerous_command_is_refused() {
        let dir = tempdir().unwrap();
        let result = BashTool::new()
            .execute(json!({"command": "sudo rm -rf /"}), &ctx(dir.path()))
            .await;
        assert!(result.starts_with("Error"));
    }

    #[tokio::test]
    async fn timeout_is_reported() {
        let dir = tempdir().unwrap();
        let result = BashTool::new()
            .execute(json!({"command": "sleep 5", "timeout": 1}), &ctx(dir.path()))
            .await;
        assert_eq!(result, "Error: Command timed out (1s)");
    }

    #[tokio::test]
    async fn nonzero_exit_reports_code() {
        let dir = tempdir().unwrap();
        let result = BashTool::new().execute(json!({"command": "exit 3"}), &ctx(dir.path())).await;
        assert!(result.contains("Exit code: 3"));
    }
}
