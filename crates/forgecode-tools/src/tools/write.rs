//! Write tool (§4.3): create or overwrite a file, creating parent
//! directories as needed.

use crate::registry::{ExecutionContext, Tool};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct WriteTool;

#[async_trait]
impl Tool for WriteTool {
    fn name(&self) -> &str {
        "Write"
    }

    fn description(&self) -> &str {
        "Write content to a file in the workspace, creating it (and any parent directories) if \
         it doesn't exist, or overwriting it if it does."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Workspace-relative or absolute path"},
                "content": {"type": "string", "description": "Full file contents to write"}
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ExecutionContext) -> String {
        let Some(path) = args["path"].as_str() else {
            return "Error: missing required parameter 'path'".to_string();
        };
        let Some(content) = args["content"].as_str() else {
            return "Error: missing required parameter 'content'".to_string();
        };

        let resolved = match ctx.guard.resolve(path) {
            Ok(p) => p,
            Err(e) => return e.to_tool_result(),
        };

        if let Some(parent) = resolved.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return format!("Error: {e}");
            }
        }

        match tokio::fs::write(&resolved, content).await {
            Ok(()) => format!("Wrote {} bytes to {}", content.len(), path),
            Err(e) => format!("Error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::WorkspaceGuard;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn ctx(root: &std::path::Path) -> ExecutionContext {
        ExecutionContext::new(
            Arc::new(WorkspaceGuard::new(root)),
            Arc::new(forgecode_core::NullSink),
        )
    }

    #[tokio::test]
    async fn writes_and_reports_byte_count() {
        let dir = tempdir().unwrap();
        let result = WriteTool
            .execute(json!({"path": "a.txt", "content": "hello"}), &ctx(dir.path()))
            .await;
        assert_eq!(result, "Wrote 5 bytes to a.txt");
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "hello");
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        WriteTool
            .execute(json!({"path": "nested/dir/a.txt", "content": "x"}), &ctx(dir.path()))
            .await;
        assert!(dir.path().join("nested/dir/a.txt").exists());
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        WriteTool
            .execute(json!({"path": "a.txt", "content": "hello\n"}), &ctx(dir.path()))
            .await;
        let read_back = super::super::read::ReadTool
            .execute(json!({"path": "a.txt"}), &ctx(dir.path()))
            .await;
        assert_eq!(read_back, "hello");
    }
}
