//! Edit tool (§4.3): replace the first occurrence of an exact string in a
//! file. Deliberately not "replace all" — a safety brake against unintended
//! mass edits.

use crate::registry::{ExecutionContext, Tool};
use async_trait::async_trait;
use forgecode_core::Error;
use serde_json::{json, Value};

pub struct EditTool;

#[async_trait]
impl Tool for EditTool {
    fn name(&self) -> &str {
        "Edit"
    }

    fn description(&self) -> &str {
        "Replace the first occurrence of `old_text` with `new_text` in a file. Fails if \
         `old_text` is not found."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Workspace-relative or absolute path"},
                "old_text": {"type": "string", "description": "Exact text to find"},
                "new_text": {"type": "string", "description": "Replacement text"}
            },
            "required": ["path", "old_text", "new_text"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ExecutionContext) -> String {
        let Some(path) = args["path"].as_str() else {
            return "Error: missing required parameter 'path'".to_string();
        };
        let Some(old_text) = args["old_text"].as_str() else {
            return "Error: missing required parameter 'old_text'".to_string();
        };
        let Some(new_text) = args["new_text"].as_str() else {
            return "Error: missing required parameter 'new_text'".to_string();
        };

        let resolved = match ctx.guard.resolve(path) {
            Ok(p) => p,
            Err(e) => return e.to_tool_result(),
        };

        let contents = match tokio::fs::read_to_string(&resolved).await {
            Ok(c) => c,
            Err(e) => return format!("Error: {e}"),
        };

        let Some(index) = contents.find(old_text) else {
            return Error::EditTextNotFound {
                path: path.to_string(),
            }
            .to_tool_result();
        };

        let mut replaced = String::with_capacity(contents.len());
        replaced.push_str(&contents[..index]);
        replaced.push_str(new_text);
        replaced.push_str(&contents[index + old_text.len()..]);

        match tokio::fs::write(&resolved, replaced).await {
            Ok(()) => format!("Edited {path}"),
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
    async fn replaces_only_first_occurrence() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "hello hello hello").unwrap();
        let result = EditTool
            .execute(
                json!({"path": "f.txt", "old_text": "hello", "new_text": "bye"}),
                &ctx(dir.path()),
            )
            .await;
        assert_eq!(result, "Edited f.txt");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("f.txt")).unwrap(),
            "bye hello hello"
        );
    }

    #[tokio::test]
    async fn missing_old_text_errors() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "hello").unwrap();
        let result = EditTool
            .execute(
                json!({"path": "f.txt", "old_text": "nope", "new_text": "x"}),
                &ctx(dir.path()),
            )
            .await;
        assert!(result.starts_with("Error"));
        assert!(result.contains("Text not found"));
    }

    #[tokio::test]
    async fn replacing_with_identical_text_is_a_no_op() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "stable").unwrap();
        EditTool
            .execute(
                json!({"path": "f.txt", "old_text": "stable", "new_text": "stable"}),
                &ctx(dir.path()),
            )
            .await;
        assert_eq!(std::fs::read_to_string(dir.path().join("f.txt")).unwrap(), "stable");
    }
}
