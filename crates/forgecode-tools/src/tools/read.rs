//! Read tool (§4.3): workspace-guarded file reads with optional line limit.

use crate::guard::WorkspaceGuard;
use crate::registry::{ExecutionContext, Tool};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct ReadTool;

#[async_trait]
impl Tool for ReadTool {
    fn name(&self) -> &str {
        "Read"
    }

    fn description(&self) -> &str {
        "Read the contents of a file in the workspace. If the file has more lines than `limit`, \
         the first `limit` lines are returned followed by a count of the remaining lines."
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Workspace-relative or absolute path"},
                "limit": {"type": "integer", "description": "Maximum number of lines to return"}
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ExecutionContext) -> String {
        let Some(path) = args["path"].as_str() else {
            return "Error: missing required parameter 'path'".to_string();
        };

        let resolved = match ctx.guard.resolve(path) {
            Ok(p) => p,
            Err(e) => return e.to_tool_result(),
        };

        let raw = match tokio::fs::read_to_string(&resolved).await {
            Ok(contents) => contents,
            Err(e) => return format!("Error: {e}"),
        };
        let normalized = raw.replace("\r\n", "\n");

        let limit = args["limit"].as_u64().map(|l| l as usize);
        let body = match limit {
            Some(limit) => {
                let lines: Vec<&str> = normalized.lines().collect();
                if limit < lines.len() {
                    let shown = lines[..limit].join("\n");
                    format!("{shown}\n... ({} more lines)", lines.len() - limit)
                } else {
                    normalized.clone()
                }
            }
            None => normalized.clone(),
        };

        WorkspaceGuard::truncate_output(&body)
    }
}
