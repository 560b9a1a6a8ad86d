//! Glob tool (§4.3): fast file pattern matching with directory pruning.

use crate::guard::{is_pruned_dir_name, WorkspaceGuard};
use crate::registry::{ExecutionContext, Tool};
use async_trait::async_trait;
use globset::GlobBuilder;
use serde_json::{json, Value};
use std::path::PathBuf;
use walkdir::WalkDir;

const MAX_MATCHES: usize = 1000;

pub struct GlobTool;

#[async_trait]
impl Tool for GlobTool {
    fn name(&self) -> &str {
        "Glob"
    }

    fn description(&self) -> &str {
        "Find files matching a glob pattern. Supports ** for recursive matching. Returns paths \
         sorted by modification time, newest first, capped at 1000 matches."
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {"type": "string", "description": "Glob pattern (e.g. '**/*.rs')"},
                "path": {"type": "string", "description": "Directory to search (default: workspace root)"}
            },
            "required": ["pattern"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ExecutionContext) -> String {
        let Some(pattern) = args["pattern"].as_str() else {
            return "Error: missing required parameter 'pattern'".to_string();
        };

        let search_root = match args["path"].as_str() {
            Some(p) => match ctx.guard.resolve(p) {
                Ok(resolved) => resolved,
                Err(e) => return e.to_tool_result(),
            },
            None => ctx.guard.root().to_path_buf(),
        };

        let glob = match GlobBuilder::new(pattern).literal_separator(false).build() {
            Ok(g) => g.compile_matcher(),
            Err(e) => return format!("Error: Invalid glob pattern: {e}"),
        };

        let mut matches: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();

        for entry in WalkDir::new(&search_root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_pruned_dir_name(&e.file_name().to_string_lossy()))
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let rel_path = entry.path().strip_prefix(&search_root).unwrap_or(entry.path());
            if glob.is_match(rel_path) {
                let mtime = entry
                    .metadata()
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
                matches.push((entry.path().to_path_buf(), mtime));
            }
        }

        matches.sort_by(|a, b| b.1.cmp(&a.1));

        if matches.is_empty() {
            return "No files found".to_string();
        }

        let result: Vec<String> = matches
            .into_iter()
            .take(MAX_MATCHES)
            .map(|(p, _)| p.to_string_lossy().to_string())
            .collect();
        WorkspaceGuard::truncate_output(&result.join("\n"))
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
    async fn matches_recursive_pattern() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/a.rs"), "").unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();

        let result = GlobTool.execute(json!({"pattern": "**/*.rs"}), &ctx(dir.path())).await;
        assert!(result.contains("a.rs"));
        assert!(!result.contains("b.txt"));
    }

    #[tokio::test]
    async fn prunes_configured_directories() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules")).unwrap();
        std::fs::write(dir.path().join("node_modules/pkg.js"), "").unwrap();

        let result = GlobTool.execute(json!({"pattern": "**/*.js"}), &ctx(dir.path())).await;
        assert_eq!(result, "No files found");
    }
}
