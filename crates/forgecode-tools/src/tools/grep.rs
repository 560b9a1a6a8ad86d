//! Grep tool (§4.3): regex content search over the workspace, with the same
//! directory pruning as Glob and three output shapes the model can choose
//! between.

use crate::guard::{is_pruned_dir_name, WorkspaceGuard};
use crate::registry::{ExecutionContext, Tool};
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde_json::{json, Value};
use std::path::PathBuf;
use walkdir::WalkDir;

pub struct GrepTool;

#[async_trait]
impl Tool for GrepTool {
    fn name(&self) -> &str {
        "Grep"
    }

    fn description(&self) -> &str {
        "Search file contents with a regular expression. `output_mode` selects between matching \
         file paths, per-file match counts, or matching lines with line numbers."
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {"type": "string", "description": "Regular expression to search for"},
                "path": {"type": "string", "description": "Directory to search (default: workspace root)"},
                "output_mode": {
                    "type": "string",
                    "enum": ["content", "files_with_matches", "count"],
                    "description": "Output shape (default: files_with_matches)"
                },
                "glob": {"type": "string", "description": "Filename glob filter, e.g. '*.rs'"},
                "i": {"type": "boolean", "description": "Case insensitive"},
                "n": {"type": "boolean", "description": "Include line numbers in content mode (default true)"},
                "head_limit": {"type": "integer", "description": "Maximum results to return"},
                "offset": {"type": "integer", "description": "Results to skip before applying head_limit"}
            },
            "required": ["pattern"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ExecutionContext) -> String {
        let Some(pattern) = args["pattern"].as_str() else {
            return "Error: missing required parameter 'pattern'".to_string();
        };

        let case_insensitive = args["i"].as_bool().unwrap_or(false);
        let regex: Regex = match RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
        {
            Ok(r) => r,
            Err(_) => return format!("Error: Invalid regex pattern: {pattern}"),
        };

        let search_root = match args["path"].as_str() {
            Some(p) => match ctx.guard.resolve(p) {
                Ok(resolved) => resolved,
                Err(e) => return e.to_tool_result(),
            },
            None => ctx.guard.root().to_path_buf(),
        };

        let output_mode = args["output_mode"].as_str().unwrap_or("files_with_matches");
        let show_line_numbers = args["n"].as_bool().unwrap_or(true);
        let head_limit = args["head_limit"].as_u64().map(|v| v as usize);
        let offset = args["offset"].as_u64().unwrap_or(0) as usize;

        let file_glob = match args["glob"].as_str() {
            Some(g) => match globset::GlobBuilder::new(g).literal_separator(false).build() {
                Ok(g) => Some(g.compile_matcher()),
                Err(e) => return format!("Error: Invalid glob pattern: {e}"),
            },
            None => None,
        };

        let files = enumerate_files(&search_root, file_glob.as_ref());

        let early_exit_at = head_limit.map(|h| h + offset);

        match output_mode {
            "files_with_matches" => {
                let mut matched: Vec<String> = Vec::new();
                for file in &files {
                    if let Some(content) = read_text(file) {
                        if regex.is_match(&content) {
                            matched.push(file.to_string_lossy().to_string());
                        }
                    }
                }
                matched.sort();
                matched.dedup();
                render(matched, offset, head_limit)
            }
            "count" => {
                let mut counted: Vec<(String, usize)> = Vec::new();
                for file in &files {
                    if let Some(content) = read_text(file) {
                        let count = content.lines().filter(|line| regex.is_match(line)).count();
                        if count > 0 {
                            counted.push((file.to_string_lossy().to_string(), count));
                        }
                    }
                }
                counted.sort_by(|a, b| a.0.cmp(&b.0));
                let lines = counted
                    .into_iter()
                    .map(|(path, count)| format!("{path}:{count}"))
                    .collect();
                render(lines, offset, head_limit)
            }
            "content" | _ => {
                let mut lines: Vec<String> = Vec::new();
                'files: for file in &files {
                    let Some(content) = read_text(file) else {
                        continue;
                    };
                    let path_str = file.to_string_lossy();
                    for (idx, line) in content.lines().enumerate() {
                        if regex.is_match(line) {
                            let formatted = if show_line_numbers {
                                format!("{path_str}:{}:{line}", idx + 1)
                            } else {
                                format!("{path_str}:{line}")
                            };
                            lines.push(formatted);
                            if let Some(limit) = early_exit_at {
                                if lines.len() >= limit {
                                    break 'files;
                                }
                            }
                        }
                    }
                }
                render(lines, offset, head_limit)
            }
        }
    }
}

fn enumerate_files(root: &std::path::Path, glob: Option<&globset::GlobMatcher>) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if root.is_file() {
        let matches = match glob {
            Some(g) => g.is_match(root.file_name().unwrap_or_default()),
            None => true,
        };
        if matches {
            files.push(root.to_path_buf());
        }
        return files;
    }

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_pruned_dir_name(&e.file_name().to_string_lossy()))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(glob) = glob {
            if !glob.is_match(entry.file_name()) {
                continue;
            }
        }
        files.push(entry.path().to_path_buf());
    }
    files
}

fn read_text(path: &std::path::Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    if bytes.iter().take(512).any(|b| *b == 0) {
        return None;
    }
    String::from_utf8(bytes).ok()
}

fn render(mut lines: Vec<String>, offset: usize, head_limit: Option<usize>) -> String {
    if offset > 0 {
        lines = lines.into_iter().skip(offset).collect();
    }
    if let Some(limit) = head_limit {
        lines.truncate(limit);
    }
    if lines.is_empty() {
        "No matches found".to_string()
    } else {
        WorkspaceGuard::truncate_output(&lines.join("\n"))
    }
}
