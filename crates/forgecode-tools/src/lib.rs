//! Tool Registry & Dispatch, the Workspace Guard, the Task Tracker, the
//! Skill Index, and the individual tool implementations (§4.1–§4.9).

pub mod guard;
pub mod registry;
pub mod skills;
pub mod task_tracker;
pub mod tools;

pub use guard::WorkspaceGuard;
pub use registry::{ExecutionContext, SpawnSubagent, Tool, ToolRegistry};
pub use skills::SkillIndex;
pub use task_tracker::TaskTracker;
pub use tools::web::{NullSearchProvider, SearchProvider, SearchResult};

use std::path::Path;
use std::sync::Arc;

/// Names of every tool the top-level agent registers (§4.2).
pub const ALL_TOOL_NAMES: &[&str] = &[
    "Bash", "Read", "Write", "Edit", "Glob", "Grep", "WebSearch", "WebReader", "TaskUpdate",
    "Task", "Skill",
];

/// Read-only tool set for `Explore`/`Plan` subagents (§4.9).
pub const READ_ONLY_SUBAGENT_TOOLS: &[&str] = &["Bash", "Read"];

/// Full tool set minus `Task` for `Code` subagents (§4.9): subagents never
/// receive the ability to spawn further subagents, which is the single-level
/// recursion bound.
pub const CODE_SUBAGENT_TOOLS: &[&str] = &[
    "Bash", "Read", "Write", "Edit", "Glob", "Grep", "WebSearch", "WebReader", "TaskUpdate",
    "Skill",
];

/// Build the full registry the top-level agent uses. `search_provider`
/// plugs in a real search backend; pass `None` to fall back to
/// [`NullSearchProvider`], which degrades WebSearch to an error string
/// rather than panicking when no backend is configured.
pub fn create_default_registry(search_provider: Option<Arc<dyn SearchProvider>>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(tools::read::ReadTool);
    registry.register(tools::write::WriteTool);
    registry.register(tools::edit::EditTool);
    registry.register(tools::glob::GlobTool);
    registry.register(tools::grep::GrepTool);
    registry.register(tools::bash::BashTool::new());
    registry.register(tools::web::WebSearchTool::new(
        search_provider.unwrap_or_else(|| Arc::new(NullSearchProvider)),
    ));
    registry.register(tools::web::WebReaderTool::new());
    registry.register(tools::task_update::TaskUpdateTool);
    registry.register(tools::task_tool::TaskTool);
    registry.register(tools::skill_tool::SkillTool);
    registry
}

/// Workspace Guard keyed off a workspace root. Thin convenience for callers
/// that just need the guard without the full registry.
pub fn workspace_guard(root: impl AsRef<Path>) -> WorkspaceGuard {
    WorkspaceGuard::new(root.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_contains_every_required_tool() {
        let registry = create_default_registry(None);
        for name in ALL_TOOL_NAMES {
            assert!(registry.get(name).is_some(), "missing tool {name}");
        }
    }

    #[test]
    fn restricted_registries_match_subagent_policy() {
        let registry = create_default_registry(None);

        let read_only = registry.restricted(READ_ONLY_SUBAGENT_TOOLS);
        assert_eq!(read_only.list().len(), 2);
        assert!(read_only.get("Task").is_none());

        let code = registry.restricted(CODE_SUBAGENT_TOOLS);
        assert!(code.get("Task").is_none());
        assert!(code.get("Bash").is_some());
        assert!(code.get("Write").is_some());
    }
}
