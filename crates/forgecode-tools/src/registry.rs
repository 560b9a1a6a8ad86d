//! Tool Registry & Dispatch (§4.2).
//!
//! Each tool is a self-contained module implementing [`Tool`]. Dispatch is a
//! static name lookup; handlers catch their own faults and return a plain
//! result string — nothing a handler does ever unwinds into the loop.

use crate::guard::WorkspaceGuard;
use crate::skills::SkillIndex;
use crate::task_tracker::TaskTracker;
use forgecode_core::{ToolDefinition, UiSink};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// Spawns a subagent of the named type with the given prompt, returning its
/// projected result text. `None` in an [`ExecutionContext`] is how a
/// subagent is prevented from spawning further subagents (§4.9).
pub type SpawnSubagent = Arc<
    dyn Fn(String, String) -> Pin<Box<dyn Future<Output = String> + Send>> + Send + Sync,
>;

/// Everything a tool handler needs beyond its own input: the workspace,
/// shared tracker/skill state, the ability to spawn a subagent (or not),
/// and the output sink.
#[derive(Clone)]
pub struct ExecutionContext {
    pub guard: Arc<WorkspaceGuard>,
    pub tracker: Option<Arc<Mutex<TaskTracker>>>,
    pub skills: Option<Arc<SkillIndex>>,
    pub spawn_subagent: Option<SpawnSubagent>,
    pub ui: Arc<dyn UiSink>,
}

impl ExecutionContext {
    pub fn new(guard: Arc<WorkspaceGuard>, ui: Arc<dyn UiSink>) -> Self {
        Self {
            guard,
            tracker: None,
            skills: None,
            spawn_subagent: None,
            ui,
        }
    }

    pub fn with_tracker(mut self, tracker: Arc<Mutex<TaskTracker>>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn with_skills(mut self, skills: Arc<SkillIndex>) -> Self {
        self.skills = Some(skills);
        self
    }

    pub fn with_spawn(mut self, spawn: SpawnSubagent) -> Self {
        self.spawn_subagent = Some(spawn);
        self
    }
}

/// A single tool, self-describing to both the model (name/description/
/// schema) and the registry (read-only flag for subagent policy filtering).
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> Value;

    /// Whether this tool only reads state — used to build the read-only
    /// subset for Explore/Plan subagents, though those are built by name
    /// allowlist rather than by this flag (§4.9).
    fn is_read_only(&self) -> bool {
        false
    }

    /// Execute with the given arguments. Must never panic or return `Err`
    /// across the async boundary — faults are caught and rendered as
    /// `"Error: ..."` strings inside the implementation.
    async fn execute(&self, args: Value, ctx: &ExecutionContext) -> String;

    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Build a new registry containing only the named tools, in the manner
    /// described by §4.2: construct the full map once, then retain a named
    /// slice for a restricted registry rather than re-implementing handlers.
    pub fn restricted(&self, names: &[&str]) -> ToolRegistry {
        let mut restricted = ToolRegistry::new();
        for name in names {
            if let Some(tool) = self.tools.get(*name) {
                restricted.tools.insert(name.to_string(), tool.clone());
            }
        }
        restricted
    }

    /// Dispatch by name. Unknown names are a non-fatal, model-visible result
    /// rather than an error the loop has to handle specially.
    pub async fn execute(&self, name: &str, args: Value, ctx: &ExecutionContext) -> String {
        match self.tools.get(name) {
            Some(tool) => tool.execute(args, ctx).await,
            None => format!("Unknown tool: {name}"),
        }
    }

    pub fn get_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    pub fn list(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }
}
