//! Task tool (§4.9): spawns a bounded, isolated subagent. The actual
//! subagent turn loop lives in `forgecode-agent`; this tool is only the
//! model-facing seam — it forwards to `ctx.spawn_subagent`, which is `None`
//! inside a subagent's own context, enforcing the single-level recursion
//! bound.

use crate::registry::{ExecutionContext, Tool};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct TaskTool;

#[async_trait]
impl Tool for TaskTool {
    fn name(&self) -> &str {
        "Task"
    }

    fn description(&self) -> &str {
        "Launch an isolated subagent to perform a task. `agent_type` selects its capabilities: \
         `Explore` and `Plan` are read-only (Bash, Read); `Code` has the full tool set. Only the \
         subagent's final summary is returned — its tool traffic stays out of this conversation."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "agent_type": {"type": "string", "enum": ["Explore", "Plan", "Code"]},
                "prompt": {"type": "string", "description": "The task for the subagent to perform"}
            },
            "required": ["agent_type", "prompt"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ExecutionContext) -> String {
        let Some(agent_type) = args["agent_type"].as_str() else {
            return "Error: missing required parameter 'agent_type'".to_string();
        };
        let Some(prompt) = args["prompt"].as_str() else {
            return "Error: missing required parameter 'prompt'".to_string();
        };

        let Some(spawn) = &ctx.spawn_subagent else {
            return "Error: subagents cannot spawn further subagents".to_string();
        };

        spawn(agent_type.to_string(), prompt.to_string()).await
    }
}
