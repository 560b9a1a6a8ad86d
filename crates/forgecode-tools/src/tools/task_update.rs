//! TaskUpdate tool (§4.6): the model-facing surface over the Task Tracker.

use crate::registry::{ExecutionContext, Tool};
use crate::task_tracker::Task;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct TaskUpdateTool;

#[async_trait]
impl Tool for TaskUpdateTool {
    fn name(&self) -> &str {
        "TaskUpdate"
    }

    fn description(&self) -> &str {
        "Replace the full task list. Use for multi-step work so progress is visible. At most \
         one task may be `in_progress` at a time, and at most 20 tasks total."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "tasks": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "content": {"type": "string"},
                            "status": {"type": "string", "enum": ["pending", "in_progress", "completed"]},
                            "active_form": {"type": "string"}
                        },
                        "required": ["content", "status", "active_form"]
                    }
                }
            },
            "required": ["tasks"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ExecutionContext) -> String {
        let Some(tracker) = &ctx.tracker else {
            return "Error: task tracker not available in this context".to_string();
        };

        let tasks: Vec<Task> = match args["tasks"].clone() {
            Value::Array(items) => {
                match items
                    .into_iter()
                    .map(serde_json::from_value)
                    .collect::<Result<Vec<Task>, _>>()
                {
                    Ok(tasks) => tasks,
                    Err(e) => return format!("Error: invalid task entry: {e}"),
                }
            }
            _ => return "Error: missing required parameter 'tasks'".to_string(),
        };

        let mut tracker = tracker.lock().unwrap();
        match tracker.update(tasks) {
            Ok(rendered) => rendered,
            Err(e) => e.to_tool_result(),
        }
    }
}
