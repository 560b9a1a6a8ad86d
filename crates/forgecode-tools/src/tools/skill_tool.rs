//! Skill tool (§4.7): the on-demand body layer. The description layer is
//! injected directly into the system prompt by the agent core; this tool is
//! how the model loads a skill's full body when it decides to use one.

use crate::registry::{ExecutionContext, Tool};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct SkillTool;

#[async_trait]
impl Tool for SkillTool {
    fn name(&self) -> &str {
        "Skill"
    }

    fn description(&self) -> &str {
        "Load the full body of a named skill. Use after consulting the skill descriptions in \
         the system prompt to decide which one applies."
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Skill name from the descriptions list"}
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ExecutionContext) -> String {
        let Some(name) = args["name"].as_str() else {
            return "Error: missing required parameter 'name'".to_string();
        };
        let Some(skills) = &ctx.skills else {
            return "Error: skill index not available in this context".to_string();
        };

        match skills.get_skill(name) {
            Ok(body) => format!(
                "<skill-loaded name=\"{name}\">\n{body}\n</skill-loaded>\n\nFollow the instructions above to complete the task."
            ),
            Err(e) => e.to_tool_result(),
        }
    }
}
