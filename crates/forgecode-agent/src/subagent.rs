//! Subagent Runner (§4.9): builds the `spawn_subagent` callback the Task
//! tool invokes. Each spawned subagent gets an isolated single-message
//! conversation, a policy-filtered tool registry, no task tracker, and no
//! ability to spawn further subagents — enforcing the recursion depth of 1.

use forgecode_core::{AgentConfig, ContentBlock, Conversation, Error, Message, NullSink, UiSink};
use forgecode_llm::LlmProvider;
use forgecode_tools::{
    ExecutionContext, SkillIndex, ToolRegistry, WorkspaceGuard, CODE_SUBAGENT_TOOLS,
    READ_ONLY_SUBAGENT_TOOLS,
};
use std::sync::Arc;
use tracing::info;

use crate::interrupt::InterruptFlag;
use crate::turn::{run_turn, TurnOutcome, TurnParams};

const DEFAULT_MAX_TOKENS: u32 = 8192;

/// The only `agent_type` values the Task tool accepts. Anything else is
/// rejected with `Error::UnknownAgentType` rather than silently falling back
/// to a default tool set.
const VALID_AGENT_TYPES: &[&str] = &["Explore", "Plan", "Code"];

fn system_prompt_for(agent_type: &str, workdir: &std::path::Path) -> String {
    let instruction = match agent_type {
        "Explore" => "Investigate the codebase and answer the question. You have read-only tools: \
                      use Bash and Read to inspect files and run non-mutating commands.",
        "Plan" => "Design an approach to the task without making changes. You have read-only tools: \
                   use Bash and Read to inspect the codebase before proposing a plan.",
        "Code" => "Complete the requested change using the full tool set available to you.",
        other => unreachable!("unvalidated agent_type reached system_prompt_for: {other}"),
    };
    format!(
        "You are a {agent_type} subagent at {}.\n\n{instruction}\n\nComplete the task and return \
         a clear, concise summary.",
        workdir.display()
    )
}

fn registry_for(agent_type: &str, base: &ToolRegistry) -> ToolRegistry {
    match agent_type {
        "Explore" | "Plan" => base.restricted(READ_ONLY_SUBAGENT_TOOLS),
        "Code" => base.restricted(CODE_SUBAGENT_TOOLS),
        other => unreachable!("unvalidated agent_type reached registry_for: {other}"),
    }
}

/// Project a finished subagent conversation down to the text the Task tool
/// returns to the caller (§4.9 "Projection").
fn project_result(conversation: &Conversation, outcome: &TurnOutcome, tool_calls: usize) -> String {
    match outcome {
        TurnOutcome::Interrupted => {
            format!("(subagent interrupted by user after {tool_calls} tool calls)")
        }
        TurnOutcome::TransportError(e) => format!("(subagent failed: {e})"),
        TurnOutcome::Completed => conversation
            .last()
            .and_then(Message::first_text)
            .map(str::to_string)
            .unwrap_or_else(|| "(subagent returned no text)".to_string()),
    }
}

/// Build the closure installed as `ExecutionContext::spawn_subagent` on the
/// top-level agent's context. The closure itself has no `spawn_subagent` of
/// its own to hand to the subagent's context, which is precisely the
/// recursion bound.
pub fn make_spawn_subagent(
    provider: Arc<dyn LlmProvider>,
    skills: Arc<SkillIndex>,
    guard: Arc<WorkspaceGuard>,
    config: AgentConfig,
) -> forgecode_tools::SpawnSubagent {
    // The base registry the subagent's policy-filtered view is carved from.
    // Subagents never receive a search provider override; `None` degrades
    // WebSearch to the null provider, matching the top-level default when
    // none is configured.
    let base_registry = Arc::new(forgecode_tools::create_default_registry(None));

    Arc::new(move |agent_type: String, prompt: String| {
        let provider = provider.clone();
        let skills = skills.clone();
        let guard = guard.clone();
        let config = config.clone();
        let base_registry = base_registry.clone();
        Box::pin(async move {
            run_subagent(&agent_type, &prompt, provider, skills, guard, config, &base_registry)
                .await
        })
    })
}

async fn run_subagent(
    agent_type: &str,
    prompt: &str,
    provider: Arc<dyn LlmProvider>,
    skills: Arc<SkillIndex>,
    guard: Arc<WorkspaceGuard>,
    config: AgentConfig,
    base_registry: &ToolRegistry,
) -> String {
    if !VALID_AGENT_TYPES.contains(&agent_type) {
        return Error::UnknownAgentType(agent_type.to_string()).to_tool_result();
    }

    info!(agent_type, "spawning subagent");

    let registry = registry_for(agent_type, base_registry);
    let system_prompt = system_prompt_for(agent_type, &config.workdir);
    let ui: Arc<dyn UiSink> = Arc::new(NullSink);

    let mut conversation = Conversation::new();
    conversation.push(Message::user_text(prompt));

    let exec_ctx = ExecutionContext::new(guard, ui.clone()).with_skills(skills);

    let interrupt = InterruptFlag::new();
    let params = TurnParams {
        provider: provider.as_ref(),
        registry: &registry,
        exec_ctx: &exec_ctx,
        ui: &ui,
        model: &config.model,
        system_prompt: &system_prompt,
        max_tokens: DEFAULT_MAX_TOKENS,
        thinking_budget_tokens: config.max_thinking_tokens,
        tracker: None,
    };

    let outcome = run_turn(&params, &mut conversation, &interrupt).await;
    let tool_calls = conversation
        .messages()
        .iter()
        .map(|m| m.tool_uses().len())
        .sum();
    info!(agent_type, tool_calls, "subagent completed");
    project_result(&conversation, &outcome, tool_calls)
}
