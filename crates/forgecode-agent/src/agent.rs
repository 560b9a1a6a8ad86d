//! The top-level Agent (§4.8): owns the conversation, the task tracker, and
//! the first-turn reminder injection, and drives the shared turn loop.

use forgecode_core::{AgentConfig, ContentBlock, Conversation, Message, UiSink};
use forgecode_llm::LlmProvider;
use forgecode_tools::task_tracker::INITIAL_REMINDER;
use forgecode_tools::{ExecutionContext, SkillIndex, TaskTracker, ToolRegistry};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::interrupt::InterruptFlag;
use crate::subagent::make_spawn_subagent;
use crate::turn::{run_turn, TurnOutcome, TurnParams};

const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Base system prompt prefix; the skill descriptions layer (§4.7) is
/// appended once at construction.
const BASE_SYSTEM_PROMPT: &str = "You are an interactive coding agent operating inside a sandboxed workspace. \
Use the available tools to read, write, and run commands within the workspace; never attempt to \
escape it. Prefer TaskUpdate to track multi-step work so progress stays visible.";

pub struct Agent {
    conversation: Conversation,
    first_turn: bool,
    interrupt: InterruptFlag,
    tracker: Arc<Mutex<TaskTracker>>,
    skills: Arc<SkillIndex>,
    system_prompt: String,
    registry: ToolRegistry,
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
    ui: Arc<dyn UiSink>,
    guard: Arc<forgecode_tools::WorkspaceGuard>,
}

impl Agent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: ToolRegistry,
        skills: Arc<SkillIndex>,
        config: AgentConfig,
        ui: Arc<dyn UiSink>,
    ) -> Self {
        let guard = Arc::new(forgecode_tools::WorkspaceGuard::new(&config.workdir));
        let system_prompt = format!(
            "{BASE_SYSTEM_PROMPT}\n\n# Available skills\n{}",
            skills.get_descriptions()
        );
        Self {
            conversation: Conversation::new(),
            first_turn: true,
            interrupt: InterruptFlag::new(),
            tracker: Arc::new(Mutex::new(TaskTracker::new())),
            skills,
            system_prompt,
            registry,
            provider,
            config,
            ui,
            guard,
        }
    }

    pub fn interrupt_flag(&self) -> InterruptFlag {
        self.interrupt.clone()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn tracker(&self) -> &Arc<Mutex<TaskTracker>> {
        &self.tracker
    }

    /// `/clear`: resets the conversation and first-turn flag.
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.first_turn = true;
    }

    /// Construct the user turn: on the first top-level turn, prepend the
    /// `CLAUDE.md` system reminder (if present) and the task-tracker's
    /// initial reminder, then append the user's text (§4.8 `build_message`).
    fn build_message(&mut self, user_input: &str) -> Message {
        if !self.first_turn {
            return Message::user_text(user_input);
        }
        self.first_turn = false;

        let mut blocks = Vec::new();
        if let Some(claude_md) = read_claude_md(&self.config.workdir) {
            blocks.push(ContentBlock::text(format!(
                "<system-reminder>\n{claude_md}\n</system-reminder>"
            )));
        }
        blocks.push(ContentBlock::text(INITIAL_REMINDER));
        blocks.push(ContentBlock::text(user_input));
        Message::user_blocks(blocks)
    }

    /// Run one full top-level turn: construct the user message, then drive
    /// the shared loop (§4.8 steps 1–8) until the model stops requesting
    /// tools or the turn is interrupted/fails.
    pub async fn turn(&mut self, user_input: &str) -> TurnOutcome {
        self.interrupt.clear();
        let message = self.build_message(user_input);
        self.conversation.push(message);

        let exec_ctx = ExecutionContext::new(self.guard.clone(), self.ui.clone())
            .with_tracker(self.tracker.clone())
            .with_skills(self.skills.clone())
            .with_spawn(make_spawn_subagent(
                self.provider.clone(),
                self.skills.clone(),
                self.guard.clone(),
                self.config.clone(),
            ));

        let params = TurnParams {
            provider: self.provider.as_ref(),
            registry: &self.registry,
            exec_ctx: &exec_ctx,
            ui: &self.ui,
            model: &self.config.model,
            system_prompt: &self.system_prompt,
            max_tokens: DEFAULT_MAX_TOKENS,
            thinking_budget_tokens: self.config.max_thinking_tokens,
            tracker: Some(&self.tracker),
        };

        run_turn(&params, &mut self.conversation, &self.interrupt).await
    }
}

fn read_claude_md(workdir: &Path) -> Option<String> {
    std::fs::read_to_string(workdir.join("CLAUDE.md")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgecode_core::NullSink;
    use forgecode_llm::{LlmResponse, ScriptedProvider, Usage};
    use forgecode_tools::create_default_registry;
    use tempfile::tempdir;

    fn config(workdir: &Path) -> AgentConfig {
        AgentConfig {
            model: "claude-test".to_string(),
            max_thinking_tokens: 1024,
            api_key: "test-key".to_string(),
            base_url: "http://localhost".to_string(),
            workdir: workdir.to_path_buf(),
        }
    }

    fn end_turn_response(text: &str) -> LlmResponse {
        LlmResponse {
            content: vec![ContentBlock::text(text)],
            stop_reason: "end_turn".to_string(),
            usage: Usage::default(),
        }
    }

    #[tokio::test]
    async fn first_turn_injects_initial_reminder() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![end_turn_response("hi")]));
        let mut agent = Agent::new(
            provider,
            create_default_registry(None),
            Arc::new(SkillIndex::new()),
            config(dir.path()),
            Arc::new(NullSink),
        );

        agent.turn("hello").await;

        let first = agent.conversation().messages().first().unwrap();
        let texts: Vec<&str> = first.content.iter().filter_map(ContentBlock::as_text).collect();
        assert!(texts.contains(&INITIAL_REMINDER));
        assert!(texts.contains(&"hello"));
    }

    #[tokio::test]
    async fn claude_md_is_injected_once_when_present() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("CLAUDE.md"), "Project rules.").unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![
            end_turn_response("first"),
            end_turn_response("second"),
        ]));
        let mut agent = Agent::new(
            provider,
            create_default_registry(None),
            Arc::new(SkillIndex::new()),
            config(dir.path()),
            Arc::new(NullSink),
        );

        agent.turn("one").await;
        agent.turn("two").await;

        let messages = agent.conversation().messages();
        let first_has_reminder = messages[0]
            .content
            .iter()
            .filter_map(ContentBlock::as_text)
            .any(|t| t.contains("Project rules."));
        assert!(first_has_reminder);

        let second_user_message = &messages[2];
        let second_has_reminder = second_user_message
            .content
            .iter()
            .filter_map(ContentBlock::as_text)
            .any(|t| t.contains("Project rules."));
        assert!(!second_has_reminder);
    }

    #[tokio::test]
    async fn clear_resets_conversation_and_first_turn_flag() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![end_turn_response("hi")]));
        let mut agent = Agent::new(
            provider,
            create_default_registry(None),
            Arc::new(SkillIndex::new()),
            config(dir.path()),
            Arc::new(NullSink),
        );
        agent.turn("hello").await;
        agent.clear();
        assert!(agent.conversation().is_empty());

        let provider2 = Arc::new(ScriptedProvider::new(vec![end_turn_response("hi again")]));
        agent.provider = provider2;
        agent.turn("hello again").await;
        let texts: Vec<&str> = agent.conversation().messages()[0]
            .content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect();
        assert!(texts.contains(&INITIAL_REMINDER));
    }

    #[tokio::test]
    async fn nag_reminder_appears_after_eleven_tool_only_turns() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("marker"), "").unwrap();

        let mut responses = Vec::new();
        for _ in 0..11 {
            responses.push(LlmResponse {
                content: vec![ContentBlock::ToolUse {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: "Bash".to_string(),
                    input: serde_json::json!({"command": "ls"}),
                }],
                stop_reason: "tool_use".to_string(),
                usage: Usage::default(),
            });
        }
        responses.push(end_turn_response("done"));
        let provider = Arc::new(ScriptedProvider::new(responses));
        let mut agent = Agent::new(
            provider,
            create_default_registry(None),
            Arc::new(SkillIndex::new()),
            config(dir.path()),
            Arc::new(NullSink),
        );

        agent.turn("keep going").await;

        let has_nag = agent.conversation().messages().iter().any(|m| {
            m.content
                .iter()
                .filter_map(ContentBlock::as_text)
                .any(|t| t.contains("10+ turns without task update"))
        });
        assert!(has_nag);
    }
}
