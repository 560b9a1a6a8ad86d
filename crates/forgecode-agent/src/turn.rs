//! The turn loop shared by the top-level agent (§4.8) and the subagent
//! runner (§4.9). Both drive the same state machine; the only difference is
//! whether a task tracker is wired in and whether the first-turn reminders
//! are injected before the loop starts (that part lives in `agent.rs`).

use forgecode_core::{ContentBlock, Conversation, Message, Style, UiSink};
use forgecode_llm::{LlmProvider, LlmRequest};
use forgecode_tools::{ExecutionContext, ToolRegistry};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{info, warn};

use crate::interrupt::InterruptFlag;

/// `<system_notification type="task_interrupted">` text, verbatim per §4.8's
/// cancellation contract.
pub const INTERRUPT_NOTIFICATION: &str = "<system_notification type=\"task_interrupted\">The user interrupted this task. Acknowledge the interruption and summarize what was completed so far.</system_notification>";

/// How a call to [`run_turn`] ended.
pub enum TurnOutcome {
    /// The model returned a stop reason other than `tool_use`; the turn is
    /// complete and the conversation holds the full exchange.
    Completed,
    /// The interrupt flag was observed set at one of the three poll points.
    /// The conversation has a synthesized notification appended as its final
    /// message; `ui.interrupted()` has already been called.
    Interrupted,
    /// The model request itself failed. The turn ends without appending
    /// anything further; the caller decides whether to retry or give up.
    TransportError(String),
}

pub struct TurnParams<'a> {
    pub provider: &'a dyn LlmProvider,
    pub registry: &'a ToolRegistry,
    pub exec_ctx: &'a ExecutionContext,
    pub ui: &'a Arc<dyn UiSink>,
    pub model: &'a str,
    pub system_prompt: &'a str,
    pub max_tokens: u32,
    pub thinking_budget_tokens: u32,
    /// `Some` only for the top-level agent; drives the reset/increment/nag
    /// policy in §4.6. Subagents pass `None` and never nag.
    pub tracker: Option<&'a Arc<Mutex<forgecode_tools::TaskTracker>>>,
}

/// Drive the agent loop until the model stops requesting tools, the
/// interrupt flag fires, or the transport fails. Mutates `conversation` in
/// place; appends exactly the messages described in §4.8 steps 2–8.
pub async fn run_turn(
    params: &TurnParams<'_>,
    conversation: &mut Conversation,
    interrupt: &InterruptFlag,
) -> TurnOutcome {
    loop {
        // (1) poll before each model call
        if interrupt.is_set() {
            return finalize_interrupted(conversation, params.ui);
        }

        let request = LlmRequest {
            model: params.model.to_string(),
            system: Some(params.system_prompt.to_string()),
            messages: conversation.messages().to_vec(),
            tools: params.registry.get_definitions(),
            max_tokens: params.max_tokens,
            thinking_budget_tokens: params.thinking_budget_tokens,
        };

        let started = Instant::now();
        let response = match params.provider.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("model request failed: {e}");
                params.ui.styled_write(Style::Error, &format!("Model request failed: {e}"));
                return TurnOutcome::TransportError(e.to_string());
            }
        };
        let elapsed = started.elapsed();

        // (2) poll after each model call
        if interrupt.is_set() {
            return finalize_interrupted(conversation, params.ui);
        }

        for thinking in response.thinking_blocks() {
            params.ui.thinking(thinking, elapsed);
        }
        let text = response.text();
        if !text.is_empty() {
            params.ui.response(&text);
        }
        let tool_uses: Vec<(String, String, serde_json::Value)> = response
            .tool_uses()
            .into_iter()
            .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
            .collect();

        if !response.is_tool_use() {
            conversation.push(Message::assistant_blocks(response.content.clone()));
            return TurnOutcome::Completed;
        }

        // (3) poll before each tool dispatch; an interrupt discovered
        // mid-batch discards the whole in-flight turn rather than leaving
        // an assistant message with unanswered tool-use ids.
        let mut results = Vec::with_capacity(tool_uses.len());
        for (id, name, input) in &tool_uses {
            if interrupt.is_set() {
                return finalize_interrupted(conversation, params.ui);
            }
            params.ui.tool_call(name, input);
            let output = params.registry.execute(name, input.clone(), params.exec_ctx).await;
            params.ui.tool_result(&output, 2000);
            results.push((id.clone(), name.clone(), output));
        }

        conversation.push(Message::assistant_blocks(response.content.clone()));

        if let Some(tracker) = params.tracker {
            let mut tracker = tracker.lock().unwrap();
            if results.iter().any(|(_, name, _)| name == "TaskUpdate") {
                tracker.reset();
            } else {
                tracker.increment();
            }
        }

        let mut result_blocks: Vec<ContentBlock> = Vec::with_capacity(results.len() + 1);
        if let Some(tracker) = params.tracker {
            if tracker.lock().unwrap().too_long_without_task() {
                result_blocks.push(ContentBlock::text(
                    forgecode_tools::task_tracker::NAG_REMINDER,
                ));
            }
        }
        for (id, _name, output) in results {
            let is_error = output.starts_with("Error");
            result_blocks.push(ContentBlock::ToolResult {
                tool_use_id: id,
                content: output,
                is_error: Some(is_error),
            });
        }
        conversation.push(Message::user_blocks(result_blocks));

        info!(turn_messages = conversation.len(), "turn advanced");
    }
}

fn finalize_interrupted(conversation: &mut Conversation, ui: &Arc<dyn UiSink>) -> TurnOutcome {
    conversation.push(Message::user_text(INTERRUPT_NOTIFICATION));
    ui.interrupted();
    TurnOutcome::Interrupted
}
