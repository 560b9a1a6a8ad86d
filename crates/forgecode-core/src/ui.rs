//! The abstract output sink the agent core and every tool execution context
//! depend on (§4.10). Lives here, not in the agent crate, because both the
//! tool registry's `ExecutionContext` and the turn loop need to share one
//! trait object without a dependency cycle between the two crates.

use std::time::Duration;

/// A semantic style hint for free-text writes. Implementations decide how
/// (or whether) to render these — e.g. ANSI color in a terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    Primary,
    Accent,
    Error,
    Debug,
}

/// Everything the core ever needs from an output surface. The core never
/// inspects sink state — it only calls these methods — so any
/// implementation (terminal, test recorder, TUI) satisfies the same
/// contract. Implementations not already thread-aware must marshal calls
/// internally; the core may invoke these from whatever task/thread it runs
/// on.
pub trait UiSink: Send + Sync {
    /// Unstyled free-text write, no trailing newline implied.
    fn write(&self, text: &str);

    /// Styled free-text write.
    fn styled_write(&self, style: Style, text: &str);

    /// Emit a newline.
    fn newline(&self);

    /// Clear the visible output area, if the implementation supports it.
    fn clear(&self);

    /// A thinking block surfaced by the model, paired with how long the
    /// request that produced it took.
    fn thinking(&self, content: &str, duration: Duration);

    /// A rendered assistant text block (treated as markdown by the sink).
    fn response(&self, markdown_text: &str);

    /// A tool invocation about to be dispatched.
    fn tool_call(&self, name: &str, input: &serde_json::Value);

    /// A tool result, truncated to `max_len` by the sink for display.
    fn tool_result(&self, output: &str, max_len: usize);

    /// The current turn was interrupted by the user.
    fn interrupted(&self);

    /// A status line, e.g. a spinner label.
    fn status(&self, message: &str, spinning: bool);
}

/// A sink that discards everything. Useful as a default for subagents or
/// tests that don't care about output.
pub struct NullSink;

impl UiSink for NullSink {
    fn write(&self, _text: &str) {}
    fn styled_write(&self, _style: Style, _text: &str) {}
    fn newline(&self) {}
    fn clear(&self) {}
    fn thinking(&self, _content: &str, _duration: Duration) {}
    fn response(&self, _markdown_text: &str) {}
    fn tool_call(&self, _name: &str, _input: &serde_json::Value) {}
    fn tool_result(&self, _output: &str, _max_len: usize) {}
    fn interrupted(&self) {}
    fn status(&self, _message: &str, _spinning: bool) {}
}
