//! A minimal terminal `UiSink` (§4.10): plain stdout writes, ANSI styling via
//! `crossterm` where the terminal supports it. Calls are serialized behind a
//! mutex so the sink is safe to invoke from whatever task the agent core
//! runs on, per the trait's thread-safety contract.

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};
use forgecode_core::{Style, UiSink};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

pub struct TerminalSink {
    stdout: Mutex<io::Stdout>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self { stdout: Mutex::new(io::stdout()) }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

fn color_for(style: Style) -> Color {
    match style {
        Style::Primary => Color::White,
        Style::Accent => Color::Cyan,
        Style::Error => Color::Red,
        Style::Debug => Color::DarkGrey,
    }
}

/// Truncate to at most `max_len` bytes without splitting a UTF-8 code
/// point, matching the Workspace Guard's output-capping rule (§4.1).
fn truncate_at_char_boundary(s: &str, max_len: usize) -> &str {
    let mut end = max_len.min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

impl UiSink for TerminalSink {
    fn write(&self, text: &str) {
        let mut out = self.stdout.lock().unwrap();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn styled_write(&self, style: Style, text: &str) {
        let mut out = self.stdout.lock().unwrap();
        let _ = execute!(&mut *out, SetForegroundColor(color_for(style)), Print(text), ResetColor);
    }

    fn newline(&self) {
        let mut out = self.stdout.lock().unwrap();
        let _ = out.write_all(b"\n");
    }

    fn clear(&self) {
        let mut out = self.stdout.lock().unwrap();
        let _ = execute!(&mut *out, Clear(ClearType::All), MoveTo(0, 0));
    }

    fn thinking(&self, content: &str, duration: Duration) {
        let mut out = self.stdout.lock().unwrap();
        let _ = queue!(
            &mut *out,
            SetForegroundColor(Color::DarkGrey),
            Print(format!("\n[thinking, {:.1}s] {content}\n", duration.as_secs_f64())),
            ResetColor
        );
        let _ = out.flush();
    }

    fn response(&self, markdown_text: &str) {
        let mut out = self.stdout.lock().unwrap();
        let _ = execute!(
            &mut *out,
            SetForegroundColor(color_for(Style::Primary)),
            Print(format!("\n{markdown_text}\n")),
            ResetColor
        );
    }

    fn tool_call(&self, name: &str, input: &serde_json::Value) {
        let mut out = self.stdout.lock().unwrap();
        let _ = execute!(
            &mut *out,
            SetForegroundColor(Color::Cyan),
            Print(format!("\n> {name}({input})\n")),
            ResetColor
        );
    }

    fn tool_result(&self, output: &str, max_len: usize) {
        let mut out = self.stdout.lock().unwrap();
        let preview = if output.len() > max_len {
            format!(
                "{}... ({} more bytes)",
                truncate_at_char_boundary(output, max_len),
                output.len() - max_len
            )
        } else {
            output.to_string()
        };
        let _ = writeln!(out, "{preview}");
    }

    fn interrupted(&self) {
        let mut out = self.stdout.lock().unwrap();
        let _ = execute!(&mut *out, SetForegroundColor(Color::Red), Print("\n[interrupted]\n"), ResetColor);
    }

    fn status(&self, message: &str, spinning: bool) {
        let mut out = self.stdout.lock().unwrap();
        let marker = if spinning { "…" } else { "" };
        let _ = write!(out, "\r{message}{marker}");
        let _ = out.flush();
    }
}
