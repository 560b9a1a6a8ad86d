//! Terminal UI sink (§4.10): the minimal `UiSink` implementation that ships
//! with the binary. Plain writes to stdout, ANSI styling via `crossterm`
//! where the terminal supports it, truncated tool-result previews.

pub mod terminal;

pub use terminal::TerminalSink;
