//! Agent Core and Subagent Runner (§4.8–§4.9): the turn loop that drives a
//! conversation against an `LlmProvider` and a `ToolRegistry`, plus the
//! isolated-subagent mechanism the Task tool dispatches into.

pub mod agent;
pub mod interrupt;
pub mod subagent;
pub mod turn;

pub use agent::Agent;
pub use interrupt::InterruptFlag;
pub use subagent::make_spawn_subagent;
pub use turn::{run_turn, TurnOutcome, TurnParams, INTERRUPT_NOTIFICATION};
