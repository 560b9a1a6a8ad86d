//! Individual tool implementations, one module each (§4.2–§4.9). Each
//! implements [`crate::registry::Tool`] and is registered by name in
//! `create_default_registry`.

pub mod bash;
pub mod edit;
pub mod glob;
pub mod grep;
pub mod read;
pub mod skill_tool;
pub mod task_tool;
pub mod task_update;
pub mod web;
pub mod write;
