//! Task Tracker (§4.6): a validated, bounded to-do list plus a nag counter
//! that reminds the model to keep it updated.

use forgecode_core::Error;
use serde::{Deserialize, Serialize};

pub const MAX_TASKS: usize = 20;
pub const NAG_THRESHOLD: u32 = 10;

pub const INITIAL_REMINDER: &str = "<reminder>Use TaskUpdate for multi-step tasks.</reminder>";
pub const NAG_REMINDER: &str =
    "<reminder>10+ turns without task update. Please update tasks.</reminder>";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub content: String,
    pub status: TaskStatus,
    pub active_form: String,
}

/// The to-do list plus the rounds-since-last-update counter that drives the
/// nag policy.
#[derive(Default)]
pub struct TaskTracker {
    tasks: Vec<Task>,
    rounds_without_task_update: u32,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn rounds_without_task_update(&self) -> u32 {
        self.rounds_without_task_update
    }

    /// Called after every assistant turn that invoked TaskUpdate.
    pub fn reset(&mut self) {
        self.rounds_without_task_update = 0;
    }

    /// Called after every other assistant turn that invoked at least one tool.
    pub fn increment(&mut self) {
        self.rounds_without_task_update += 1;
    }

    pub fn too_long_without_task(&self) -> bool {
        self.rounds_without_task_update > NAG_THRESHOLD
    }

    /// Validate and atomically replace the task list. On failure the
    /// previous list is left untouched.
    pub fn update(&mut self, tasks: Vec<Task>) -> Result<String, Error> {
        if tasks.len() > MAX_TASKS {
            return Err(Error::ValidationError(format!(
                "Too many tasks: {} (max {MAX_TASKS})",
                tasks.len()
            )));
        }

        let mut in_progress_count = 0;
        for task in &tasks {
            if task.content.trim().is_empty() {
                return Err(Error::ValidationError("Task content cannot be empty".into()));
            }
            if task.active_form.trim().is_empty() {
                return Err(Error::ValidationError(
                    "Task active_form cannot be empty".into(),
                ));
            }
            if task.status == TaskStatus::InProgress {
                in_progress_count += 1;
            }
        }
        if in_progress_count > 1 {
            return Err(Error::ValidationError(
                "Only one task can be in progress at a time".into(),
            ));
        }

        self.tasks = tasks;
        Ok(self.render())
    }

    /// A rendered view of the current list: checkmarks, the in-progress
    /// marker, and a completion count.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.tasks.len() + 1);
        let mut completed = 0;
        for task in &self.tasks {
            match task.status {
                TaskStatus::Completed => {
                    completed += 1;
                    lines.push(format!("✔ {}", task.content));
                }
                TaskStatus::InProgress => {
                    lines.push(format!("▣ {} <- {}", task.content, task.active_form));
                }
                TaskStatus::Pending => {
                    lines.push(format!("☐ {}", task.content));
                }
            }
        }
        lines.push(format!("({}/{} completed)", completed, self.tasks.len()));
        lines.join("\n")
    }
}
