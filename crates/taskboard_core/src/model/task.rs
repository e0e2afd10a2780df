//! Task domain model.
//!
//! # Responsibility
//! - Define the task record owned by the board and its status lifecycle.
//! - Validate user-supplied task names.
//!
//! # Invariants
//! - `id` is generated once at creation and never reused for another task.
//! - `name` is never blank; it is stored trimmed.
//! - `status` only moves between adjacent stages (see `TaskStatus::next`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Board column a task currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Created but not started.
    #[serde(rename = "todo")]
    Todo,
    /// Work is in progress.
    #[serde(rename = "inprogress")]
    InProgress,
    /// Completed.
    #[serde(rename = "done")]
    Done,
}

impl TaskStatus {
    /// All statuses in board order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// Next stage, or `None` when already terminal.
    pub fn next(self) -> Option<TaskStatus> {
        match self {
            Self::Todo => Some(Self::InProgress),
            Self::InProgress => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Previous stage, or `None` when already initial.
    pub fn previous(self) -> Option<TaskStatus> {
        match self {
            Self::Todo => None,
            Self::InProgress => Some(Self::Todo),
            Self::Done => Some(Self::InProgress),
        }
    }

    /// Wire tag stored in the `type` field of persisted tasks.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Done => "done",
        }
    }

    /// Parses a wire tag. Accepts the snake_case spelling used by newer
    /// callers as well.
    pub fn from_tag(value: &str) -> Option<TaskStatus> {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" => Some(Self::Todo),
            "inprogress" | "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Column heading shown by UI collaborators.
    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// Accent colour name used for the column tab and task bullets.
    pub fn accent_color(self) -> &'static str {
        match self {
            Self::Todo => "orange",
            Self::InProgress => "deepskyblue",
            Self::Done => "forestgreen",
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Validation errors for task input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Name is empty or whitespace-only.
    EmptyName,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Task name cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// A single card on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Calendar day the task is due; no time component.
    pub deadline: Option<NaiveDate>,
    pub status: TaskStatus,
    /// Missing for tasks loaded from documents that never recorded it.
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a `Todo` task with a fresh id.
    ///
    /// # Errors
    /// - `TaskValidationError::EmptyName` when `name` is blank.
    pub fn new(
        name: &str,
        deadline: Option<NaiveDate>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TaskValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: normalize_name(name)?,
            deadline,
            status: TaskStatus::Todo,
            created_at: Some(created_at),
        })
    }

    /// Replaces name and deadline. Status is untouched.
    ///
    /// On error the task is left unchanged.
    pub fn rename(
        &mut self,
        name: &str,
        deadline: Option<NaiveDate>,
    ) -> Result<(), TaskValidationError> {
        self.name = normalize_name(name)?;
        self.deadline = deadline;
        Ok(())
    }
}

/// Trims `name` and rejects it when nothing is left.
pub fn normalize_name(name: &str) -> Result<String, TaskValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, Task, TaskStatus, TaskValidationError};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn status_walks_forward_and_backward() {
        assert_eq!(TaskStatus::Todo.next(), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::InProgress.next(), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::Done.next(), None);
        assert_eq!(TaskStatus::Done.previous(), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::Todo.previous(), None);
    }

    #[test]
    fn status_tags_accept_both_spellings() {
        assert_eq!(TaskStatus::from_tag("inprogress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::from_tag(" IN_PROGRESS "), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::from_tag("archived"), None);
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::from_tag(status.as_tag()), Some(status));
        }
    }

    #[test]
    fn normalize_name_trims_and_rejects_blank() {
        assert_eq!(normalize_name("  Buy milk ").unwrap(), "Buy milk");
        assert_eq!(normalize_name("").unwrap_err(), TaskValidationError::EmptyName);
        assert_eq!(normalize_name(" \t\n").unwrap_err(), TaskValidationError::EmptyName);
    }

    #[test]
    fn rename_keeps_previous_values_on_error() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let deadline = NaiveDate::from_ymd_opt(2024, 1, 10);
        let mut task = Task::new("Buy milk", deadline, created).unwrap();

        assert!(task.rename("   ", None).is_err());
        assert_eq!(task.name, "Buy milk");
        assert_eq!(task.deadline, deadline);
        assert_eq!(task.status, TaskStatus::Todo);
    }
}
