//! Deadline classification against a calendar day.
//!
//! Dates are compared as `NaiveDate`, never as formatted strings, so the
//! result does not depend on locale or display format.

use crate::model::task::{Task, TaskStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a task's deadline relates to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineState {
    NoDeadline,
    Upcoming,
    DueToday,
    Overdue,
    /// Finished task that had a deadline.
    Completed,
}

impl DeadlineState {
    /// Classifies `deadline` relative to `today`.
    pub fn classify(deadline: Option<NaiveDate>, today: NaiveDate) -> Self {
        match deadline {
            None => Self::NoDeadline,
            Some(day) if day < today => Self::Overdue,
            Some(day) if day == today => Self::DueToday,
            Some(_) => Self::Upcoming,
        }
    }

    /// Classifies a task. Finished tasks with a deadline are `Completed`,
    /// never overdue.
    pub fn of_task(task: &Task, today: NaiveDate) -> Self {
        match (task.status, task.deadline) {
            (TaskStatus::Done, Some(_)) => Self::Completed,
            _ => Self::classify(task.deadline, today),
        }
    }

    /// Whether a UI collaborator should render a warning marker.
    pub fn needs_attention(self) -> bool {
        matches!(self, Self::DueToday | Self::Overdue)
    }
}

#[cfg(test)]
mod tests {
    use super::DeadlineState;
    use crate::model::task::{Task, TaskStatus};
    use chrono::{NaiveDate, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn classify_compares_chronologically() {
        let today = day(2024, 2, 9);
        // "10 January" would sort after "9 February" as text.
        assert_eq!(
            DeadlineState::classify(Some(day(2024, 1, 10)), today),
            DeadlineState::Overdue
        );
        assert_eq!(
            DeadlineState::classify(Some(day(2024, 2, 9)), today),
            DeadlineState::DueToday
        );
        assert_eq!(
            DeadlineState::classify(Some(day(2024, 12, 1)), today),
            DeadlineState::Upcoming
        );
        assert_eq!(DeadlineState::classify(None, today), DeadlineState::NoDeadline);
    }

    #[test]
    fn done_tasks_are_completed_not_overdue() {
        let mut task = Task::new("ship", Some(day(2020, 1, 1)), Utc::now()).unwrap();
        assert_eq!(DeadlineState::of_task(&task, day(2024, 1, 1)), DeadlineState::Overdue);

        task.status = TaskStatus::Done;
        let state = DeadlineState::of_task(&task, day(2024, 1, 1));
        assert_eq!(state, DeadlineState::Completed);
        assert!(!state.needs_attention());
    }

    #[test]
    fn done_task_without_deadline_has_no_deadline() {
        let mut task = Task::new("ship", None, Utc::now()).unwrap();
        task.status = TaskStatus::Done;
        assert_eq!(
            DeadlineState::of_task(&task, day(2024, 1, 1)),
            DeadlineState::NoDeadline
        );
    }
}
