//! Status-partitioned task collection.
//!
//! # Responsibility
//! - Hold every task of the board in three ordered partitions.
//! - Provide lookup and move primitives used by `TaskStore`.
//!
//! # Invariants
//! - A task id appears in exactly one partition.
//! - `task.status` always equals the partition that holds it.
//! - Order within a partition is insertion order; moves append.

use crate::model::task::{Task, TaskId, TaskStatus};

/// All tasks of a board, partitioned by status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollection {
    todo: Vec<Task>,
    in_progress: Vec<Task>,
    done: Vec<Task>,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from already-partitioned tasks.
    ///
    /// Each task's `status` is overwritten with its partition so the
    /// collection invariant holds even for inconsistent input.
    pub fn from_partitions(todo: Vec<Task>, in_progress: Vec<Task>, done: Vec<Task>) -> Self {
        let mut collection = Self {
            todo,
            in_progress,
            done,
        };
        for status in TaskStatus::ALL {
            for task in collection.partition_mut(status) {
                task.status = status;
            }
        }
        collection
    }

    /// Tasks in the given partition, in board order.
    pub fn partition(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }

    fn partition_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Done => &mut self.done,
        }
    }

    /// Locates a task, returning its partition and position.
    pub fn find(&self, id: TaskId) -> Option<(TaskStatus, usize)> {
        TaskStatus::ALL.into_iter().find_map(|status| {
            self.partition(status)
                .iter()
                .position(|task| task.id == id)
                .map(|index| (status, index))
        })
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        let (status, index) = self.find(id)?;
        self.partition(status).get(index)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        let (status, index) = self.find(id)?;
        self.partition_mut(status).get_mut(index)
    }

    /// Appends a task to the partition matching its status.
    pub fn push(&mut self, task: Task) {
        self.partition_mut(task.status).push(task);
    }

    /// Removes a task from whichever partition holds it.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let (status, index) = self.find(id)?;
        Some(self.partition_mut(status).remove(index))
    }

    /// Moves a task to the end of `to`, updating its status.
    ///
    /// Returns the moved task, or `None` when `id` is unknown.
    pub fn move_to(&mut self, id: TaskId, to: TaskStatus) -> Option<&Task> {
        let mut task = self.remove(id)?;
        task.status = to;
        let destination = self.partition_mut(to);
        destination.push(task);
        destination.last()
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates every task in board order (todo, in progress, done).
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.todo
            .iter()
            .chain(self.in_progress.iter())
            .chain(self.done.iter())
    }
}
