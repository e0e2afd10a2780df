//! Board domain model.
//!
//! # Responsibility
//! - Define the task record, its status lifecycle and the partitioned
//!   collection that owns every task.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - A task belongs to exactly one partition at any time.

pub mod collection;
pub mod deadline;
pub mod task;
