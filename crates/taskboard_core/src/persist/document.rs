//! Persisted board document.
//!
//! # Responsibility
//! - Define the JSON layout written by every snapshot store.
//! - Convert between the layout and `TaskCollection`, including documents
//!   written before tasks carried ids.
//!
//! # Invariants
//! - Missing partition keys load as empty partitions.
//! - Missing `schemaVersion` means version 0 (no ids).
//! - Documents newer than `CURRENT_SCHEMA_VERSION` are rejected, never
//!   partially read.
//! - The partition key decides a task's status; `type` is informational.

use crate::model::collection::TaskCollection;
use crate::model::task::{normalize_name, Task, TaskId, TaskStatus};
use crate::persist::{PersistError, PersistResult};
use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Schema version written by this build.
///
/// - 0: `{ toDoTasks, inProgressTasks, doneTasks }` with `{ type, name, deadline?, additionTime? }`.
/// - 1: adds `schemaVersion` and a stable `id` per task.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// Whole-board document, as stored on disk or in the key-value table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDocument {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub to_do_tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub in_progress_tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub done_tasks: Vec<TaskRecord>,
}

/// One task entry inside a partition array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,
    /// Status tag (`todo|inprogress|done`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: String,
    /// `YYYY-MM-DD`; RFC 3339 timestamps are accepted on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    /// RFC 3339 creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addition_time: Option<String>,
}

impl BoardDocument {
    /// Builds a current-version document from in-memory state.
    pub fn from_collection(collection: &TaskCollection) -> Self {
        let records = |status| {
            collection
                .partition(status)
                .iter()
                .map(TaskRecord::from_task)
                .collect::<Vec<_>>()
        };
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            to_do_tasks: records(TaskStatus::Todo),
            in_progress_tasks: records(TaskStatus::InProgress),
            done_tasks: records(TaskStatus::Done),
        }
    }

    /// Converts the document into a collection.
    ///
    /// Entries without an id (or with a duplicate id) get a fresh one.
    /// Entries with a blank name are dropped.
    ///
    /// # Errors
    /// - `PersistError::UnsupportedSchemaVersion` when the document was
    ///   written by a newer build.
    pub fn into_collection(self) -> PersistResult<TaskCollection> {
        if self.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(PersistError::UnsupportedSchemaVersion {
                found: self.schema_version,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }

        let mut seen = HashSet::new();
        let mut convert = |status: TaskStatus, records: Vec<TaskRecord>| {
            records
                .into_iter()
                .filter_map(|record| record.into_task(status, &mut seen))
                .collect::<Vec<_>>()
        };
        let todo = convert(TaskStatus::Todo, self.to_do_tasks);
        let in_progress = convert(TaskStatus::InProgress, self.in_progress_tasks);
        let done = convert(TaskStatus::Done, self.done_tasks);

        Ok(TaskCollection::from_partitions(todo, in_progress, done))
    }

    /// Total entries across partitions, including ones that would be dropped.
    pub fn record_count(&self) -> usize {
        self.to_do_tasks.len() + self.in_progress_tasks.len() + self.done_tasks.len()
    }
}

impl TaskRecord {
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: Some(task.id),
            kind: Some(task.status.as_tag().to_string()),
            name: task.name.clone(),
            deadline: task
                .deadline
                .map(|day| day.format(DEADLINE_FORMAT).to_string()),
            addition_time: task
                .created_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }

    fn into_task(self, status: TaskStatus, seen: &mut HashSet<TaskId>) -> Option<Task> {
        let name = match normalize_name(&self.name) {
            Ok(name) => name,
            Err(_) => {
                warn!(
                    "event=board_load module=persist status=skip reason=blank_name partition={}",
                    status
                );
                return None;
            }
        };

        if let Some(kind) = self.kind.as_deref() {
            if TaskStatus::from_tag(kind) != Some(status) {
                warn!(
                    "event=board_load module=persist status=repair reason=type_mismatch partition={} type={}",
                    status, kind
                );
            }
        }

        let id = match self.id {
            Some(id) if seen.insert(id) => id,
            Some(duplicate) => {
                let fresh = Uuid::new_v4();
                warn!(
                    "event=board_load module=persist status=repair reason=duplicate_id old_id={} new_id={}",
                    duplicate, fresh
                );
                seen.insert(fresh);
                fresh
            }
            None => {
                let fresh = Uuid::new_v4();
                seen.insert(fresh);
                fresh
            }
        };

        Some(Task {
            id,
            name,
            deadline: self.deadline.as_deref().and_then(|raw| parse_deadline(id, raw)),
            status,
            created_at: self
                .addition_time
                .as_deref()
                .and_then(|raw| parse_addition_time(id, raw)),
        })
    }
}

/// Parses a stored deadline into a calendar day.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp. A timestamp is read as the
/// day it falls on in the device's local time zone, so a date picked at
/// local midnight and stored in UTC keeps its day.
pub fn parse_deadline_str(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, DEADLINE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|at| at.with_timezone(&Local).date_naive())
        })
}

fn parse_deadline(id: TaskId, raw: &str) -> Option<NaiveDate> {
    let parsed = parse_deadline_str(raw);
    if parsed.is_none() {
        warn!(
            "event=board_load module=persist status=repair reason=bad_deadline task_id={}",
            id
        );
    }
    parsed
}

fn parse_addition_time(id: TaskId, raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(at) => Some(at.with_timezone(&Utc)),
        Err(_) => {
            // Earliest documents stored a display clock ("9:5 AM") with no date.
            debug!(
                "event=board_load module=persist status=repair reason=legacy_addition_time task_id={}",
                id
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_deadline_str, BoardDocument, TaskRecord, CURRENT_SCHEMA_VERSION};
    use chrono::{Local, NaiveDate, SecondsFormat, TimeZone, Utc};

    #[test]
    fn deadline_accepts_date_and_timestamp_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 10);
        assert_eq!(parse_deadline_str("2024-01-10"), expected);
        assert_eq!(parse_deadline_str(" 2024-01-10 "), expected);
        assert_eq!(parse_deadline_str("10/01/2024"), None);
        assert_eq!(parse_deadline_str("soon"), None);
    }

    #[test]
    fn timestamp_deadline_keeps_the_local_day_it_was_picked_on() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let local_midnight = Local
            .from_local_datetime(&day.and_hms_opt(0, 0, 0).unwrap())
            .earliest()
            .unwrap();
        let stored = local_midnight
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        assert_eq!(parse_deadline_str(&stored), Some(day));
    }

    #[test]
    fn addition_time_keeps_sub_second_precision() {
        let created = Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap()
            + chrono::Duration::nanoseconds(179_068_411);
        let task = crate::model::task::Task::new("Buy milk", None, created).unwrap();

        let record = TaskRecord::from_task(&task);
        let document = BoardDocument {
            schema_version: CURRENT_SCHEMA_VERSION,
            to_do_tasks: vec![record],
            ..BoardDocument::default()
        };
        let collection = document.into_collection().unwrap();

        assert_eq!(collection.get(task.id).unwrap().created_at, Some(created));
    }

    #[test]
    fn blank_names_are_dropped_on_load() {
        let document = BoardDocument {
            schema_version: 0,
            to_do_tasks: vec![
                TaskRecord {
                    name: "   ".to_string(),
                    ..TaskRecord::default()
                },
                TaskRecord {
                    name: "kept".to_string(),
                    ..TaskRecord::default()
                },
            ],
            ..BoardDocument::default()
        };

        let collection = document.into_collection().unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.iter().next().unwrap().name, "kept");
    }
}
