//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose board use-cases to Dart via FRB as sync, never-panicking calls.
//! - Translate core errors into short user-facing messages.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One process-wide `TaskStore` serialises every mutation.
//! - Ids and dates cross the boundary as strings (`uuid`, `YYYY-MM-DD`).

use chrono::NaiveDate;
use log::error;
use std::sync::{Mutex, PoisonError};
use taskboard_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    parse_deadline_str, ping as ping_inner, BoardConfig, ConfigOverrides, SnapshotStore, Task,
    TaskId, TaskStatus, TaskStore,
};
use uuid::Uuid;

type SharedBoard = TaskStore<Box<dyn SnapshotStore + Send>>;

static BOARD: Mutex<Option<SharedBoard>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One task card as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub task_id: String,
    pub name: String,
    /// `YYYY-MM-DD` or `None`.
    pub deadline: Option<String>,
    /// `todo|inprogress|done`.
    pub status: String,
    /// `no_deadline|upcoming|due_today|overdue|completed`.
    pub deadline_state: String,
}

/// Full board envelope returned after reads and selection changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardResponse {
    pub ok: bool,
    pub todo: Vec<TaskItem>,
    pub in_progress: Vec<TaskItem>,
    pub done: Vec<TaskItem>,
    /// Selected partition tag.
    pub selected: String,
    /// Accent colour of the selected partition.
    pub accent_color: String,
    pub message: String,
}

/// Result envelope for a single task mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    /// Task after the mutation; `None` on failure or delete.
    pub task: Option<TaskItem>,
    /// Human-readable message suitable for a transient warning.
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task: Option<TaskItem>) -> Self {
        Self {
            ok: true,
            task,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task: None,
            message: message.into(),
        }
    }
}

/// Returns the whole board.
#[flutter_rust_bridge::frb(sync)]
pub fn board_snapshot() -> BoardResponse {
    match with_board(|board| board_response(board, "")) {
        Ok(response) => response,
        Err(err) => board_failure(err),
    }
}

/// Switches the displayed partition (`todo|inprogress|done`).
#[flutter_rust_bridge::frb(sync)]
pub fn board_select(status: String) -> BoardResponse {
    let Some(status) = TaskStatus::from_tag(&status) else {
        return board_failure(format!("unknown partition `{}`", status.trim()));
    };
    match with_board(|board| {
        board.select(status);
        board_response(board, "")
    }) {
        Ok(response) => response,
        Err(err) => board_failure(err),
    }
}

/// Creates a task in the To Do partition.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add_task(name: String, deadline: Option<String>) -> TaskActionResponse {
    let deadline = match parse_optional_deadline(deadline) {
        Ok(deadline) => deadline,
        Err(message) => return TaskActionResponse::failure(message),
    };
    run_task_action("Task added.", |board| board.add(&name, deadline))
}

/// Renames a task and replaces its deadline.
#[flutter_rust_bridge::frb(sync)]
pub fn board_edit_task(
    task_id: String,
    name: String,
    deadline: Option<String>,
) -> TaskActionResponse {
    let (id, deadline) = match (parse_task_id(&task_id), parse_optional_deadline(deadline)) {
        (Ok(id), Ok(deadline)) => (id, deadline),
        (Err(message), _) | (_, Err(message)) => return TaskActionResponse::failure(message),
    };
    run_task_action("Task updated.", |board| board.edit(id, &name, deadline))
}

/// Deletes a task. The UI is expected to confirm beforehand.
#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_task(task_id: String) -> TaskActionResponse {
    let id = match parse_task_id(&task_id) {
        Ok(id) => id,
        Err(message) => return TaskActionResponse::failure(message),
    };
    let result = with_board(|board| {
        board
            .delete(id)
            .map(|()| TaskActionResponse::success(with_save_note("Task deleted.", board), None))
            .unwrap_or_else(|err| TaskActionResponse::failure(err.to_string()))
    });
    result.unwrap_or_else(TaskActionResponse::failure)
}

/// Moves a task one column to the right.
#[flutter_rust_bridge::frb(sync)]
pub fn board_advance_task(task_id: String) -> TaskActionResponse {
    match parse_task_id(&task_id) {
        Ok(id) => run_task_action("Task moved forward.", |board| board.advance(id)),
        Err(message) => TaskActionResponse::failure(message),
    }
}

/// Moves a task one column to the left.
#[flutter_rust_bridge::frb(sync)]
pub fn board_retreat_task(task_id: String) -> TaskActionResponse {
    match parse_task_id(&task_id) {
        Ok(id) => run_task_action("Task moved back.", |board| board.retreat(id)),
        Err(message) => TaskActionResponse::failure(message),
    }
}

fn run_task_action(
    success_message: &str,
    action: impl FnOnce(&mut SharedBoard) -> taskboard_core::BoardResult<Task>,
) -> TaskActionResponse {
    let result = with_board(|board| match action(board) {
        Ok(task) => {
            let item = to_task_item(board, &task);
            TaskActionResponse::success(with_save_note(success_message, board), Some(item))
        }
        Err(err) => TaskActionResponse::failure(err.to_string()),
    });
    result.unwrap_or_else(TaskActionResponse::failure)
}

fn with_board<T>(f: impl FnOnce(&mut SharedBoard) -> T) -> Result<T, String> {
    let mut guard = BOARD.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.is_none() {
        *guard = Some(open_board()?);
    }
    match guard.as_mut() {
        Some(board) => Ok(f(board)),
        None => Err("board is not available".to_string()),
    }
}

fn open_board() -> Result<SharedBoard, String> {
    let config = BoardConfig::resolve(ConfigOverrides::default())?;
    let store = config.open_snapshot_store().map_err(|err| {
        error!(
            "event=board_open module=ffi status=error backend={} error={}",
            config.backend, err
        );
        format!("board storage open failed: {err}")
    })?;
    Ok(TaskStore::open(store))
}

fn with_save_note(message: &str, board: &mut SharedBoard) -> String {
    match board.take_save_error() {
        Some(err) => format!("{message} Changes could not be saved: {err}"),
        None => message.to_string(),
    }
}

fn board_response(board: &SharedBoard, message: &str) -> BoardResponse {
    let items = |status| {
        board
            .snapshot()
            .partition(status)
            .iter()
            .map(|task| to_task_item(board, task))
            .collect::<Vec<_>>()
    };
    let view = board.view();
    BoardResponse {
        ok: true,
        todo: items(TaskStatus::Todo),
        in_progress: items(TaskStatus::InProgress),
        done: items(TaskStatus::Done),
        selected: view.selected.as_tag().to_string(),
        accent_color: view.accent_color().to_string(),
        message: message.to_string(),
    }
}

fn board_failure(message: String) -> BoardResponse {
    BoardResponse {
        ok: false,
        todo: Vec::new(),
        in_progress: Vec::new(),
        done: Vec::new(),
        selected: TaskStatus::Todo.as_tag().to_string(),
        accent_color: TaskStatus::Todo.accent_color().to_string(),
        message,
    }
}

fn to_task_item(board: &SharedBoard, task: &Task) -> TaskItem {
    let deadline_state = board
        .deadline_state(task.id)
        .map(|state| deadline_state_label(state).to_string())
        .unwrap_or_default();
    TaskItem {
        task_id: task.id.to_string(),
        name: task.name.clone(),
        deadline: task.deadline.map(|day| day.format("%Y-%m-%d").to_string()),
        status: task.status.as_tag().to_string(),
        deadline_state,
    }
}

fn deadline_state_label(state: taskboard_core::DeadlineState) -> &'static str {
    use taskboard_core::DeadlineState;
    match state {
        DeadlineState::NoDeadline => "no_deadline",
        DeadlineState::Upcoming => "upcoming",
        DeadlineState::DueToday => "due_today",
        DeadlineState::Overdue => "overdue",
        DeadlineState::Completed => "completed",
    }
}

fn parse_task_id(raw: &str) -> Result<TaskId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid task id `{}`", raw.trim()))
}

fn parse_optional_deadline(raw: Option<String>) -> Result<Option<NaiveDate>, String> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_deadline_str(value)
            .map(Some)
            .ok_or_else(|| format!("invalid deadline `{value}`; expected YYYY-MM-DD")),
    }
}
