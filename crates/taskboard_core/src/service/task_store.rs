//! Task board state owner.
//!
//! # Responsibility
//! - Own the `TaskCollection` and apply add/edit/delete/transition use-cases.
//! - Save the full snapshot exactly once after each successful mutation.
//! - Notify listeners with the post-mutation collection.
//!
//! # Invariants
//! - Validation and lookup failures leave state untouched and do not save.
//! - A failed save never rolls back the in-memory mutation; the error is
//!   logged and kept in `last_save_error`.
//! - Loading persisted state never triggers a save.
//! - A snapshot that fails to load is set aside before the board starts
//!   empty, so the first save cannot destroy it.

use crate::clock::{Clock, SystemClock};
use crate::model::collection::TaskCollection;
use crate::model::deadline::DeadlineState;
use crate::model::task::{Task, TaskId, TaskStatus, TaskValidationError};
use crate::persist::{BoardDocument, PersistError, SnapshotStore};
use chrono::NaiveDate;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type BoardResult<T> = Result<T, BoardError>;

/// Error returned by `TaskStore` operations.
#[derive(Debug)]
pub enum BoardError {
    /// Name was empty or whitespace-only.
    EmptyName,
    NotFound(TaskId),
    /// `advance` on a task that is already done.
    TerminalState(TaskId),
    /// `retreat` on a task that is still to do.
    InitialState(TaskId),
    Persistence(PersistError),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "{}", TaskValidationError::EmptyName),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::TerminalState(id) => write!(f, "task {id} is already done"),
            Self::InitialState(id) => write!(f, "task {id} has not been started"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for BoardError {
    fn from(value: TaskValidationError) -> Self {
        match value {
            TaskValidationError::EmptyName => Self::EmptyName,
        }
    }
}

impl From<PersistError> for BoardError {
    fn from(value: PersistError) -> Self {
        Self::Persistence(value)
    }
}

/// Callback invoked with the collection after each change.
pub type BoardListener = Box<dyn FnMut(&TaskCollection) + Send>;

/// UI-facing selection. Derived state, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardView {
    pub selected: TaskStatus,
}

impl BoardView {
    pub fn accent_color(&self) -> &'static str {
        self.selected.accent_color()
    }
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            selected: TaskStatus::Todo,
        }
    }
}

/// Single-writer owner of the board.
pub struct TaskStore<S: SnapshotStore> {
    tasks: TaskCollection,
    view: BoardView,
    store: S,
    clock: Box<dyn Clock>,
    listeners: Vec<BoardListener>,
    last_save_error: Option<PersistError>,
}

impl<S: SnapshotStore> TaskStore<S> {
    /// Opens the board, starting empty when the snapshot cannot be read.
    /// The unreadable snapshot is moved aside where the backend supports it.
    pub fn open(store: S) -> Self {
        let started_at = Instant::now();
        let tasks = match load_collection(&store) {
            Ok(tasks) => {
                info!(
                    "event=board_load module=store status=ok backend={} tasks={} duration_ms={}",
                    store.backend(),
                    tasks.len(),
                    started_at.elapsed().as_millis()
                );
                tasks
            }
            Err(err) => {
                error!(
                    "event=board_load module=store status=error backend={} duration_ms={} error={}",
                    store.backend(),
                    started_at.elapsed().as_millis(),
                    err
                );
                set_aside_unreadable(&store);
                TaskCollection::new()
            }
        };
        Self::with_tasks(store, tasks)
    }

    /// Opens the board, failing when the snapshot cannot be read.
    pub fn try_open(store: S) -> BoardResult<Self> {
        let tasks = load_collection(&store)?;
        info!(
            "event=board_load module=store status=ok backend={} tasks={}",
            store.backend(),
            tasks.len()
        );
        Ok(Self::with_tasks(store, tasks))
    }

    fn with_tasks(store: S, tasks: TaskCollection) -> Self {
        Self {
            tasks,
            view: BoardView::default(),
            store,
            clock: Box::new(SystemClock),
            listeners: Vec::new(),
            last_save_error: None,
        }
    }

    /// Replaces the time source used for `created_at` and deadline checks.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Registers a listener called after every mutation and restore.
    pub fn subscribe(&mut self, listener: impl FnMut(&TaskCollection) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Creates a task at the end of the Todo partition.
    pub fn add(&mut self, name: &str, deadline: Option<NaiveDate>) -> BoardResult<Task> {
        let task = Task::new(name, deadline, self.clock.now())?;
        self.tasks.push(task.clone());
        info!(
            "event=task_add module=store status=ok task_id={} has_deadline={}",
            task.id,
            task.deadline.is_some()
        );
        self.commit();
        Ok(task)
    }

    /// Updates name and deadline in place; status and position are kept.
    pub fn edit(
        &mut self,
        id: TaskId,
        name: &str,
        deadline: Option<NaiveDate>,
    ) -> BoardResult<Task> {
        let task = self.tasks.get_mut(id).ok_or(BoardError::NotFound(id))?;
        task.rename(name, deadline)?;
        let task = task.clone();
        info!("event=task_edit module=store status=ok task_id={}", id);
        self.commit();
        Ok(task)
    }

    /// Removes a task from whichever partition holds it.
    pub fn delete(&mut self, id: TaskId) -> BoardResult<()> {
        let removed = self.tasks.remove(id).ok_or(BoardError::NotFound(id))?;
        info!(
            "event=task_delete module=store status=ok task_id={} from={}",
            id, removed.status
        );
        self.commit();
        Ok(())
    }

    /// Moves a task one stage forward (Todo → InProgress → Done).
    pub fn advance(&mut self, id: TaskId) -> BoardResult<Task> {
        let from = self.status_of(id)?;
        let to = from.next().ok_or(BoardError::TerminalState(id))?;
        self.transition(id, from, to)
    }

    /// Moves a task one stage backward (Done → InProgress → Todo).
    pub fn retreat(&mut self, id: TaskId) -> BoardResult<Task> {
        let from = self.status_of(id)?;
        let to = from.previous().ok_or(BoardError::InitialState(id))?;
        self.transition(id, from, to)
    }

    /// Read-only view of the whole board.
    pub fn snapshot(&self) -> &TaskCollection {
        &self.tasks
    }

    /// Persistence-ready document of the current board.
    pub fn document(&self) -> BoardDocument {
        BoardDocument::from_collection(&self.tasks)
    }

    /// Replaces the board wholesale. Does not save.
    pub fn restore(&mut self, tasks: TaskCollection) {
        info!(
            "event=board_restore module=store status=ok tasks={}",
            tasks.len()
        );
        self.tasks = tasks;
        self.notify();
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Chooses the partition a UI collaborator is showing.
    pub fn select(&mut self, status: TaskStatus) -> BoardView {
        self.view.selected = status;
        self.view
    }

    pub fn view(&self) -> BoardView {
        self.view
    }

    /// Tasks of the selected partition.
    pub fn selected_tasks(&self) -> &[Task] {
        self.tasks.partition(self.view.selected)
    }

    /// Deadline classification of one task against the store's clock.
    pub fn deadline_state(&self, id: TaskId) -> BoardResult<DeadlineState> {
        let task = self.tasks.get(id).ok_or(BoardError::NotFound(id))?;
        Ok(DeadlineState::of_task(task, self.clock.today()))
    }

    /// Unfinished tasks whose deadline has passed, in board order.
    pub fn overdue(&self) -> Vec<&Task> {
        let today = self.clock.today();
        self.tasks
            .iter()
            .filter(|task| DeadlineState::of_task(task, today) == DeadlineState::Overdue)
            .collect()
    }

    pub fn last_save_error(&self) -> Option<&PersistError> {
        self.last_save_error.as_ref()
    }

    /// Returns and clears the last save failure.
    pub fn take_save_error(&mut self) -> Option<PersistError> {
        self.last_save_error.take()
    }

    /// The backing snapshot store.
    pub fn snapshot_store(&self) -> &S {
        &self.store
    }

    fn status_of(&self, id: TaskId) -> BoardResult<TaskStatus> {
        self.tasks
            .find(id)
            .map(|(status, _)| status)
            .ok_or(BoardError::NotFound(id))
    }

    fn transition(&mut self, id: TaskId, from: TaskStatus, to: TaskStatus) -> BoardResult<Task> {
        let task = self
            .tasks
            .move_to(id, to)
            .cloned()
            .ok_or(BoardError::NotFound(id))?;
        info!(
            "event=task_transition module=store status=ok task_id={} from={} to={}",
            id, from, to
        );
        self.commit();
        Ok(task)
    }

    /// Saves once and notifies listeners. Called after every successful mutation.
    fn commit(&mut self) {
        let started_at = Instant::now();
        let document = BoardDocument::from_collection(&self.tasks);
        match self.store.save(&document) {
            Ok(()) => {
                self.last_save_error = None;
                info!(
                    "event=board_save module=store status=ok backend={} tasks={} duration_ms={}",
                    self.store.backend(),
                    self.tasks.len(),
                    started_at.elapsed().as_millis()
                );
            }
            Err(err) => {
                warn!(
                    "event=board_save module=store status=error backend={} duration_ms={} error={}",
                    self.store.backend(),
                    started_at.elapsed().as_millis(),
                    err
                );
                self.last_save_error = Some(err);
            }
        }
        self.notify();
    }

    fn notify(&mut self) {
        for listener in &mut self.listeners {
            listener(&self.tasks);
        }
    }
}

fn load_collection<S: SnapshotStore>(store: &S) -> Result<TaskCollection, PersistError> {
    match store.load()? {
        Some(document) => document.into_collection(),
        None => Ok(TaskCollection::new()),
    }
}

fn set_aside_unreadable<S: SnapshotStore>(store: &S) {
    match store.set_aside_unreadable() {
        Ok(Some(path)) => warn!(
            "event=board_set_aside module=store status=ok backend={} path={}",
            store.backend(),
            path.display()
        ),
        Ok(None) => {}
        Err(err) => error!(
            "event=board_set_aside module=store status=error backend={} error={}",
            store.backend(),
            err
        ),
    }
}
