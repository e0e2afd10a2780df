use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use taskboard_core::{StorageBackend, TaskStatus};

#[derive(Parser, Debug)]
#[command(name = "taskboard", about = "To Do / In Progress / Done board on local storage", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Board file (JSON document or SQLite database)
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Storage backend
    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendArg>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print core health and version
    Ping,
    /// List tasks, optionally one column only
    List(ListArgs),
    /// Add a task to To Do
    Add(AddArgs),
    /// Rename a task and set its deadline
    Edit(EditArgs),
    /// Delete a task
    Delete(IdArgs),
    /// Move a task one column right
    Advance(IdArgs),
    /// Move a task one column left
    Retreat(IdArgs),
    /// List unfinished tasks past their deadline
    Overdue,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show this column
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub name: String,
    /// Deadline as YYYY-MM-DD
    #[arg(long)]
    pub deadline: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: String,
    pub name: String,
    /// Deadline as YYYY-MM-DD; omit to clear
    #[arg(long)]
    pub deadline: Option<String>,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    pub id: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum BackendArg {
    Json,
    Sqlite,
}

impl From<BackendArg> for StorageBackend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Json => StorageBackend::Json,
            BackendArg::Sqlite => StorageBackend::Sqlite,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StatusArg {
    Todo,
    #[value(name = "inprogress", alias = "in-progress")]
    InProgress,
    Done,
}

impl From<StatusArg> for TaskStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Todo => TaskStatus::Todo,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Done => TaskStatus::Done,
        }
    }
}
