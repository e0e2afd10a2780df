//! Command-line driver for the task board.
//!
//! # Responsibility
//! - Resolve configuration from flags and environment.
//! - Apply one board operation per invocation and print the result.

mod commands;

use chrono::NaiveDate;
use clap::Parser;
use commands::{Cli, Commands};
use serde_json::json;
use taskboard_core::{
    init_logging, parse_deadline_str, BoardConfig, ConfigOverrides, DeadlineState, SnapshotStore,
    Task, TaskId, TaskStatus, TaskStore,
};

type Board = TaskStore<Box<dyn SnapshotStore + Send>>;

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<String, String> {
    let config = BoardConfig::resolve(ConfigOverrides {
        data_file: cli.data_file,
        backend: cli.backend.map(Into::into),
        log_level: cli.log_level,
        log_dir: cli.log_dir,
    })?;

    if let Err(err) = init_logging(&config.log_level, &config.log_dir.to_string_lossy()) {
        eprintln!("warning: logging disabled: {err}");
    }

    if matches!(cli.command, Commands::Ping) {
        return Ok(ping_line());
    }

    let store = config
        .open_snapshot_store()
        .map_err(|err| format!("cannot open {}: {err}", config.data_file.display()))?;
    let mut board = TaskStore::try_open(store).map_err(|err| err.to_string())?;
    let json = cli.json;

    let output = match cli.command {
        Commands::Ping => ping_line(),
        Commands::List(args) => {
            let statuses = match args.status {
                Some(status) => vec![TaskStatus::from(status)],
                None => TaskStatus::ALL.to_vec(),
            };
            let tasks = statuses
                .into_iter()
                .flat_map(|status| board.snapshot().partition(status).iter())
                .collect::<Vec<_>>();
            render_tasks(&board, &tasks, json)
        }
        Commands::Overdue => {
            let tasks = board.overdue();
            render_tasks(&board, &tasks, json)
        }
        Commands::Add(args) => {
            let deadline = parse_deadline_arg(args.deadline.as_deref())?;
            let task = board.add(&args.name, deadline).map_err(|err| err.to_string())?;
            render_task(&board, &task, json)
        }
        Commands::Edit(args) => {
            let id = parse_id(&args.id)?;
            let deadline = parse_deadline_arg(args.deadline.as_deref())?;
            let task = board
                .edit(id, &args.name, deadline)
                .map_err(|err| err.to_string())?;
            render_task(&board, &task, json)
        }
        Commands::Delete(args) => {
            let id = parse_id(&args.id)?;
            board.delete(id).map_err(|err| err.to_string())?;
            if json {
                json!({ "deleted": id.to_string() }).to_string()
            } else {
                format!("deleted {id}")
            }
        }
        Commands::Advance(args) => {
            let id = parse_id(&args.id)?;
            let task = board.advance(id).map_err(|err| err.to_string())?;
            render_task(&board, &task, json)
        }
        Commands::Retreat(args) => {
            let id = parse_id(&args.id)?;
            let task = board.retreat(id).map_err(|err| err.to_string())?;
            render_task(&board, &task, json)
        }
    };

    // The process exits right after, so an unsaved change would be lost.
    if let Some(err) = board.take_save_error() {
        return Err(format!("change applied but not saved: {err}"));
    }
    Ok(output)
}

fn ping_line() -> String {
    format!(
        "taskboard_core ping={} version={}",
        taskboard_core::ping(),
        taskboard_core::core_version()
    )
}

fn parse_id(raw: &str) -> Result<TaskId, String> {
    raw.trim()
        .parse::<TaskId>()
        .map_err(|_| format!("invalid task id `{raw}`"))
}

fn parse_deadline_arg(raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_deadline_str(value)
            .map(Some)
            .ok_or_else(|| format!("invalid deadline `{value}`; expected YYYY-MM-DD")),
    }
}

fn deadline_state(board: &Board, task: &Task) -> DeadlineState {
    board
        .deadline_state(task.id)
        .unwrap_or(DeadlineState::NoDeadline)
}

fn render_task(board: &Board, task: &Task, json: bool) -> String {
    if json {
        task_json(board, task).to_string()
    } else {
        task_line(board, task)
    }
}

fn render_tasks(board: &Board, tasks: &[&Task], json: bool) -> String {
    if json {
        let items = tasks
            .iter()
            .map(|task| task_json(board, task))
            .collect::<Vec<_>>();
        return serde_json::Value::Array(items).to_string();
    }
    tasks
        .iter()
        .map(|task| task_line(board, task))
        .collect::<Vec<_>>()
        .join("\n")
}

fn task_json(board: &Board, task: &Task) -> serde_json::Value {
    json!({
        "id": task.id.to_string(),
        "name": task.name,
        "status": task.status.as_tag(),
        "deadline": task.deadline.map(|day| day.format("%Y-%m-%d").to_string()),
        "deadlineState": deadline_state(board, task),
    })
}

fn task_line(board: &Board, task: &Task) -> String {
    let mut line = format!("[{}] {} {}", task.status.label(), task.id, task.name);
    if let Some(day) = task.deadline {
        line.push_str(&format!(" (due {})", day.format("%Y-%m-%d")));
    }
    if deadline_state(board, task) == DeadlineState::Overdue {
        line.push_str(" !overdue");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::commands::Cli;
    use clap::Parser;
    use std::path::Path;

    fn invoke(data_file: &Path, args: &[&str]) -> Result<String, String> {
        let mut argv = vec![
            "taskboard".to_string(),
            "--data-file".to_string(),
            data_file.display().to_string(),
        ];
        argv.extend(args.iter().map(|arg| arg.to_string()));
        run(Cli::try_parse_from(argv).map_err(|err| err.to_string())?)
    }

    #[test]
    fn add_then_advance_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("board.json");

        let added = invoke(&file, &["--json", "add", "Buy milk", "--deadline", "2024-01-10"])
            .unwrap();
        let added: serde_json::Value = serde_json::from_str(&added).unwrap();
        let id = added["id"].as_str().unwrap().to_string();
        assert_eq!(added["status"], "todo");

        let advanced = invoke(&file, &["advance", &id]).unwrap();
        assert!(advanced.starts_with("[In Progress]"));

        let listed = invoke(&file, &["list", "--status", "inprogress"]).unwrap();
        assert!(listed.contains(&id));
        assert!(listed.contains("(due 2024-01-10)"));
    }

    #[test]
    fn errors_are_reported_not_panicked() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("board.json");

        assert_eq!(
            invoke(&file, &["add", "   "]).unwrap_err(),
            "Task name cannot be empty"
        );
        assert!(invoke(&file, &["advance", "nope"])
            .unwrap_err()
            .contains("invalid task id"));
        assert!(invoke(&file, &["add", "x", "--deadline", "soon"])
            .unwrap_err()
            .contains("YYYY-MM-DD"));
    }

    #[test]
    fn sqlite_backend_is_selectable() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("board.sqlite3");

        invoke(&file, &["--backend", "sqlite", "add", "Pay rent"]).unwrap();
        let listed = invoke(&file, &["--backend", "sqlite", "list"]).unwrap();
        assert!(listed.contains("Pay rent"));
    }
}
