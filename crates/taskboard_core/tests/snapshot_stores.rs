use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::fs;
use taskboard_core::persist::sqlite::HISTORY_LIMIT;
use taskboard_core::{
    FixedClock, JsonFileStore, SnapshotStore, SqliteSnapshotStore, TaskStatus, TaskStore,
};

#[test]
fn json_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let mut store = TaskStore::open(JsonFileStore::in_dir(dir.path()));
    let task = store
        .add("Buy milk", NaiveDate::from_ymd_opt(2024, 1, 10))
        .unwrap();
    store.advance(task.id).unwrap();
    let before = store.snapshot().clone();
    drop(store);

    let reopened = TaskStore::open(JsonFileStore::in_dir(dir.path()));
    assert_eq!(reopened.snapshot(), &before);
    assert_eq!(
        reopened.snapshot().partition(TaskStatus::InProgress)[0].id,
        task.id
    );
}

#[test]
fn json_store_reads_original_app_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all-tasks.json");
    fs::write(
        &path,
        r#"{"toDoTasks":[{"type":"todo","name":"Laundry","additionTime":"7:42 PM"}],"inProgressTasks":[],"doneTasks":[{"type":"done","name":"Dishes"}]}"#,
    )
    .unwrap();

    let store = TaskStore::open(JsonFileStore::new(&path));

    assert_eq!(store.snapshot().len(), 2);
    assert_eq!(store.snapshot().partition(TaskStatus::Done)[0].name, "Dishes");
}

#[test]
fn corrupt_json_is_set_aside_before_the_first_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all-tasks.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(TaskStore::try_open(JsonFileStore::new(&path)).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");

    let mut store = TaskStore::open(JsonFileStore::new(&path));
    assert!(store.snapshot().is_empty());
    store.add("Fresh start", None).unwrap();

    let set_aside = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|entry| {
            entry
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("all-tasks.json.unreadable-")
        })
        .collect::<Vec<_>>();
    assert_eq!(set_aside.len(), 1);
    assert_eq!(fs::read_to_string(&set_aside[0]).unwrap(), "{ not json");
    assert!(fs::read_to_string(&path).unwrap().contains("Fresh start"));
}

#[test]
fn newer_schema_json_survives_a_lenient_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all-tasks.json");
    let future = r#"{"schemaVersion":99,"toDoTasks":[],"inProgressTasks":[],"doneTasks":[]}"#;
    fs::write(&path, future).unwrap();

    let mut store = TaskStore::open(JsonFileStore::new(&path));
    store.add("Offline note", None).unwrap();

    let kept = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| fs::read_to_string(entry.unwrap().path()).unwrap())
        .filter(|text| text == future)
        .count();
    assert_eq!(kept, 1);
}

#[test]
fn json_store_keeps_sub_second_creation_time() {
    let dir = tempfile::tempdir().unwrap();
    let created = Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap()
        + Duration::nanoseconds(179_068_411);

    let mut store =
        TaskStore::open(JsonFileStore::in_dir(dir.path())).with_clock(FixedClock::new(created));
    let task = store.add("Buy milk", None).unwrap();
    let before = store.snapshot().clone();
    drop(store);

    let reopened = TaskStore::open(JsonFileStore::in_dir(dir.path()));
    assert_eq!(reopened.get(task.id).unwrap().created_at, Some(created));
    assert_eq!(reopened.snapshot(), &before);
}

#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");

    let mut store = TaskStore::open(SqliteSnapshotStore::open(&path).unwrap());
    let task = store.add("Pay rent", None).unwrap();
    drop(store);

    let reopened = TaskStore::open(SqliteSnapshotStore::open(&path).unwrap());
    assert_eq!(reopened.get(task.id).unwrap().name, "Pay rent");
}

#[test]
fn sqlite_slots_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");

    let mut work = TaskStore::open(SqliteSnapshotStore::open(&path).unwrap().with_slot("work"));
    work.add("standup", None).unwrap();

    let home = TaskStore::open(SqliteSnapshotStore::open(&path).unwrap().with_slot("home"));
    assert!(home.snapshot().is_empty());
}

#[test]
fn sqlite_history_keeps_replaced_documents_up_to_limit() {
    let store = SqliteSnapshotStore::open_in_memory().unwrap();
    assert!(store.load().unwrap().is_none());

    let mut board = TaskStore::open(store);
    for index in 0..(HISTORY_LIMIT + 3) {
        board.add(&format!("task {index}"), None).unwrap();
    }

    let history = board.snapshot_store().history(100).unwrap();
    assert_eq!(history.len(), HISTORY_LIMIT as usize);
    // Newest replaced document is one task behind the current board.
    assert_eq!(history[0].record_count(), board.snapshot().len() - 1);
}
