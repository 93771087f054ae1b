use std::fs;

use chrono::NaiveDate;
use taskers::{
    store::{SortKey, TaskStore},
    ui::{self, Console},
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

#[test]
fn session_edits_persist_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.txt");
    fs::write(
        &path,
        "Complete project report|12/1/2023 12:00:00 AM|Work|False\n\
         Buy groceries|11/25/2023 12:00:00 AM|Personal|True\n\
         this line is damaged\n\
         Call plumber|11/28/2023 12:00:00 AM|Home|False\n",
    )
    .unwrap();

    let report = TaskStore::load(&path);
    assert_eq!(report.corrupted.len(), 1);
    let mut store = report.store;

    // Add a task whose title contains the delimiter, then delete the plumber.
    let script = "2\nFix pipe | valve\n07/01/2024\nHome\n3\nCall plumber\n3\n4\n";
    let mut out = Vec::new();
    let outcome = {
        let mut console = Console::new(script.as_bytes(), &mut out, false);
        ui::run_app(&mut console, &mut store, &path, today).unwrap()
    };
    assert!(outcome.save_error.is_none());

    let reloaded = TaskStore::load(&path);
    assert!(reloaded.corrupted.is_empty());
    let titles: Vec<&str> = reloaded
        .store
        .sorted(SortKey::DueDate)
        .into_iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(
        titles,
        vec!["Buy groceries", "Complete project report", "Fix pipe | valve"]
    );
    assert_eq!(reloaded.store.summary().done, 1);

    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.contains(r"Fix pipe \| valve|2024-07-01|Home|false"));
}

#[test]
fn missing_file_starts_empty_and_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.txt");

    let report = TaskStore::load(&path);

    assert!(report.created);
    assert!(report.store.is_empty());
    assert!(path.exists());
}
