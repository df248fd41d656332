//! Concurrency tests for gymlog.
//!
//! Several processes appending to the same journal must not interleave or
//! lose lines (journal appends take an exclusive file lock).

use assert_cmd::Command;
use predicates::prelude::*;
use std::thread;
use tempfile::TempDir;

fn cli() -> Command {
    Command::cargo_bin("gymlog").expect("Failed to find gymlog binary")
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_concurrent_logging_on_different_days() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli().arg("seed").arg("--data-dir").arg(&data_dir).assert().success();

    let sessions = [
        ("Upper A", "incline_db_press:1:26x10"),
        ("Lower A", "back_squat:1:100x8"),
        ("Upper B", "flat_db_press:1:30x9"),
        ("Lower B", "deadlift:1:140x5"),
    ];

    let handles: Vec<_> = sessions
        .iter()
        .map(|&(day, set)| {
            let data_dir = data_dir.clone();
            thread::spawn(move || {
                cli()
                    .arg("log")
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .args(["--day", day, "--date", "2024-04-01", "--set", set])
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    // Every line of the journal is intact JSON
    let journal = std::fs::read_to_string(data_dir.join("journal.wal")).unwrap();
    assert_eq!(journal.lines().count(), 8);
    for line in journal.lines() {
        assert!(line.starts_with('{') && line.ends_with('}'), "Torn line: {}", line);
    }

    for (day, _) in sessions {
        cli()
            .arg("show")
            .arg("--data-dir")
            .arg(&data_dir)
            .args(["--day", day, "--date", "2024-04-01"])
            .assert()
            .success()
            .stdout(predicate::str::contains("(1 sets)"));
    }
}
