//! Integration tests for the `flow` CLI.
//!
//! Each test creates a temp data directory, runs `flow -D <dir>` as a
//! subprocess, and verifies stdout and/or the JSON files it leaves behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;
use serde_json::Value;

/// Get the path to the built `flow` binary.
fn flow_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("flow");
    path
}

/// Run `flow -D <dir>` with the given args, returning (stdout, stderr, success).
fn run_flow(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(flow_bin())
        .arg("-D")
        .arg(dir)
        .args(args)
        .env_remove("FLOWSTATE_LOG")
        .output()
        .expect("failed to run flow");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `flow` expecting success, return stdout.
fn run_flow_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_flow(dir, args);
    if !success {
        panic!(
            "flow {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `flow` expecting failure, return stderr.
fn run_flow_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_flow(dir, args);
    if success {
        panic!("flow {:?} should have failed:\nstdout: {}", args, stdout);
    }
    stderr
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let mut with_json = args.to_vec();
    with_json.push("--json");
    let out = run_flow_ok(dir, &with_json);
    serde_json::from_str(&out).unwrap_or_else(|e| panic!("bad json from {:?}: {}\n{}", args, e, out))
}

fn read_key(dir: &Path, key: &str) -> Value {
    let text = fs::read_to_string(dir.join(format!("{}.json", key))).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// A data directory with two tasks in "Book" and one habit.
fn seeded() -> tempfile::TempDir {
    let tmp = tempfile::TempDir::new().unwrap();
    run_flow_ok(tmp.path(), &["task", "add", "Draft chapter", "-p", "Book", "--priority", "high"]);
    run_flow_ok(tmp.path(), &["task", "add", "Edit chapter", "-p", "Book"]);
    run_flow_ok(tmp.path(), &["habit", "add", "Read 20 pages"]);
    tmp
}

// ---------------------------------------------------------------------------
// Init & config
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    let dir = tmp.path().join("data");
    let out = run_flow_ok(&dir, &["init"]);
    assert!(out.contains("initialized"));
    assert!(dir.join("flowstate.toml").exists());

    let out = run_flow_ok(&dir, &["init"]);
    assert!(out.contains("already initialized"));
}

#[test]
fn test_config_set_get_and_default_minutes() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_flow_ok(tmp.path(), &["config", "set", "timer.default_minutes", "50"]);
    assert_eq!(run_flow_ok(tmp.path(), &["config", "get", "timer.default_minutes"]).trim(), "50");

    // Comments from the template survive the edit
    let toml = fs::read_to_string(tmp.path().join("flowstate.toml")).unwrap();
    assert!(toml.contains("# flowstate configuration"));

    let status = run_json(tmp.path(), &["status"]);
    assert_eq!(status["plannedSecs"], 3000);
}

#[test]
fn test_config_rejects_bad_values() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_flow_err(tmp.path(), &["config", "set", "timer.default_minutes", "500"]);
    assert!(err.contains("between 1 and 180"));
    let err = run_flow_err(tmp.path(), &["config", "set", "timer.nope", "1"]);
    assert!(err.contains("unknown config key"));
}

// ---------------------------------------------------------------------------
// Tasks & projects
// ---------------------------------------------------------------------------

#[test]
fn test_task_add_creates_project() {
    let tmp = seeded();
    let projects = read_key(tmp.path(), "projects");
    let projects = projects.as_array().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["name"], "Book");
    assert_eq!(projects[0]["color"], "#3b82f6");

    // Case-insensitive match reuses the project
    run_flow_ok(tmp.path(), &["task", "add", "Index", "-p", "book"]);
    let tasks = read_key(tmp.path(), "tasks");
    assert_eq!(tasks[2]["project"], "Book");
    assert_eq!(read_key(tmp.path(), "projects").as_array().unwrap().len(), 1);
}

#[test]
fn test_task_list_and_done() {
    let tmp = seeded();
    let out = run_flow_ok(tmp.path(), &["task", "list"]);
    assert!(out.contains("[ ] Draft chapter  (Book)  0m  !"));
    assert!(out.contains("[ ] Edit chapter  (Book)  0m"));

    let out = run_flow_ok(tmp.path(), &["task", "done", "draft"]);
    assert_eq!(out.trim(), "done: Draft chapter");

    let out = run_flow_ok(tmp.path(), &["task", "list"]);
    assert!(!out.contains("Draft chapter"));
    let out = run_flow_ok(tmp.path(), &["task", "list", "--all"]);
    assert!(out.contains("[x] Draft chapter"));
}

#[test]
fn test_task_ambiguous_query_fails() {
    let tmp = seeded();
    let err = run_flow_err(tmp.path(), &["task", "done", "chapter"]);
    assert!(err.starts_with("error:"));
    assert!(err.contains("chapter"));
}

#[test]
fn test_task_search_and_json() {
    let tmp = seeded();
    let tasks = run_json(tmp.path(), &["task", "list", "--search", "^edit"]);
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["name"], "Edit chapter");
    assert_eq!(tasks[0]["status"], "To Do");
    assert_eq!(tasks[0]["priority"], "medium");
}

#[test]
fn test_task_rm_logs_recovery() {
    let tmp = seeded();
    run_flow_ok(tmp.path(), &["task", "rm", "Edit chapter"]);
    assert_eq!(read_key(tmp.path(), "tasks").as_array().unwrap().len(), 1);

    let entries = run_json(tmp.path(), &["recovery"]);
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].to_string().contains("Edit chapter"));
}

#[test]
fn test_project_add_validates_color() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_flow_err(tmp.path(), &["project", "add", "Web", "--color", "red"]);
    assert!(err.contains("red"));
    run_flow_ok(tmp.path(), &["project", "add", "Web", "--color", "#10B981"]);
    let projects = run_json(tmp.path(), &["project", "list"]);
    assert_eq!(projects[0]["name"], "Web");
    assert_eq!(projects[0]["hours"], 0.0);
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

#[test]
fn test_start_requires_task() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_flow_err(tmp.path(), &["start"]);
    assert!(err.contains("select a task first"));
}

#[test]
fn test_session_lifecycle_across_invocations() {
    let tmp = seeded();
    let out = run_flow_ok(tmp.path(), &["start", "draft", "--minutes", "45"]);
    assert!(out.contains("running (countdown)"));
    assert!(out.contains("task: Draft chapter (Book)"));

    run_flow_ok(tmp.path(), &["distraction"]);
    run_flow_ok(tmp.path(), &["distraction"]);
    let out = run_flow_ok(tmp.path(), &["distraction", "--undo"]);
    assert_eq!(out.trim(), "distractions: 1");

    let out = run_flow_ok(tmp.path(), &["pause"]);
    assert!(out.contains("paused"));
    let out = run_flow_ok(tmp.path(), &["start"]);
    assert!(out.contains("running"));

    // Stopping without a rating leaves it waiting for one
    let out = run_flow_ok(tmp.path(), &["stop"]);
    assert!(out.contains("completed"));
    let err = run_flow_err(tmp.path(), &["complete"]);
    assert!(err.contains("rate the session"));

    let session = run_json(tmp.path(), &["complete", "-r", "4", "--tag", "deep", "--notes", "good"]);
    assert_eq!(session["taskName"], "Draft chapter");
    assert_eq!(session["project"], "Book");
    assert_eq!(session["rating"], 4);
    assert_eq!(session["distractions"], 1);
    assert_eq!(session["tags"], serde_json::json!(["deep"]));
    assert_eq!(session["duration"], 0);

    let status = run_json(tmp.path(), &["status"]);
    assert_eq!(status["status"], "idle");

    let tasks = read_key(tmp.path(), "tasks");
    assert_eq!(tasks[0]["status"], "In Progress");
}

#[test]
fn test_start_rejects_out_of_range_minutes() {
    let tmp = seeded();
    let err = run_flow_err(tmp.path(), &["start", "draft", "--minutes", "0"]);
    assert!(err.contains("between 1 and 180"));
    let status = run_json(tmp.path(), &["status"]);
    assert_eq!(status["status"], "idle");
}

#[test]
fn test_stop_with_rating_saves() {
    let tmp = seeded();
    run_flow_ok(tmp.path(), &["start", "edit", "--mode", "elapsed"]);
    let out = run_flow_ok(tmp.path(), &["stop", "-r", "5"]);
    assert!(out.starts_with("saved 0m on Edit chapter"));
    assert_eq!(read_key(tmp.path(), "sessions").as_array().unwrap().len(), 1);
}

#[test]
fn test_cancel_discards() {
    let tmp = seeded();
    run_flow_ok(tmp.path(), &["start", "edit"]);
    let out = run_flow_ok(tmp.path(), &["cancel"]);
    assert_eq!(out.trim(), "session discarded");
    let out = run_flow_ok(tmp.path(), &["cancel"]);
    assert_eq!(out.trim(), "no session to cancel");
    assert!(!tmp.path().join("sessions.json").exists());
}

// ---------------------------------------------------------------------------
// Habits & notes
// ---------------------------------------------------------------------------

#[test]
fn test_habit_check_and_uncheck() {
    let tmp = seeded();
    let out = run_flow_ok(tmp.path(), &["habit", "check", "read"]);
    assert!(out.starts_with("[x] Read 20 pages"));

    let habits = run_json(tmp.path(), &["habit"]);
    assert_eq!(habits[0]["doneToday"], true);

    run_flow_ok(tmp.path(), &["habit", "check", "read", "--off"]);
    let out = run_flow_ok(tmp.path(), &["habit", "list"]);
    assert!(out.contains("[ ] Read 20 pages"));
    assert!(out.contains("0/1 today (0%)"));
}

#[test]
fn test_notes_newest_first() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_flow_ok(tmp.path(), &["note", "add", "first"]);
    run_flow_ok(tmp.path(), &["note", "add", "second"]);
    let notes = run_json(tmp.path(), &["note"]);
    assert_eq!(notes[0]["text"], "second");
    assert_eq!(notes[1]["text"], "first");

    let id = notes[1]["id"].as_u64().unwrap().to_string();
    run_flow_ok(tmp.path(), &["note", "rm", &id]);
    assert_eq!(run_json(tmp.path(), &["note"]).as_array().unwrap().len(), 1);

    let err = run_flow_err(tmp.path(), &["note", "add", "   "]);
    assert!(err.starts_with("error:"));
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[test]
fn test_stats_on_empty_store() {
    let tmp = tempfile::TempDir::new().unwrap();
    let stats = run_json(tmp.path(), &["stats"]);
    assert_eq!(stats["todayMinutes"], 0);
    assert_eq!(stats["streak"], 0);
    assert_eq!(stats["productivityScore"], 0);
    assert_eq!(stats["focusByDay"].as_array().unwrap().len(), 7);

    let out = run_flow_ok(tmp.path(), &["stats"]);
    assert!(out.contains("today:    0m  (0 sessions)"));

    let insights = run_json(tmp.path(), &["insights"]);
    assert_eq!(insights["bestHour"], Value::Null);
}

#[test]
fn test_stats_after_session() {
    let tmp = seeded();
    run_flow_ok(tmp.path(), &["start", "draft"]);
    run_flow_ok(tmp.path(), &["stop", "-r", "3"]);
    run_flow_ok(tmp.path(), &["habit", "check", "read"]);

    let stats = run_json(tmp.path(), &["stats"]);
    assert_eq!(stats["todaySessions"], 1);
    assert_eq!(stats["streak"], 1);
    assert_eq!(stats["habitsDone"], 1);
    assert_eq!(stats["productivityScore"], 100);

    let sessions = run_json(tmp.path(), &["sessions", "-p", "book"]);
    assert_eq!(sessions.as_array().unwrap().len(), 1);
    let sessions = run_json(tmp.path(), &["sessions", "-p", "web"]);
    assert!(sessions.as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[test]
fn test_profile_and_theme() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_flow_err(tmp.path(), &["profile", "--name", "Sam", "--email", "nope"]);
    assert!(err.contains("nope"));

    let out = run_flow_ok(tmp.path(), &["profile", "--name", "Sam Lee", "--email", "sam@example.com"]);
    assert_eq!(out.trim(), "Sam Lee <sam@example.com>");

    assert_eq!(run_flow_ok(tmp.path(), &["theme"]).trim(), "system");
    run_flow_ok(tmp.path(), &["theme", "light"]);
    assert_eq!(run_flow_ok(tmp.path(), &["theme"]).trim(), "light");
    assert!(run_flow_err(tmp.path(), &["theme", "neon"]).contains("neon"));
}

// ---------------------------------------------------------------------------
// Data management
// ---------------------------------------------------------------------------

#[test]
fn test_export_import_round_trip() {
    let tmp = seeded();
    run_flow_ok(tmp.path(), &["note", "add", "keep me"]);
    run_flow_ok(tmp.path(), &["theme", "dark"]);
    let file = tmp.path().join("backup.json");
    let file_str = file.to_str().unwrap();
    run_flow_ok(tmp.path(), &["export", "-o", file_str]);

    let bundle: Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(bundle["tasks"].as_array().unwrap().len(), 2);
    assert_eq!(bundle["settings"]["theme"], "dark");

    run_flow_ok(tmp.path(), &["reset", "--yes"]);
    assert!(run_json(tmp.path(), &["task", "list", "--all"]).as_array().unwrap().is_empty());

    let out = run_flow_ok(tmp.path(), &["import", file_str]);
    assert!(out.contains("2 tasks"));
    let tasks = run_json(tmp.path(), &["task", "list", "--all"]);
    assert_eq!(tasks.as_array().unwrap().len(), 2);
    assert_eq!(run_json(tmp.path(), &["note"])[0]["text"], "keep me");
    assert_eq!(run_flow_ok(tmp.path(), &["theme"]).trim(), "dark");
}

#[test]
fn test_reset_needs_confirmation() {
    let tmp = seeded();
    let err = run_flow_err(tmp.path(), &["reset"]);
    assert!(err.contains("--yes"));
    assert_eq!(read_key(tmp.path(), "tasks").as_array().unwrap().len(), 2);
}

#[test]
fn test_import_rejects_garbage() {
    let tmp = tempfile::TempDir::new().unwrap();
    let file = tmp.path().join("bad.json");
    fs::write(&file, "not json").unwrap();
    let err = run_flow_err(tmp.path(), &["import", file.to_str().unwrap()]);
    assert!(err.starts_with("error:"));
}

#[test]
fn test_corrupt_store_file_reads_empty() {
    let tmp = seeded();
    fs::write(tmp.path().join("tasks.json"), "{ not valid").unwrap();
    let tasks = run_json(tmp.path(), &["task", "list", "--all"]);
    assert!(tasks.as_array().unwrap().is_empty());
}

#[test]
fn test_recovery_prune_and_path() {
    let tmp = seeded();
    run_flow_ok(tmp.path(), &["task", "rm", "edit"]);
    let path = run_flow_ok(tmp.path(), &["recovery", "path"]);
    assert!(path.trim().ends_with(".recovery.log"));

    let pruned = run_json(tmp.path(), &["recovery", "prune", "--all"]);
    assert_eq!(pruned["removed"], 1);
    assert_eq!(run_flow_ok(tmp.path(), &["recovery"]).trim(), "recovery log is empty");
}
