use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value, json};

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::store::{KEY_TASKS, Store};
use crate::model::{Priority, Task, TaskStatus};
use crate::ops::{OpsError, project_ops, required, resolve};

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Narrowing applied by `flow task list` and the dashboard task panel
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub project: Option<String>,
    pub status: Option<TaskStatus>,
    pub search: Option<Regex>,
    /// Hide Done tasks unless a status is asked for
    pub open_only: bool,
}

impl TaskFilter {
    /// Case-insensitive search over name and project.
    pub fn with_search(mut self, pattern: &str) -> Result<Self, OpsError> {
        self.search = Some(RegexBuilder::new(pattern).case_insensitive(true).build()?);
        Ok(self)
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(project) = &self.project {
            if !task.project.eq_ignore_ascii_case(project) {
                return false;
            }
        }
        match self.status {
            Some(status) if task.status != status => return false,
            None if self.open_only && task.status == TaskStatus::Done => return false,
            _ => {}
        }
        if let Some(re) = &self.search {
            if !re.is_match(&task.name) && !re.is_match(&task.project) {
                return false;
            }
        }
        true
    }
}

pub fn list_tasks(store: &Store, filter: &TaskFilter) -> Vec<Task> {
    store
        .all::<Task>()
        .into_iter()
        .filter(|t| filter.matches(t))
        .collect()
}

/// Find a task by id or name.
pub fn find_task(store: &Store, query: &str) -> Result<Task, OpsError> {
    let tasks = store.all::<Task>();
    resolve(&tasks, query, |t| t.name.as_str(), "task").cloned()
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// Add a task. An unknown project is created on the spot.
pub fn add_task(store: &Store, name: &str, project: &str, priority: Priority) -> Result<Task, OpsError> {
    let name = required(name, "task name")?;
    let project = required(project, "project")?;
    let project = project_ops::ensure_project(store, project)?;
    let task = store.append(KEY_TASKS, Task::new(name, &project, priority))?;
    log::info!("added task {} ({})", task.id, task.name);
    Ok(task)
}

pub fn set_status(store: &Store, query: &str, status: TaskStatus) -> Result<Task, OpsError> {
    let mut task = find_task(store, query)?;
    store.update(KEY_TASKS, task.id, &patch(json!({ "status": status })))?;
    task.status = status;
    Ok(task)
}

pub fn mark_done(store: &Store, query: &str) -> Result<Task, OpsError> {
    set_status(store, query, TaskStatus::Done)
}

/// Delete a task. Its sessions are kept and still name it. The removed
/// record is copied to the recovery log.
pub fn remove_task(store: &Store, query: &str) -> Result<Task, OpsError> {
    let task = find_task(store, query)?;
    if let Some(removed) = store.remove(KEY_TASKS, task.id)? {
        recovery::log_recovery(
            store.dir(),
            RecoveryEntry::new(RecoveryCategory::Delete, format!("task \"{}\" deleted", task.name))
                .field("Key", KEY_TASKS)
                .body(serde_json::to_string_pretty(&removed).unwrap_or_default()),
        );
    }
    Ok(task)
}

fn patch(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
