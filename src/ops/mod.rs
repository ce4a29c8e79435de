pub mod export;
pub mod habit_ops;
pub mod note_ops;
pub mod profile_ops;
pub mod project_ops;
pub mod stats;
pub mod task_ops;
pub mod timer;

use std::path::PathBuf;

use crate::io::store::{Record, StoreError};

/// Error type for record operations. Validation failures are reported before
/// anything is written.
#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("invalid color {0:?}: expected #RRGGBB")]
    InvalidColor(String),
    #[error("invalid email address {0:?}")]
    InvalidEmail(String),
    #[error("project already exists: {0}")]
    DuplicateProject(String),
    #[error("{kind} not found: {query}")]
    NotFound { kind: &'static str, query: String },
    #[error("{query:?} matches {count} {kind}s; use the id")]
    Ambiguous {
        kind: &'static str,
        query: String,
        count: usize,
    },
    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid import file: {0}")]
    Import(serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Trimmed, non-empty user text.
pub(crate) fn required<'a>(value: &'a str, what: &'static str) -> Result<&'a str, OpsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(OpsError::Empty(what))
    } else {
        Ok(trimmed)
    }
}

/// Find one record by id, exact name, or unique name fragment
/// (case-insensitive), in that order.
pub(crate) fn resolve<'a, T: Record>(
    items: &'a [T],
    query: &str,
    name: impl Fn(&T) -> &str,
    kind: &'static str,
) -> Result<&'a T, OpsError> {
    let query = query.trim();
    if let Ok(id) = query.parse::<u64>() {
        if let Some(item) = items.iter().find(|item| item.id() == id) {
            return Ok(item);
        }
    }

    let needle = query.to_lowercase();
    if let Some(item) = items.iter().find(|item| name(item).to_lowercase() == needle) {
        return Ok(item);
    }

    let partial: Vec<&T> = items
        .iter()
        .filter(|item| !needle.is_empty() && name(item).to_lowercase().contains(&needle))
        .collect();
    match partial.as_slice() {
        [item] => Ok(item),
        [] => Err(OpsError::NotFound {
            kind,
            query: query.to_string(),
        }),
        many => Err(OpsError::Ambiguous {
            kind,
            query: query.to_string(),
            count: many.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Task};

    fn tasks() -> Vec<Task> {
        ["Write intro", "Write outro", "Review"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut t = Task::new(name, "p", Priority::Medium);
                t.id = 100 + i as u64;
                t
            })
            .collect()
    }

    fn by_name(t: &Task) -> &str {
        &t.name
    }

    #[test]
    fn resolve_by_id_name_and_fragment() {
        let tasks = tasks();
        assert_eq!(resolve(&tasks, "101", by_name, "task").unwrap().name, "Write outro");
        assert_eq!(resolve(&tasks, "review", by_name, "task").unwrap().id, 102);
        assert_eq!(resolve(&tasks, "intro", by_name, "task").unwrap().id, 100);
    }

    #[test]
    fn resolve_reports_ambiguity_and_misses() {
        let tasks = tasks();
        assert!(matches!(
            resolve(&tasks, "write", by_name, "task"),
            Err(OpsError::Ambiguous { count: 2, .. })
        ));
        assert!(matches!(
            resolve(&tasks, "deploy", by_name, "task"),
            Err(OpsError::NotFound { .. })
        ));
        assert!(resolve(&tasks, "  ", by_name, "task").is_err());
    }

    #[test]
    fn required_trims() {
        assert_eq!(required("  hi ", "name").unwrap(), "hi");
        assert!(matches!(required("   ", "name"), Err(OpsError::Empty("name"))));
    }
}
