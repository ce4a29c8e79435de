//! Whole-store export, import and reset.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::io::recovery;
use crate::io::store::{
    KEY_HABITS, KEY_NOTES, KEY_PROJECTS, KEY_SESSIONS, KEY_TASKS, Record, Store, StoreError,
};
use crate::model::{Habit, Note, Project, Session, Task, ThemePref};
use crate::ops::{OpsError, profile_ops, project_ops};

pub const DEFAULT_EXPORT_FILE: &str = "flowstate-export.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default)]
    pub theme: ThemePref,
}

/// Everything a user owns, in the layout of the export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub tasks: Vec<Task>,
    pub sessions: Vec<Session>,
    pub projects: Vec<Project>,
    pub habits: Vec<Habit>,
    pub notes: Vec<Note>,
    pub settings: ExportSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Local>>,
}

/// An import file read leniently: absent collections are left alone and
/// records that do not decode are skipped.
#[derive(Debug, Default, Deserialize)]
struct ImportFile {
    tasks: Option<Vec<Value>>,
    sessions: Option<Vec<Value>>,
    projects: Option<Vec<Value>>,
    habits: Option<Vec<Value>>,
    notes: Option<Vec<Value>>,
    settings: Option<ImportSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct ImportSettings {
    theme: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub tasks: Option<usize>,
    pub sessions: Option<usize>,
    pub projects: Option<usize>,
    pub habits: Option<usize>,
    pub notes: Option<usize>,
    pub theme: Option<ThemePref>,
    /// Records dropped because they did not decode
    pub skipped: usize,
    /// Project records created for names only found on tasks
    pub projects_added: usize,
}

pub fn export_bundle(store: &Store, now: DateTime<Local>) -> ExportBundle {
    ExportBundle {
        tasks: store.all(),
        sessions: store.all(),
        projects: store.all(),
        habits: store.all(),
        notes: store.all(),
        settings: ExportSettings {
            theme: profile_ops::load_theme(store),
        },
        exported_at: Some(now),
    }
}

/// Write the export as pretty JSON to `path`.
pub fn export_to(store: &Store, path: &Path, now: DateTime<Local>) -> Result<ExportBundle, OpsError> {
    let bundle = export_bundle(store, now);
    let content = serde_json::to_string_pretty(&bundle).map_err(StoreError::Encode)?;
    recovery::atomic_write(path, content.as_bytes()).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("exported to {}", path.display());
    Ok(bundle)
}

/// Replace the collections present in the file at `path`, then give every
/// task-only project a record.
pub fn import_from(store: &Store, path: &Path) -> Result<ImportSummary, OpsError> {
    let text = fs::read_to_string(path).map_err(|source| OpsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    import_str(store, &text)
}

pub fn import_str(store: &Store, text: &str) -> Result<ImportSummary, OpsError> {
    let file: ImportFile = serde_json::from_str(text).map_err(OpsError::Import)?;
    let mut summary = ImportSummary::default();

    summary.tasks = replace::<Task>(store, KEY_TASKS, file.tasks, &mut summary.skipped)?;
    summary.sessions = replace::<Session>(store, KEY_SESSIONS, file.sessions, &mut summary.skipped)?;
    summary.projects = replace::<Project>(store, KEY_PROJECTS, file.projects, &mut summary.skipped)?;
    summary.habits = replace::<Habit>(store, KEY_HABITS, file.habits, &mut summary.skipped)?;
    summary.notes = replace::<Note>(store, KEY_NOTES, file.notes, &mut summary.skipped)?;

    if let Some(theme) = file.settings.and_then(|s| s.theme) {
        match serde_json::from_value::<ThemePref>(theme) {
            Ok(theme) => {
                profile_ops::save_theme(store, theme)?;
                summary.theme = Some(theme);
            }
            Err(_) => summary.skipped += 1,
        }
    }

    summary.projects_added = project_ops::reconcile_projects(store)?;
    if summary.skipped > 0 {
        log::warn!("import skipped {} unreadable record(s)", summary.skipped);
    }
    Ok(summary)
}

fn replace<T: Record>(
    store: &Store,
    key: &str,
    values: Option<Vec<Value>>,
    skipped: &mut usize,
) -> Result<Option<usize>, OpsError> {
    let Some(values) = values else {
        return Ok(None);
    };
    let total = values.len();
    let records: Vec<T> = decode_all(values);
    *skipped += total - records.len();
    store.set(key, &records)?;
    Ok(Some(records.len()))
}

fn decode_all<T: DeserializeOwned>(values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect()
}

/// Delete every record and preference.
pub fn reset_all(store: &Store) -> Result<(), OpsError> {
    store.clear_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::KEY_TIMER;
    use crate::model::Priority;
    use crate::ops::{habit_ops, note_ops, task_ops};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 5, 14, 18, 0, 0).unwrap()
    }

    fn seeded() -> (TempDir, Store) {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(&tmp.path().join("data")).unwrap();
        let task = task_ops::add_task(&store, "Write", "Book", Priority::High).unwrap();
        store
            .append(
                KEY_SESSIONS,
                Session {
                    id: 0,
                    task_id: Some(task.id),
                    task_name: task.name.clone(),
                    project: task.project.clone(),
                    duration: 25,
                    rating: 4,
                    tags: ["quiet".to_string()].into_iter().collect(),
                    distractions: 1,
                    notes: "good".into(),
                    date: now(),
                },
            )
            .unwrap();
        habit_ops::add_habit(&store, "Walk", now().date_naive()).unwrap();
        note_ops::add_note(&store, "idea", now()).unwrap();
        profile_ops::save_theme(&store, ThemePref::Dark).unwrap();
        (tmp, store)
    }

    #[test]
    fn export_then_import_restores_collections() {
        let (tmp, store) = seeded();
        let path = tmp.path().join(DEFAULT_EXPORT_FILE);
        let exported = export_to(&store, &path, now()).unwrap();

        let parsed: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        for key in ["tasks", "sessions", "projects", "habits", "notes", "settings"] {
            assert!(parsed.get(key).is_some(), "missing {key}");
        }
        assert_eq!(parsed["settings"]["theme"], "dark");

        reset_all(&store).unwrap();
        assert!(store.all::<Task>().is_empty());

        let summary = import_from(&store, &path).unwrap();
        assert_eq!(summary.tasks, Some(1));
        assert_eq!(summary.sessions, Some(1));
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.projects_added, 0);

        let restored = export_bundle(&store, now());
        assert_eq!(restored, exported);
    }

    #[test]
    fn import_leaves_absent_collections_and_reconciles_projects() {
        let (_tmp, store) = seeded();
        let summary = import_str(
            &store,
            r#"{"tasks":[{"id":5,"name":"Legacy","project":"Old","status":"Done","focusTime":2.0,"priority":"medium"},{"bogus":1}]}"#,
        )
        .unwrap();
        assert_eq!(summary.tasks, Some(1));
        assert_eq!(summary.sessions, None);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.projects_added, 1);

        assert_eq!(store.all::<Session>().len(), 1);
        let names: Vec<String> = store.all::<Project>().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Book", "Old"]);
    }

    #[test]
    fn import_rejects_malformed_file() {
        let (_tmp, store) = seeded();
        assert!(matches!(import_str(&store, "not json"), Err(OpsError::Import(_))));
        assert!(matches!(
            import_from(&store, Path::new("/nonexistent/export.json")),
            Err(OpsError::Read { .. })
        ));
        assert_eq!(store.all::<Task>().len(), 1);
    }

    #[test]
    fn reset_clears_everything() {
        let (_tmp, store) = seeded();
        store.put_one(KEY_TIMER, &"anything").unwrap();
        reset_all(&store).unwrap();
        let bundle = export_bundle(&store, now());
        assert!(bundle.tasks.is_empty() && bundle.sessions.is_empty() && bundle.notes.is_empty());
        assert_eq!(bundle.settings.theme, ThemePref::System);
        assert!(!store.key_path(KEY_TIMER).exists());
    }
}
