use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::io::store::{KEY_PROJECTS, Store};
use crate::model::{DEFAULT_PROJECT_COLOR, Project, Task};
use crate::ops::{OpsError, required};

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap_or_else(|e| panic!("hex color pattern: {e}"))
});

/// Accept `#RRGGBB` (either case), returned unchanged.
pub fn validate_color(color: &str) -> Result<&str, OpsError> {
    let color = color.trim();
    if HEX_COLOR.is_match(color) {
        Ok(color)
    } else {
        Err(OpsError::InvalidColor(color.to_string()))
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Create a project explicitly.
pub fn add_project(store: &Store, name: &str, color: Option<&str>) -> Result<Project, OpsError> {
    let name = required(name, "project name")?;
    let color = validate_color(color.unwrap_or(DEFAULT_PROJECT_COLOR))?;
    if store
        .all::<Project>()
        .iter()
        .any(|p| same_name(&p.name, name))
    {
        return Err(OpsError::DuplicateProject(name.to_string()));
    }
    let project = store.append(KEY_PROJECTS, Project::new(name, color))?;
    log::info!("added project {}", project.name);
    Ok(project)
}

/// Make sure a project record exists for `name`, creating it with the
/// default color on first reference. Returns the stored spelling of the name.
pub fn ensure_project(store: &Store, name: &str) -> Result<String, OpsError> {
    let name = required(name, "project name")?;
    if let Some(existing) = store
        .all::<Project>()
        .into_iter()
        .find(|p| same_name(&p.name, name))
    {
        return Ok(existing.name);
    }
    let project = store.append(KEY_PROJECTS, Project::new(name, DEFAULT_PROJECT_COLOR))?;
    log::info!("created project {} on first use", project.name);
    Ok(project.name)
}

/// Stored projects followed by any project names that only appear on tasks.
/// Inferred entries carry id 0 and the default color.
pub fn list_projects(store: &Store) -> Vec<Project> {
    merge_projects(store.all::<Project>(), &store.all::<Task>())
}

pub fn merge_projects(mut projects: Vec<Project>, tasks: &[Task]) -> Vec<Project> {
    let mut seen: HashSet<String> = projects.iter().map(|p| p.name.to_lowercase()).collect();
    for task in tasks {
        if task.project.trim().is_empty() {
            continue;
        }
        if seen.insert(task.project.to_lowercase()) {
            projects.push(Project {
                id: 0,
                name: task.project.clone(),
                color: DEFAULT_PROJECT_COLOR.to_string(),
                created_at: None,
            });
        }
    }
    projects
}

/// Give every task-only project a stored record. Returns how many were added.
pub fn reconcile_projects(store: &Store) -> Result<usize, OpsError> {
    let stored = store.all::<Project>();
    let known = stored.len();
    let inferred = merge_projects(stored, &store.all::<Task>()).split_off(known);
    for project in &inferred {
        store.append(KEY_PROJECTS, Project::new(&project.name, &project.color))?;
    }
    if !inferred.is_empty() {
        log::info!("reconciled {} project(s) from tasks", inferred.len());
    }
    Ok(inferred.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::KEY_TASKS;
    use crate::model::Priority;
    use tempfile::TempDir;

    fn store() -> (TempDir, Store) {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        (tmp, store)
    }

    #[test]
    fn color_validation() {
        assert_eq!(validate_color("#3b82f6").unwrap(), "#3b82f6");
        assert_eq!(validate_color(" #ABCDEF ").unwrap(), "#ABCDEF");
        for bad in ["3b82f6", "#3b82f", "#3b82f6aa", "#GGGGGG", ""] {
            assert!(matches!(validate_color(bad), Err(OpsError::InvalidColor(_))), "{bad}");
        }
    }

    #[test]
    fn add_rejects_bad_input_before_writing() {
        let (_tmp, store) = store();
        assert!(matches!(add_project(&store, "  ", None), Err(OpsError::Empty(_))));
        assert!(add_project(&store, "Web", Some("blue")).is_err());
        assert!(store.all::<Project>().is_empty());

        add_project(&store, "Web", None).unwrap();
        assert!(matches!(
            add_project(&store, "web", Some("#000000")),
            Err(OpsError::DuplicateProject(_))
        ));
        assert_eq!(store.all::<Project>()[0].color, DEFAULT_PROJECT_COLOR);
    }

    #[test]
    fn ensure_project_creates_once() {
        let (_tmp, store) = store();
        assert_eq!(ensure_project(&store, "Home").unwrap(), "Home");
        assert_eq!(ensure_project(&store, "home").unwrap(), "Home");
        assert_eq!(store.all::<Project>().len(), 1);
    }

    #[test]
    fn list_unions_task_projects() {
        let (_tmp, store) = store();
        add_project(&store, "Web", Some("#ff0000")).unwrap();
        store
            .append(KEY_TASKS, Task::new("a", "Legacy", Priority::Medium))
            .unwrap();
        store
            .append(KEY_TASKS, Task::new("b", "web", Priority::Medium))
            .unwrap();

        let names: Vec<String> = list_projects(&store).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Web", "Legacy"]);

        assert_eq!(reconcile_projects(&store).unwrap(), 1);
        assert_eq!(reconcile_projects(&store).unwrap(), 0);
        assert!(list_projects(&store).iter().all(|p| p.id != 0));
    }
}
