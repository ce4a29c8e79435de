use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

const STATE_FILE: &str = ".ui-state.json";

/// Persisted dashboard state (written to .ui-state.json)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    /// Which panel has focus ("tasks", "habits", "sessions")
    pub panel: String,
    /// Id of the task under the cursor
    #[serde(default)]
    pub selected_task: Option<u64>,
    #[serde(default)]
    pub habit_cursor: usize,
    /// Show Done tasks in the task panel
    #[serde(default)]
    pub show_done: bool,
}

/// Read .ui-state.json from the data directory
pub fn read_ui_state(data_dir: &Path) -> Option<UiState> {
    let content = fs::read_to_string(data_dir.join(STATE_FILE)).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .ui-state.json to the data directory
pub fn write_ui_state(data_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let content = serde_json::to_string_pretty(state)?;
    fs::write(data_dir.join(STATE_FILE), content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let state = UiState {
            panel: "habits".into(),
            selected_task: Some(1_715_000_000_000),
            habit_cursor: 2,
            show_done: true,
        };
        write_ui_state(dir.path(), &state).unwrap();
        assert_eq!(read_ui_state(dir.path()), Some(state));
    }

    #[test]
    fn read_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_ui_state(dir.path()).is_none());
    }

    #[test]
    fn read_malformed_json_returns_none() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STATE_FILE), "not json {{{").unwrap();
        assert!(read_ui_state(dir.path()).is_none());
    }

    #[test]
    fn serde_defaults_on_minimal_object() {
        let state: UiState = serde_json::from_str(r#"{"panel":"tasks"}"#).unwrap();
        assert_eq!(state.panel, "tasks");
        assert!(state.selected_task.is_none());
        assert_eq!(state.habit_cursor, 0);
        assert!(!state.show_done);
    }
}
