use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Color given to projects created without one
pub const DEFAULT_PROJECT_COLOR: &str = "#3b82f6";

/// A named group of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Local>>,
}

fn default_color() -> String {
    DEFAULT_PROJECT_COLOR.to_string()
}

impl Project {
    pub fn new(name: &str, color: &str) -> Self {
        Project {
            id: 0,
            name: name.to_string(),
            color: color.to_string(),
            created_at: Some(Local::now()),
        }
    }
}
