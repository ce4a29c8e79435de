use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Workflow status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl TaskStatus {
    /// Human-readable label, matching the stored form
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    /// Parse a status from user input (`todo`, `in-progress`, `done`, or the label)
    pub fn parse_status(s: &str) -> Option<TaskStatus> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" | "to do" | "to-do" => Some(TaskStatus::Todo),
            "in progress" | "in-progress" | "active" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
}

impl Priority {
    pub fn parse_priority(s: &str) -> Option<Priority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            _ => None,
        }
    }
}

/// A trackable unit of work that accumulates focus time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub name: String,
    pub project: String,
    pub status: TaskStatus,
    /// Accumulated focus time in hours
    #[serde(default)]
    pub focus_time: f64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Local>>,
}

impl Task {
    /// A fresh task; the store assigns the id on append.
    pub fn new(name: &str, project: &str, priority: Priority) -> Self {
        Task {
            id: 0,
            name: name.to_string(),
            project: project.to_string(),
            status: TaskStatus::Todo,
            focus_time: 0.0,
            priority,
            created_at: Some(Local::now()),
        }
    }

    /// Label for the action that would focus this task
    pub fn action_label(&self) -> &'static str {
        match self.status {
            TaskStatus::Done => "View",
            TaskStatus::InProgress => "Resume",
            TaskStatus::Todo => "Start",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: TaskStatus = serde_json::from_str("\"To Do\"").unwrap();
        assert_eq!(back, TaskStatus::Todo);
    }

    #[test]
    fn parse_status_accepts_cli_spellings() {
        assert_eq!(TaskStatus::parse_status("todo"), Some(TaskStatus::Todo));
        assert_eq!(
            TaskStatus::parse_status("In-Progress"),
            Some(TaskStatus::InProgress)
        );
        assert_eq!(TaskStatus::parse_status("Done"), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::parse_status("blocked"), None);
    }

    #[test]
    fn task_reads_original_layout() {
        let json = r#"{"id":1715000000000,"name":"Write report","project":"Work",
            "status":"In Progress","focusTime":1.5,"priority":"high",
            "createdAt":"2025-05-14T09:00:00+00:00"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, 1_715_000_000_000);
        assert_eq!(task.focus_time, 1.5);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.action_label(), "Resume");
    }

    #[test]
    fn missing_optional_fields_default() {
        let task: Task =
            serde_json::from_str(r#"{"id":1,"name":"a","project":"p","status":"To Do"}"#).unwrap();
        assert_eq!(task.focus_time, 0.0);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.created_at.is_none());
    }
}
