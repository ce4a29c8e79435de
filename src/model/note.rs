use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A free-text note. The notes collection is kept newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub text: String,
    pub timestamp: DateTime<Local>,
}
