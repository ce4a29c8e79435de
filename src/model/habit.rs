use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A daily habit with per-day completion marks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: u64,
    pub text: String,
    pub created: NaiveDate,
    /// Keyed by local calendar date (`YYYY-MM-DD`)
    #[serde(default)]
    pub completed: BTreeMap<String, bool>,
}

/// The key a local date is stored under in [`Habit::completed`]
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

impl Habit {
    pub fn new(text: &str, created: NaiveDate) -> Self {
        Habit {
            id: 0,
            text: text.to_string(),
            created,
            completed: BTreeMap::new(),
        }
    }

    pub fn is_done_on(&self, day: NaiveDate) -> bool {
        self.completed.get(&day_key(day)).copied().unwrap_or(false)
    }

    pub fn set_done_on(&mut self, day: NaiveDate, done: bool) {
        self.completed.insert(day_key(day), done);
    }
}
