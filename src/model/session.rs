use std::collections::BTreeSet;

use chrono::{DateTime, Local, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

/// One completed focus interval, recorded when the timer is saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: u64,
    /// The task this session was for. Older records carry only the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<u64>,
    pub task_name: String,
    pub project: String,
    /// Whole minutes
    pub duration: u32,
    /// 1 to 5
    pub rating: u8,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub distractions: u32,
    #[serde(default)]
    pub notes: String,
    pub date: DateTime<Local>,
}

impl Session {
    /// Local calendar day the session was recorded on
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    /// Local hour of day (0-23)
    pub fn hour(&self) -> u32 {
        self.date.hour()
    }
}

/// Text shown for a 1-5 rating
pub fn rating_label(rating: u8) -> &'static str {
    match rating {
        1 => "Poor",
        2 => "Fair",
        3 => "Good",
        4 => "Very Good",
        5 => "Excellent",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn session_round_trips_camel_case() {
        let date = Local.with_ymd_and_hms(2025, 5, 14, 9, 30, 0).unwrap();
        let session = Session {
            id: 7,
            task_id: Some(3),
            task_name: "Draft".into(),
            project: "Writing".into(),
            duration: 25,
            rating: 4,
            tags: ["phone".to_string()].into_iter().collect(),
            distractions: 2,
            notes: "ok".into(),
            date,
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"taskName\":\"Draft\""));
        assert!(json.contains("\"taskId\":3"));
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
        assert_eq!(back.hour(), 9);
        assert_eq!(back.day(), NaiveDate::from_ymd_opt(2025, 5, 14).unwrap());
    }

    #[test]
    fn tags_accept_array_and_deduplicate() {
        let json = r#"{"id":1,"taskName":"t","project":"p","duration":10,"rating":3,
            "tags":["noise","noise","phone"],"date":"2025-05-14T10:00:00+00:00"}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.tags.len(), 2);
        assert_eq!(session.distractions, 0);
        assert!(session.task_id.is_none());
    }

    #[test]
    fn rating_labels() {
        assert_eq!(rating_label(1), "Poor");
        assert_eq!(rating_label(5), "Excellent");
        assert_eq!(rating_label(0), "");
    }
}
