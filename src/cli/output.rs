use chrono::{DateTime, Local, Weekday};
use serde::Serialize;

use crate::model::{Habit, Session, Task, TaskStatus, rating_label};
use crate::ops::stats::{Dashboard, weekday_name};
use crate::ops::timer::{TimerMode, TimerSnapshot, TimerStatus};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectJson {
    pub id: u64,
    pub name: String,
    pub color: String,
    pub hours: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitJson {
    pub id: u64,
    pub text: String,
    pub done_today: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsJson {
    pub best_hour: Option<u32>,
    pub best_weekday: Option<Weekday>,
    pub month_minutes: u32,
    pub average_session_minutes: u32,
    pub top_project: Option<String>,
    pub total_sessions: u32,
}

impl InsightsJson {
    pub fn from_dashboard(dash: &Dashboard) -> Self {
        InsightsJson {
            best_hour: dash.best_hour,
            best_weekday: dash.best_weekday,
            month_minutes: dash.month_minutes,
            average_session_minutes: dash.average_session_minutes,
            top_project: dash.top_project.clone(),
            total_sessions: dash.total_sessions,
        }
    }
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

/// Clock face for a timer: `MM:SS`, with minutes running past 59.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `25m` under an hour, `1h 05m` otherwise.
pub fn format_minutes(minutes: u32) -> String {
    if minutes < 60 {
        format!("{}m", minutes)
    } else {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    }
}

/// Fractional hours shown as hours and minutes.
pub fn format_hours(hours: f64) -> String {
    format_minutes((hours.max(0.0) * 60.0).round() as u32)
}

/// `9:00-10:00` for hour 9.
pub fn format_hour_range(hour: u32) -> String {
    format!("{}:00-{}:00", hour, (hour + 1) % 24)
}

pub fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

fn status_char(status: TaskStatus) -> char {
    match status {
        TaskStatus::Todo => ' ',
        TaskStatus::InProgress => '>',
        TaskStatus::Done => 'x',
    }
}

/// One-line task summary: `[>] Name  (Project)  1h 30m  !`
pub fn format_task_line(task: &Task) -> String {
    let priority = if task.priority == crate::model::Priority::High {
        "  !"
    } else {
        ""
    };
    format!(
        "[{}] {}  ({})  {}{}  #{}",
        status_char(task.status),
        task.name,
        task.project,
        format_hours(task.focus_time),
        priority,
        task.id
    )
}

pub fn format_session_line(session: &Session) -> String {
    let mut line = format!(
        "{}  {:>6}  {}  {} ({})",
        session.date.format("%Y-%m-%d %H:%M"),
        format_minutes(session.duration),
        stars(session.rating),
        session.task_name,
        session.project
    );
    if !session.tags.is_empty() {
        let tags: Vec<String> = session.tags.iter().map(|t| format!("#{}", t)).collect();
        line.push_str(&format!("  {}", tags.join(" ")));
    }
    if session.distractions > 0 {
        line.push_str(&format!("  ({} distraction{})", session.distractions, plural(session.distractions)));
    }
    line
}

pub fn format_habit_line(habit: &Habit, done_today: bool) -> String {
    let mark = if done_today { 'x' } else { ' ' };
    format!("[{}] {}  #{}", mark, habit.text, habit.id)
}

pub fn plural(n: u32) -> &'static str {
    if n == 1 { "" } else { "s" }
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

pub fn format_timer(snap: &TimerSnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    let clock = match snap.mode {
        TimerMode::Countdown => format_clock(snap.remaining_secs.unwrap_or(0)),
        TimerMode::Elapsed => format_clock(snap.elapsed_secs),
    };
    lines.push(format!("{}  {} ({})", clock, snap.status, snap.mode));
    if let Some(task) = &snap.task {
        lines.push(format!("task: {} ({})", task.name, task.project));
    }
    if snap.status != TimerStatus::Idle {
        lines.push(format!(
            "elapsed: {}  distractions: {}",
            format_clock(snap.elapsed_secs),
            snap.distractions
        ));
    }
    if let Some(end) = snap.ends_at {
        lines.push(format!("ends at: {}", end.format("%H:%M")));
    }
    if snap.status == TimerStatus::Completed {
        lines.push("rate it: flow complete --rating <1-5>".to_string());
    }
    lines
}

pub fn format_saved_session(session: &Session) -> String {
    format!(
        "saved {} on {} ({}, {})",
        format_minutes(session.duration),
        session.task_name,
        stars(session.rating),
        rating_label(session.rating)
    )
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

pub fn format_stats(dash: &Dashboard) -> Vec<String> {
    let mut lines = vec![
        format!(
            "today:    {}  ({} session{})",
            format_minutes(dash.today_minutes),
            dash.today_sessions,
            plural(dash.today_sessions)
        ),
        format!("week:     {}", format_minutes(dash.week_minutes)),
        format!("streak:   {} day{}", dash.streak, plural(dash.streak)),
        format!("tasks:    {}/{} done", dash.tasks_done, dash.tasks_total),
        format!(
            "habits:   {}/{} today  score {}%",
            dash.habits_done, dash.habits_total, dash.productivity_score
        ),
    ];

    if !dash.project_time.is_empty() {
        lines.push(String::new());
        lines.push("projects:".to_string());
        let width = dash
            .project_time
            .keys()
            .map(|name| crate::util::unicode::display_width(name))
            .max()
            .unwrap_or(0);
        for (name, hours) in &dash.project_time {
            let pad = width - crate::util::unicode::display_width(name);
            lines.push(format!("  {}{}  {}", name, " ".repeat(pad), format_hours(*hours)));
        }
    }

    lines.push(String::new());
    lines.push("last 7 days:".to_string());
    for day in &dash.focus_by_day {
        lines.push(format!(
            "  {}  {:>6}  {}",
            day.day.format("%a %m-%d"),
            format_hours(day.hours),
            "█".repeat((day.hours * 2.0).round() as usize)
        ));
    }
    lines
}

pub fn format_insights(dash: &Dashboard) -> Vec<String> {
    let best_hour = dash
        .best_hour
        .map(format_hour_range)
        .unwrap_or_else(|| "-".to_string());
    let best_day = dash.best_weekday.map(weekday_name).unwrap_or("-");
    let top = dash.top_project.as_deref().unwrap_or("-");
    let mut lines = vec![
        format!("best focus hour:     {}", best_hour),
        format!("most focused day:    {}", best_day),
        format!("this month:          {}", format_minutes(dash.month_minutes)),
        format!("average session:     {}", format_minutes(dash.average_session_minutes)),
        format!("most time spent on:  {}", top),
        String::new(),
        "session lengths:".to_string(),
    ];
    for bucket in &dash.durations {
        lines.push(format!("  {:>7}  {}", bucket.label, bucket.count));
    }
    lines
}

pub fn format_timestamp(ts: DateTime<Local>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::timer::TaskRef;
    use chrono::TimeZone;
    use insta::assert_snapshot;

    fn sample_session() -> Session {
        Session {
            id: 1,
            task_id: Some(2),
            task_name: "Draft".into(),
            project: "Book".into(),
            duration: 95,
            rating: 4,
            tags: ["deep".to_string(), "music".to_string()].into_iter().collect(),
            distractions: 1,
            notes: String::new(),
            date: Local.with_ymd_and_hms(2025, 5, 14, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn clock_and_durations() {
        assert_snapshot!(format_clock(0), @"00:00");
        assert_snapshot!(format_clock(25 * 60 - 1), @"24:59");
        assert_snapshot!(format_clock(125 * 60 + 5), @"125:05");
        assert_snapshot!(format_minutes(45), @"45m");
        assert_snapshot!(format_minutes(65), @"1h 05m");
        assert_snapshot!(format_hours(3.75), @"3h 45m");
        assert_snapshot!(format_hour_range(23), @"23:00-0:00");
        assert_snapshot!(stars(3), @"★★★☆☆");
    }

    #[test]
    fn session_line() {
        assert_snapshot!(
            format_session_line(&sample_session()),
            @"2025-05-14 09:30  1h 35m  ★★★★☆  Draft (Book)  #deep #music  (1 distraction)"
        );
    }

    #[test]
    fn task_line_marks_status_and_priority() {
        let mut task = Task::new("Fix login", "Web", crate::model::Priority::High);
        task.id = 7;
        task.status = TaskStatus::InProgress;
        task.focus_time = 0.5;
        assert_snapshot!(format_task_line(&task), @"[>] Fix login  (Web)  30m  !  #7");
    }

    #[test]
    fn timer_lines() {
        let snap = TimerSnapshot {
            status: TimerStatus::Paused,
            mode: TimerMode::Countdown,
            task: Some(TaskRef {
                id: 1,
                name: "Draft".into(),
                project: "Book".into(),
            }),
            planned_secs: 1500,
            elapsed_secs: 300,
            remaining_secs: Some(1200),
            progress: 0.2,
            distractions: 2,
            ends_at: None,
        };
        assert_snapshot!(format_timer(&snap).join("\n"), @r"
        20:00  paused (countdown)
        task: Draft (Book)
        elapsed: 05:00  distractions: 2
        ");
    }
}
