//! Derived statistics over sessions, tasks, projects and habits.
//!
//! Everything here is a pure function of the record slices and an explicit
//! `today`. Nothing is cached; callers recompute from fresh reads.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use indexmap::IndexMap;
use serde::Serialize;

use crate::io::store::Store;
use crate::model::{Habit, Project, Session, Task, TaskStatus};

// ---------------------------------------------------------------------------
// Focus time
// ---------------------------------------------------------------------------

pub fn sessions_on(sessions: &[Session], day: NaiveDate) -> impl Iterator<Item = &Session> {
    sessions.iter().filter(move |s| s.day() == day)
}

pub fn focus_minutes_on(sessions: &[Session], day: NaiveDate) -> u32 {
    sessions_on(sessions, day).map(|s| s.duration).sum()
}

pub fn today_focus_minutes(sessions: &[Session], today: NaiveDate) -> u32 {
    focus_minutes_on(sessions, today)
}

/// Mean session length in whole minutes; 0 with no sessions.
pub fn average_session_minutes(sessions: &[Session]) -> u32 {
    if sessions.is_empty() {
        return 0;
    }
    let total: u64 = sessions.iter().map(|s| u64::from(s.duration)).sum();
    (total as f64 / sessions.len() as f64).round() as u32
}

/// The Sunday on or before `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_sunday()))
}

/// Minutes recorded from this week's Sunday through `today`.
pub fn week_focus_minutes(sessions: &[Session], today: NaiveDate) -> u32 {
    let start = week_start(today);
    sessions
        .iter()
        .filter(|s| (start..=today).contains(&s.day()))
        .map(|s| s.duration)
        .sum()
}

pub fn month_focus_minutes(sessions: &[Session], today: NaiveDate) -> u32 {
    sessions
        .iter()
        .filter(|s| {
            let day = s.day();
            day.year() == today.year() && day.month() == today.month()
        })
        .map(|s| s.duration)
        .sum()
}

/// Consecutive days with at least one session, counting back from today.
/// A day without sessions today means a streak of zero.
pub fn streak(sessions: &[Session], today: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = sessions.iter().map(Session::day).collect();
    let mut count = 0;
    let mut day = today;
    while days.contains(&day) {
        count += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    count
}

/// Most recent sessions first.
pub fn recent_sessions(sessions: &[Session], limit: usize) -> Vec<&Session> {
    let mut recent: Vec<&Session> = sessions.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    recent.truncate(limit);
    recent
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Hours of focus per project, summed from task focus time.
///
/// Explicit projects come first in stored order (at zero when they have no
/// tasks), followed by names that only appear on tasks.
pub fn project_time(projects: &[Project], tasks: &[Task]) -> IndexMap<String, f64> {
    let mut totals: IndexMap<String, f64> = projects
        .iter()
        .map(|p| (p.name.clone(), 0.0))
        .collect();
    for task in tasks {
        *totals.entry(task.project.clone()).or_insert(0.0) += task.focus_time;
    }
    totals
}

/// The project with the most hours. Ties go to the earlier entry; a map with
/// no recorded time has no top project.
pub fn top_project(totals: &IndexMap<String, f64>) -> Option<(&str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for (name, &hours) in totals {
        if hours > best.map_or(0.0, |(_, h)| h) {
            best = Some((name.as_str(), hours));
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

/// Hour of day (0-23) with the most sessions; ties go to the earliest hour.
pub fn best_focus_hour(sessions: &[Session]) -> Option<u32> {
    let mut counts = [0u32; 24];
    for s in sessions {
        counts[s.hour() as usize] += 1;
    }
    let max = *counts.iter().max()?;
    if max == 0 {
        return None;
    }
    counts.iter().position(|&c| c == max).map(|h| h as u32)
}

/// Weekday with the highest mean rating. Ties go to the earliest day of a
/// week that starts on Sunday.
pub fn most_focused_weekday(sessions: &[Session]) -> Option<Weekday> {
    let mut ratings: BTreeMap<u32, (u32, u32)> = BTreeMap::new();
    for s in sessions {
        let entry = ratings
            .entry(s.day().weekday().num_days_from_sunday())
            .or_insert((0, 0));
        entry.0 += u32::from(s.rating);
        entry.1 += 1;
    }
    let mut best: Option<(u32, f64)> = None;
    for (&index, &(sum, count)) in &ratings {
        let mean = f64::from(sum) / f64::from(count);
        if best.is_none_or(|(_, m)| mean > m) {
            best = Some((index, mean));
        }
    }
    best.map(|(index, _)| weekday_from_sunday(index))
}

fn weekday_from_sunday(index: u32) -> Weekday {
    match index {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayFocus {
    pub day: NaiveDate,
    pub hours: f64,
    pub sessions: u32,
}

/// The last seven days ending today, oldest first.
pub fn last_seven_days(today: NaiveDate) -> Vec<NaiveDate> {
    (0..7)
        .rev()
        .map(|back| today - Duration::days(back))
        .collect()
}

/// Focus hours per day over the last week, oldest first.
pub fn focus_by_day(sessions: &[Session], today: NaiveDate) -> Vec<DayFocus> {
    last_seven_days(today)
        .into_iter()
        .map(|day| DayFocus {
            day,
            hours: f64::from(focus_minutes_on(sessions, day)) / 60.0,
            sessions: sessions_on(sessions, day).count() as u32,
        })
        .collect()
}

/// Session counts per day over the last week, oldest first.
pub fn session_trend(sessions: &[Session], today: NaiveDate) -> Vec<(NaiveDate, u32)> {
    last_seven_days(today)
        .into_iter()
        .map(|day| (day, sessions_on(sessions, day).count() as u32))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DurationBucket {
    pub label: &'static str,
    pub count: u32,
}

const DURATION_BUCKETS: [(&str, u32); 4] = [("0-15m", 15), ("16-30m", 30), ("31-45m", 45), ("46-60m", 60)];

/// Session counts by length: up to 15, 30, 45, 60 minutes, then longer.
pub fn duration_distribution(sessions: &[Session]) -> Vec<DurationBucket> {
    let mut buckets: Vec<DurationBucket> = DURATION_BUCKETS
        .iter()
        .map(|&(label, _)| DurationBucket { label, count: 0 })
        .collect();
    buckets.push(DurationBucket {
        label: "60m+",
        count: 0,
    });
    for s in sessions {
        let index = DURATION_BUCKETS
            .iter()
            .position(|&(_, max)| s.duration <= max)
            .unwrap_or(DURATION_BUCKETS.len());
        buckets[index].count += 1;
    }
    buckets
}

// ---------------------------------------------------------------------------
// Habits & score
// ---------------------------------------------------------------------------

pub fn habits_done_on(habits: &[Habit], day: NaiveDate) -> usize {
    habits.iter().filter(|h| h.is_done_on(day)).count()
}

/// Percent of habits checked off today, rounded; 0 with no habits.
pub fn habit_completion_percent(habits: &[Habit], today: NaiveDate) -> u32 {
    if habits.is_empty() {
        return 0;
    }
    let done = habits_done_on(habits, today) as f64;
    (done / habits.len() as f64 * 100.0).round() as u32
}

/// Habit completion plus up to 30 points for more than an hour of focus
/// today, capped at 100.
pub fn productivity_score(habits: &[Habit], sessions: &[Session], today: NaiveDate) -> u32 {
    let mut score = habit_completion_percent(habits, today);
    let hours = f64::from(today_focus_minutes(sessions, today)) / 60.0;
    if hours > 1.0 {
        score += ((hours * 10.0).round() as u32).min(30);
    }
    score.min(100)
}

// ---------------------------------------------------------------------------
// Dashboard snapshot
// ---------------------------------------------------------------------------

/// Every derived figure the dashboard and `flow stats` show.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub today: NaiveDate,
    pub today_minutes: u32,
    pub today_sessions: u32,
    pub week_minutes: u32,
    pub month_minutes: u32,
    pub average_session_minutes: u32,
    pub total_sessions: u32,
    pub streak: u32,
    pub best_hour: Option<u32>,
    pub best_weekday: Option<Weekday>,
    pub project_time: IndexMap<String, f64>,
    pub top_project: Option<String>,
    pub focus_by_day: Vec<DayFocus>,
    pub durations: Vec<DurationBucket>,
    pub tasks_done: u32,
    pub tasks_total: u32,
    pub habits_done: u32,
    pub habits_total: u32,
    pub productivity_score: u32,
}

impl Dashboard {
    pub fn compute(
        sessions: &[Session],
        tasks: &[Task],
        projects: &[Project],
        habits: &[Habit],
        today: NaiveDate,
    ) -> Self {
        let project_time = project_time(projects, tasks);
        let top_project = top_project(&project_time).map(|(name, _)| name.to_string());
        Dashboard {
            today,
            today_minutes: today_focus_minutes(sessions, today),
            today_sessions: sessions_on(sessions, today).count() as u32,
            week_minutes: week_focus_minutes(sessions, today),
            month_minutes: month_focus_minutes(sessions, today),
            average_session_minutes: average_session_minutes(sessions),
            total_sessions: sessions.len() as u32,
            streak: streak(sessions, today),
            best_hour: best_focus_hour(sessions),
            best_weekday: most_focused_weekday(sessions),
            project_time,
            top_project,
            focus_by_day: focus_by_day(sessions, today),
            durations: duration_distribution(sessions),
            tasks_done: tasks.iter().filter(|t| t.status == TaskStatus::Done).count() as u32,
            tasks_total: tasks.len() as u32,
            habits_done: habits_done_on(habits, today) as u32,
            habits_total: habits.len() as u32,
            productivity_score: productivity_score(habits, sessions, today),
        }
    }

    /// Compute from a fresh read of the store.
    pub fn load(store: &Store, today: NaiveDate) -> Self {
        Dashboard::compute(
            &store.all::<Session>(),
            &store.all::<Task>(),
            &store.all::<Project>(),
            &store.all::<Habit>(),
            today,
        )
    }
}
