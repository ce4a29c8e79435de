//! Focus session timer.
//!
//! `SessionTimer` is a plain value: the CLI loads it from the store, applies
//! one transition and saves it back; the dashboard owns one and ticks it once
//! a second. Every operation takes the current time explicitly.
//!
//! ```text
//! Idle --start--> Running --pause--> Paused --start--> Running
//! Running|Paused --stop--> Completed      Running --countdown hits 0--> Completed
//! Completed --complete(rating)--> Idle    any --reset--> Idle
//! ```

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use crate::io::store::{KEY_SESSIONS, Store, StoreError};
use crate::model::config::TimerConfig;
use crate::model::{Session, Task, TaskStatus};

/// Shortest and longest countdown a user may configure, in minutes.
pub const MIN_MINUTES: u32 = 1;
pub const MAX_MINUTES: u32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Counts down from the planned length
    #[default]
    Countdown,
    /// Counts up with no fixed end
    Elapsed,
}

impl TimerMode {
    pub fn parse_mode(s: &str) -> Option<TimerMode> {
        match s.trim().to_ascii_lowercase().as_str() {
            "countdown" => Some(TimerMode::Countdown),
            "elapsed" | "flow" | "flowtime" => Some(TimerMode::Elapsed),
            _ => None,
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerMode::Countdown => write!(f, "countdown"),
            TimerMode::Elapsed => write!(f, "elapsed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerStatus::Idle => write!(f, "idle"),
            TimerStatus::Running => write!(f, "running"),
            TimerStatus::Paused => write!(f, "paused"),
            TimerStatus::Completed => write!(f, "completed"),
        }
    }
}

/// The task a session is being timed for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    pub id: u64,
    pub name: String,
    pub project: String,
}

impl From<&Task> for TaskRef {
    fn from(task: &Task) -> Self {
        TaskRef {
            id: task.id,
            name: task.name.clone(),
            project: task.project.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    #[error("select a task first")]
    NoTaskSelected,
    #[error("cannot {action} while the timer is {status}")]
    InvalidTransition {
        action: &'static str,
        status: TimerStatus,
    },
    #[error("timer length must be between {MIN_MINUTES} and {MAX_MINUTES} minutes (got {0})")]
    MinutesOutOfRange(u32),
    #[error("rate the session (1-5) before saving it")]
    RatingRequired,
    #[error("rating must be between 1 and 5 (got {0})")]
    InvalidRating(u8),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the user says about a finished session
#[derive(Debug, Clone, Default)]
pub struct SessionReview {
    pub rating: Option<u8>,
    pub tags: BTreeSet<String>,
    /// Overrides the tally kept while the timer ran
    pub distractions: Option<u32>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTimer {
    status: TimerStatus,
    mode: TimerMode,
    planned_secs: u64,
    /// Elapsed-mode progress fills over this many seconds (display only)
    horizon_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    task: Option<TaskRef>,
    /// Active seconds from running windows that have ended
    #[serde(default)]
    accumulated_secs: u64,
    /// Start of the current running window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anchor: Option<DateTime<Local>>,
    #[serde(default)]
    distractions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Local>>,
}

impl Default for SessionTimer {
    fn default() -> Self {
        SessionTimer::from_config(&TimerConfig::default())
    }
}

/// Read-only view for rendering and `--json` output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub mode: TimerMode,
    pub task: Option<TaskRef>,
    pub planned_secs: u64,
    pub elapsed_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<u64>,
    pub progress: f64,
    pub distractions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Local>>,
}

impl SessionTimer {
    pub fn from_config(config: &TimerConfig) -> Self {
        let minutes = config.default_minutes.clamp(MIN_MINUTES, MAX_MINUTES);
        SessionTimer {
            status: TimerStatus::Idle,
            mode: config.mode,
            planned_secs: u64::from(minutes) * 60,
            horizon_secs: u64::from(config.flow_horizon_minutes.max(1)) * 60,
            task: None,
            accumulated_secs: 0,
            anchor: None,
            distractions: 0,
            started_at: None,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn task(&self) -> Option<&TaskRef> {
        self.task.as_ref()
    }

    pub fn planned_secs(&self) -> u64 {
        self.planned_secs
    }

    pub fn distractions(&self) -> u32 {
        self.distractions
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    /// Total active seconds, including the current running window.
    pub fn elapsed_secs(&self, now: DateTime<Local>) -> u64 {
        let mut elapsed = self.accumulated_secs;
        if let (TimerStatus::Running, Some(anchor)) = (self.status, self.anchor) {
            let window = (now - anchor).num_seconds().max(0);
            elapsed = elapsed.saturating_add(u64::try_from(window).unwrap_or(0));
        }
        match self.mode {
            TimerMode::Countdown => elapsed.min(self.planned_secs),
            TimerMode::Elapsed => elapsed,
        }
    }

    /// Seconds left on a countdown; `None` in elapsed mode.
    pub fn remaining_secs(&self, now: DateTime<Local>) -> Option<u64> {
        match self.mode {
            TimerMode::Countdown => Some(self.planned_secs.saturating_sub(self.elapsed_secs(now))),
            TimerMode::Elapsed => None,
        }
    }

    /// The number a clock face shows: time left for a countdown, time spent otherwise.
    pub fn display_secs(&self, now: DateTime<Local>) -> u64 {
        self.remaining_secs(now)
            .unwrap_or_else(|| self.elapsed_secs(now))
    }

    /// Fraction of the planned length (or visual horizon) covered, 0.0..=1.0.
    pub fn progress(&self, now: DateTime<Local>) -> f64 {
        let total = match self.mode {
            TimerMode::Countdown => self.planned_secs,
            TimerMode::Elapsed => self.horizon_secs,
        };
        if total == 0 {
            return 1.0;
        }
        (self.elapsed_secs(now) as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// When the session is expected to end. Elapsed mode has no fixed end,
    /// so the horizon is used as an estimate.
    pub fn ends_at(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        if self.status != TimerStatus::Running {
            return None;
        }
        let left = match self.mode {
            TimerMode::Countdown => self.remaining_secs(now).unwrap_or(0),
            TimerMode::Elapsed => self.horizon_secs,
        };
        Some(now + Duration::seconds(i64::try_from(left).unwrap_or(i64::MAX / 2)))
    }

    /// Suggested break after a running countdown: 15 minutes when more than
    /// half an hour remains, otherwise 5. Returns the length and start time.
    pub fn suggested_break(&self, now: DateTime<Local>) -> Option<(u32, DateTime<Local>)> {
        if self.status != TimerStatus::Running || self.mode != TimerMode::Countdown {
            return None;
        }
        let remaining = self.remaining_secs(now)?;
        let minutes = if remaining > 1800 { 15 } else { 5 };
        let end = self.ends_at(now)?;
        Some((minutes, end + Duration::minutes(i64::from(minutes))))
    }

    pub fn snapshot(&self, now: DateTime<Local>) -> TimerSnapshot {
        TimerSnapshot {
            status: self.status,
            mode: self.mode,
            task: self.task.clone(),
            planned_secs: self.planned_secs,
            elapsed_secs: self.elapsed_secs(now),
            remaining_secs: self.remaining_secs(now),
            progress: self.progress(now),
            distractions: self.distractions,
            ends_at: self.ends_at(now),
        }
    }

    // -----------------------------------------------------------------------
    // Setup (idle only)
    // -----------------------------------------------------------------------

    fn require_idle(&self, action: &'static str) -> Result<(), TimerError> {
        if self.status == TimerStatus::Idle {
            Ok(())
        } else {
            Err(TimerError::InvalidTransition {
                action,
                status: self.status,
            })
        }
    }

    pub fn select_task(&mut self, task: TaskRef) -> Result<(), TimerError> {
        self.require_idle("change task")?;
        self.task = Some(task);
        Ok(())
    }

    pub fn set_mode(&mut self, mode: TimerMode) -> Result<(), TimerError> {
        self.require_idle("change mode")?;
        self.mode = mode;
        Ok(())
    }

    /// Set a custom countdown length.
    pub fn set_planned_minutes(&mut self, minutes: u32) -> Result<(), TimerError> {
        if !(MIN_MINUTES..=MAX_MINUTES).contains(&minutes) {
            return Err(TimerError::MinutesOutOfRange(minutes));
        }
        self.require_idle("change length")?;
        self.planned_secs = u64::from(minutes) * 60;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Start a new session, or resume a paused one. `task` selects the task
    /// when starting from idle; a paused session keeps its task.
    pub fn start(&mut self, task: Option<TaskRef>, now: DateTime<Local>) -> Result<(), TimerError> {
        match self.status {
            TimerStatus::Idle => {
                if let Some(task) = task {
                    self.task = Some(task);
                }
                if self.task.is_none() {
                    return Err(TimerError::NoTaskSelected);
                }
                self.accumulated_secs = 0;
                self.started_at = Some(now);
            }
            TimerStatus::Paused => {}
            TimerStatus::Running | TimerStatus::Completed => {
                return Err(TimerError::InvalidTransition {
                    action: "start",
                    status: self.status,
                });
            }
        }
        self.anchor = Some(now);
        self.status = TimerStatus::Running;
        log::debug!("timer running ({}, {}s planned)", self.mode, self.planned_secs);
        Ok(())
    }

    /// Advance a running timer. A countdown that reaches zero completes in
    /// the same call. Returns the status after the tick.
    pub fn tick(&mut self, now: DateTime<Local>) -> TimerStatus {
        if self.status == TimerStatus::Running
            && self.mode == TimerMode::Countdown
            && self.elapsed_secs(now) >= self.planned_secs
        {
            self.accumulated_secs = self.planned_secs;
            self.anchor = None;
            self.status = TimerStatus::Completed;
            log::info!("countdown finished");
        }
        self.status
    }

    pub fn pause(&mut self, now: DateTime<Local>) -> Result<(), TimerError> {
        if self.tick(now) != TimerStatus::Running {
            return Err(TimerError::InvalidTransition {
                action: "pause",
                status: self.status,
            });
        }
        self.accumulated_secs = self.elapsed_secs(now);
        self.anchor = None;
        self.status = TimerStatus::Paused;
        Ok(())
    }

    /// End the session early. The elapsed time so far is what gets recorded.
    pub fn stop(&mut self, now: DateTime<Local>) -> Result<(), TimerError> {
        match self.tick(now) {
            TimerStatus::Running | TimerStatus::Paused => {
                self.accumulated_secs = self.elapsed_secs(now);
                self.anchor = None;
                self.status = TimerStatus::Completed;
                Ok(())
            }
            status @ (TimerStatus::Idle | TimerStatus::Completed) => {
                Err(TimerError::InvalidTransition {
                    action: "stop",
                    status,
                })
            }
        }
    }

    pub fn note_distraction(&mut self) {
        self.distractions = self.distractions.saturating_add(1);
    }

    pub fn retract_distraction(&mut self) {
        self.distractions = self.distractions.saturating_sub(1);
    }

    /// Save a completed session and return to idle.
    ///
    /// Writes the session, then credits the task with the elapsed time and
    /// marks it In Progress. The two writes are independent: if the task
    /// update fails the session stays recorded and the error is logged.
    pub fn complete(
        &mut self,
        store: &Store,
        review: SessionReview,
        now: DateTime<Local>,
    ) -> Result<Session, TimerError> {
        if self.status != TimerStatus::Completed {
            return Err(TimerError::InvalidTransition {
                action: "save",
                status: self.status,
            });
        }
        let rating = review.rating.ok_or(TimerError::RatingRequired)?;
        if !(1..=5).contains(&rating) {
            return Err(TimerError::InvalidRating(rating));
        }
        let task = self.task.clone().ok_or(TimerError::NoTaskSelected)?;

        let elapsed = self.accumulated_secs;
        let project = store
            .all::<Task>()
            .into_iter()
            .find(|t| t.id == task.id)
            .map_or(task.project.clone(), |t| t.project);

        let session = Session {
            id: 0,
            task_id: Some(task.id),
            task_name: task.name.clone(),
            project,
            duration: u32::try_from((elapsed + 30) / 60).unwrap_or(u32::MAX),
            rating,
            tags: review.tags,
            distractions: review.distractions.unwrap_or(self.distractions),
            notes: review.notes,
            date: now,
        };
        let session = store.append(KEY_SESSIONS, session)?;
        self.reset();

        let added_hours = elapsed as f64 / 3600.0;
        let credited = store.modify(|tasks: &mut Vec<Task>| {
            tasks.iter_mut().find(|t| t.id == task.id).map(|t| {
                t.focus_time += added_hours;
                t.status = TaskStatus::InProgress;
            })
        });
        match credited {
            Ok(Some(())) => {}
            Ok(None) => log::warn!("session saved for missing task {}", task.id),
            Err(e) => log::error!("session saved but task {} was not updated: {}", task.id, e),
        }

        Ok(session)
    }

    /// Return to idle, clearing the task and every per-session counter. Mode
    /// and planned length are kept.
    pub fn reset(&mut self) {
        *self = SessionTimer {
            status: TimerStatus::Idle,
            mode: self.mode,
            planned_secs: self.planned_secs,
            horizon_secs: self.horizon_secs,
            task: None,
            accumulated_secs: 0,
            anchor: None,
            distractions: 0,
            started_at: None,
        };
    }
}
