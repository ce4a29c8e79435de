use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, NaiveDate};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::config_io;
use crate::io::store::{KEY_TIMER, Store};
use crate::io::watcher::StoreWatcher;
use crate::model::{AppConfig, Habit, Project, Session, Task, TaskStatus};
use crate::ops::stats::Dashboard;
use crate::ops::timer::{
    MAX_MINUTES, MIN_MINUTES, SessionReview, SessionTimer, TaskRef, TimerMode, TimerStatus,
};
use crate::ops::{habit_ops, profile_ops, task_ops};

use super::input;
use super::render;
use super::theme::Theme;

const TICK: Duration = Duration::from_secs(1);

/// Which list panel has the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Tasks,
    Habits,
    Sessions,
}

impl Panel {
    pub fn as_str(self) -> &'static str {
        match self {
            Panel::Tasks => "tasks",
            Panel::Habits => "habits",
            Panel::Sessions => "sessions",
        }
    }

    fn parse(s: &str) -> Option<Panel> {
        match s {
            "tasks" => Some(Panel::Tasks),
            "habits" => Some(Panel::Habits),
            "sessions" => Some(Panel::Sessions),
            _ => None,
        }
    }

    pub fn next(self) -> Panel {
        match self {
            Panel::Tasks => Panel::Habits,
            Panel::Habits => Panel::Sessions,
            Panel::Sessions => Panel::Tasks,
        }
    }
}

/// One-line feedback shown in the status row until the next key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Main application state
pub struct App {
    pub store: Store,
    pub config: AppConfig,
    pub theme: Theme,
    pub timer: SessionTimer,
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub habits: Vec<Habit>,
    pub sessions: Vec<Session>,
    pub dashboard: Dashboard,
    /// Clock reading used by the last render and the next action
    pub now: DateTime<Local>,
    pub panel: Panel,
    /// Cursor into `visible_tasks()`
    pub task_cursor: usize,
    pub habit_cursor: usize,
    pub session_scroll: usize,
    /// Show Done tasks in the task panel
    pub show_done: bool,
    pub show_help: bool,
    pub message: Option<StatusMessage>,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: Store, config: AppConfig, now: DateTime<Local>) -> Self {
        let timer = store
            .get_one::<SessionTimer>(KEY_TIMER)
            .unwrap_or_else(|| SessionTimer::from_config(&config.timer));
        let theme = Theme::from_config(profile_ops::load_theme(&store), &config.ui);
        let today = now.date_naive();

        let mut app = App {
            store,
            config,
            theme,
            timer,
            tasks: Vec::new(),
            projects: Vec::new(),
            habits: Vec::new(),
            sessions: Vec::new(),
            dashboard: Dashboard::compute(&[], &[], &[], &[], today),
            now,
            panel: Panel::Tasks,
            task_cursor: 0,
            habit_cursor: 0,
            session_scroll: 0,
            show_done: false,
            show_help: false,
            message: None,
            should_quit: false,
        };
        app.reload_records();
        app.tick(now);
        app
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    // -----------------------------------------------------------------------
    // Data
    // -----------------------------------------------------------------------

    /// Re-read every collection and recompute the dashboard. The task cursor
    /// follows the selected task by id when it is still visible.
    pub fn reload_records(&mut self) {
        let selected = self.selected_task().map(|t| t.id);

        self.tasks = self.store.all::<Task>();
        self.projects = crate::ops::project_ops::list_projects(&self.store);
        self.habits = self.store.all::<Habit>();
        self.sessions = self.store.all::<Session>();
        self.recompute();

        if let Some(id) = selected {
            self.select_task_id(id);
        }
        self.clamp_cursors();
    }

    fn recompute(&mut self) {
        self.dashboard = Dashboard::compute(
            &self.sessions,
            &self.tasks,
            &self.projects,
            &self.habits,
            self.today(),
        );
    }

    /// Pick up writes from another process: records, the persisted timer,
    /// the theme and the config.
    pub fn reload_all(&mut self) {
        self.config = config_io::load_config_or_default(self.store.dir());
        self.theme = Theme::from_config(profile_ops::load_theme(&self.store), &self.config.ui);
        if let Some(timer) = self.store.get_one::<SessionTimer>(KEY_TIMER)
            && timer != self.timer
        {
            log::info!("timer changed on disk ({})", timer.status());
            self.timer = timer;
        }
        self.reload_records();
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| self.show_done || t.status != TaskStatus::Done)
            .collect()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.task_cursor).copied()
    }

    pub fn select_task_id(&mut self, id: u64) {
        if let Some(idx) = self.visible_tasks().iter().position(|t| t.id == id) {
            self.task_cursor = idx;
        }
    }

    pub fn clamp_cursors(&mut self) {
        let tasks = self.visible_tasks().len();
        self.task_cursor = self.task_cursor.min(tasks.saturating_sub(1));
        self.habit_cursor = self.habit_cursor.min(self.habits.len().saturating_sub(1));
        self.session_scroll = self.session_scroll.min(self.sessions.len().saturating_sub(1));
    }

    // -----------------------------------------------------------------------
    // Feedback
    // -----------------------------------------------------------------------

    pub fn info(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn error(&mut self, err: impl std::fmt::Display) {
        let text = err.to_string();
        log::warn!("{}", text);
        self.message = Some(StatusMessage {
            text,
            is_error: true,
        });
    }

    // -----------------------------------------------------------------------
    // Timer
    // -----------------------------------------------------------------------

    /// Advance the clock. Saves the timer when a countdown finishes and
    /// recomputes the dashboard when the date rolls over.
    pub fn tick(&mut self, now: DateTime<Local>) {
        let rolled_over = now.date_naive() != self.today();
        self.now = now;
        let before = self.timer.status();
        if self.timer.tick(now) != before {
            self.info("time's up: rate the session 1-5");
            self.save_timer();
        }
        if rolled_over {
            self.recompute();
        }
    }

    fn save_timer(&mut self) {
        if let Err(e) = self.store.put_one(KEY_TIMER, &self.timer) {
            log::error!("could not save timer: {}", e);
            self.error(e);
        }
    }

    /// Run a timer transition, report failures, and persist the result.
    fn timer_action<F>(&mut self, f: F)
    where
        F: FnOnce(&mut SessionTimer, DateTime<Local>) -> Result<(), crate::ops::timer::TimerError>,
    {
        let now = self.now;
        match f(&mut self.timer, now) {
            Ok(()) => self.save_timer(),
            Err(e) => self.error(e),
        }
    }

    /// Start a focus session on the selected task, or resume a paused one.
    pub fn start_or_resume(&mut self) {
        let task = match self.timer.status() {
            TimerStatus::Idle => self.selected_task().map(TaskRef::from),
            _ => None,
        };
        self.timer_action(|timer, now| timer.start(task, now));
    }

    pub fn pause(&mut self) {
        self.timer_action(|timer, now| timer.pause(now));
    }

    pub fn stop(&mut self) {
        self.timer_action(|timer, now| timer.stop(now));
        if self.timer.status() == TimerStatus::Completed {
            self.info("stopped: rate the session 1-5");
        }
    }

    /// Save the completed session with `rating`.
    pub fn complete(&mut self, rating: u8) {
        let review = SessionReview {
            rating: Some(rating),
            ..SessionReview::default()
        };
        match self.timer.complete(&self.store, review, self.now) {
            Ok(session) => {
                self.save_timer();
                self.info(format!(
                    "saved {} on {}",
                    crate::cli::output::format_minutes(session.duration),
                    session.task_name
                ));
                self.reload_records();
            }
            Err(e) => self.error(e),
        }
    }

    /// Discard the current session.
    pub fn reset_timer(&mut self) {
        if self.timer.status() == TimerStatus::Idle {
            return;
        }
        self.timer.reset();
        self.save_timer();
        self.info("session discarded");
    }

    pub fn note_distraction(&mut self, undo: bool) {
        if self.timer.status() == TimerStatus::Idle {
            return;
        }
        if undo {
            self.timer.retract_distraction();
        } else {
            self.timer.note_distraction();
        }
        self.save_timer();
    }

    pub fn toggle_mode(&mut self) {
        let mode = match self.timer.mode() {
            TimerMode::Countdown => TimerMode::Elapsed,
            TimerMode::Elapsed => TimerMode::Countdown,
        };
        self.timer_action(|timer, _| timer.set_mode(mode));
    }

    /// Nudge the countdown length by `delta` minutes, clamped to the allowed range.
    pub fn adjust_minutes(&mut self, delta: i64) {
        let current = (self.timer.planned_secs() / 60) as i64;
        let minutes = (current + delta).clamp(i64::from(MIN_MINUTES), i64::from(MAX_MINUTES));
        self.timer_action(|timer, _| timer.set_planned_minutes(minutes as u32));
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    /// Flip the habit under the cursor for today.
    pub fn toggle_habit(&mut self) {
        let Some(id) = self.habits.get(self.habit_cursor).map(|h| h.id) else {
            return;
        };
        match habit_ops::toggle_habit(&self.store, id, self.today()) {
            Ok(_) => self.reload_records(),
            Err(e) => self.error(e),
        }
    }

    /// Mark the selected task done, or reopen it when it already is.
    pub fn toggle_task_done(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let (id, status) = (task.id, task.status);
        let next = if status == TaskStatus::Done {
            TaskStatus::Todo
        } else {
            TaskStatus::Done
        };
        match task_ops::set_status(&self.store, &id.to_string(), next) {
            Ok(task) => {
                self.info(format!("{}: {}", next.label(), task.name));
                self.reload_records();
            }
            Err(e) => self.error(e),
        }
    }
}

/// Restore UI state from .ui-state.json
pub fn restore_ui_state(app: &mut App) {
    use crate::io::state::read_ui_state;

    let Some(ui_state) = read_ui_state(app.store.dir()) else {
        return;
    };
    if let Some(panel) = Panel::parse(&ui_state.panel) {
        app.panel = panel;
    }
    app.show_done = ui_state.show_done;
    app.habit_cursor = ui_state.habit_cursor;
    if let Some(id) = ui_state.selected_task {
        app.select_task_id(id);
    }
    app.clamp_cursors();
}

/// Save UI state to .ui-state.json
pub fn save_ui_state(app: &App) {
    use crate::io::state::{UiState, write_ui_state};

    let ui_state = UiState {
        panel: app.panel.as_str().to_string(),
        selected_task: app.selected_task().map(|t| t.id),
        habit_cursor: app.habit_cursor,
        show_done: app.show_done,
    };
    if let Err(e) = write_ui_state(app.store.dir(), &ui_state) {
        log::warn!("could not save ui state: {}", e);
    }
}

/// Run the TUI application
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open(data_dir)?;
    let config = config_io::load_config_or_default(store.dir());
    let mut app = App::new(store, config, Local::now());
    restore_ui_state(&mut app);

    let watcher = match StoreWatcher::start(app.store.dir()) {
        Ok(w) => Some(w),
        Err(e) => {
            log::warn!("file watching disabled: {}", e);
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    save_ui_state(&app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&StoreWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.tick(Local::now());
            input::handle_key(app, key);
        }

        if last_tick.elapsed() >= TICK {
            app.tick(Local::now());
            last_tick = Instant::now();
        }

        if let Some(w) = watcher
            && !w.poll().is_empty()
        {
            app.reload_all();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
