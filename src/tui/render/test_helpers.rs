use chrono::{DateTime, Local, NaiveDate, TimeZone};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::io::store::{KEY_SESSIONS, Store};
use crate::model::{AppConfig, Priority, Session};
use crate::ops::{habit_ops, task_ops};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Wednesday 2025-05-14
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 14).unwrap()
}

pub fn at(hour: u32, minute: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 5, 14, hour, minute, 0).unwrap()
}

/// An App over an empty temp store, clock at 09:00.
pub fn empty_app() -> (TempDir, App) {
    let tmp = TempDir::new().unwrap();
    let store = Store::open(tmp.path()).unwrap();
    let app = App::new(store, AppConfig::default(), at(9, 0));
    (tmp, app)
}

/// Two tasks in "Book" and one habit.
pub fn app_with_tasks() -> (TempDir, App) {
    let (tmp, mut app) = empty_app();
    task_ops::add_task(&app.store, "Draft", "Book", Priority::High).unwrap();
    task_ops::add_task(&app.store, "Edit", "Book", Priority::Medium).unwrap();
    habit_ops::add_habit(&app.store, "Read", today()).unwrap();
    app.reload_records();
    (tmp, app)
}

/// Tasks plus two 25-minute sessions this morning, clock at 10:00.
pub fn app_with_history() -> (TempDir, App) {
    let (tmp, mut app) = app_with_tasks();
    for (minute, rating) in [(0, 4), (30, 5)] {
        let session = Session {
            id: 0,
            task_id: None,
            task_name: "Draft".into(),
            project: "Book".into(),
            duration: 25,
            rating,
            tags: Default::default(),
            distractions: 0,
            notes: String::new(),
            date: at(9, minute),
        };
        app.store.append(KEY_SESSIONS, session).unwrap();
    }
    app.now = at(10, 0);
    app.reload_records();
    (tmp, app)
}
