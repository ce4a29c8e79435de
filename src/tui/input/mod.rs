mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Panel};
use crate::ops::timer::TimerStatus;

use navigate::{move_cursor, move_to_edge};

/// Handle a key event
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.message = None;

    if app.show_help {
        // Any key closes the overlay
        app.show_help = false;
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('c') {
            app.should_quit = true;
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,

        // Timer
        KeyCode::Char('s') | KeyCode::Enter => app.start_or_resume(),
        KeyCode::Char('p') => app.pause(),
        KeyCode::Char('x') => app.stop(),
        KeyCode::Char('c') => app.reset_timer(),
        KeyCode::Char('d') => app.note_distraction(false),
        KeyCode::Char('u') => app.note_distraction(true),
        KeyCode::Char('m') => app.toggle_mode(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_minutes(5),
        KeyCode::Char('-') => app.adjust_minutes(-5),
        KeyCode::Char(c @ '1'..='5') if app.timer.status() == TimerStatus::Completed => {
            app.complete(c as u8 - b'0');
        }

        // Panels
        KeyCode::Tab => app.panel = app.panel.next(),
        KeyCode::BackTab => app.panel = app.panel.next().next(),
        KeyCode::Char('j') | KeyCode::Down => move_cursor(app, 1),
        KeyCode::Char('k') | KeyCode::Up => move_cursor(app, -1),
        KeyCode::Char('g') | KeyCode::Home => move_to_edge(app, false),
        KeyCode::Char('G') | KeyCode::End => move_to_edge(app, true),
        KeyCode::Char(' ') => match app.panel {
            Panel::Tasks => app.toggle_task_done(),
            Panel::Habits => app.toggle_habit(),
            Panel::Sessions => {}
        },
        KeyCode::Char('a') => {
            app.show_done = !app.show_done;
            app.clamp_cursors();
        }
        KeyCode::Char('r') => {
            app.reload_all();
            app.info("reloaded");
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::Store;
    use crate::model::{AppConfig, Priority};
    use crate::ops::{habit_ops, task_ops};
    use chrono::{Local, TimeZone};
    use tempfile::TempDir;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app() -> (TempDir, App) {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        task_ops::add_task(&store, "Draft", "Book", Priority::High).unwrap();
        task_ops::add_task(&store, "Edit", "Book", Priority::Medium).unwrap();
        let today = chrono::NaiveDate::from_ymd_opt(2025, 5, 14).unwrap();
        habit_ops::add_habit(&store, "Read", today).unwrap();
        let now = Local.with_ymd_and_hms(2025, 5, 14, 9, 0, 0).unwrap();
        (tmp, App::new(store, AppConfig::default(), now))
    }

    #[test]
    fn timer_keys_drive_the_state_machine() {
        let (_tmp, mut app) = app();
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.timer.status(), TimerStatus::Running);
        assert_eq!(app.timer.task().map(|t| t.name.as_str()), Some("Edit"));

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('u'));
        assert_eq!(app.timer.distractions(), 1);

        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.timer.status(), TimerStatus::Paused);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.timer.status(), TimerStatus::Completed);

        // Digits only rate a completed session
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.timer.status(), TimerStatus::Idle);
        assert_eq!(app.sessions.len(), 1);
        assert_eq!(app.sessions[0].rating, 4);
        assert_eq!(app.sessions[0].distractions, 1);
    }

    #[test]
    fn space_acts_on_the_focused_panel() {
        let (_tmp, mut app) = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.panel, Panel::Habits);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.dashboard.habits_done, 1);

        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.panel, Panel::Tasks);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.visible_tasks().len(), 1);
    }

    #[test]
    fn help_overlay_swallows_next_key() {
        let (_tmp, mut app) = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn mode_and_length_keys_only_work_idle() {
        let (_tmp, mut app) = app();
        press(&mut app, KeyCode::Char('+'));
        assert_eq!(app.timer.planned_secs(), 30 * 60);
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('m'));
        assert!(app.message.as_ref().is_some_and(|m| m.is_error));
    }
}
