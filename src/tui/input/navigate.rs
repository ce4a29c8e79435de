use crate::tui::app::{App, Panel};

fn panel_len(app: &App) -> usize {
    match app.panel {
        Panel::Tasks => app.visible_tasks().len(),
        Panel::Habits => app.habits.len(),
        Panel::Sessions => app.sessions.len(),
    }
}

fn cursor_mut(app: &mut App) -> &mut usize {
    match app.panel {
        Panel::Tasks => &mut app.task_cursor,
        Panel::Habits => &mut app.habit_cursor,
        Panel::Sessions => &mut app.session_scroll,
    }
}

/// Move the focused panel's cursor by `delta` rows, stopping at the ends.
pub(super) fn move_cursor(app: &mut App, delta: isize) {
    let len = panel_len(app);
    if len == 0 {
        return;
    }
    let cursor = cursor_mut(app);
    *cursor = cursor.saturating_add_signed(delta).min(len - 1);
}

/// Jump to the first or last row of the focused panel.
pub(super) fn move_to_edge(app: &mut App, end: bool) {
    let last = panel_len(app).saturating_sub(1);
    *cursor_mut(app) = if end { last } else { 0 };
}
