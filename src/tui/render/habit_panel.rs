use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Panel};
use crate::util::unicode;

use super::helpers::{panel_block, scroll_offset};

/// Render today's habit checklist
pub fn render_habit_panel(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.panel == Panel::Habits;
    let today = app.today();
    let title = format!(
        "Habits {}/{}",
        app.dashboard.habits_done, app.dashboard.habits_total
    );
    let block = panel_block(app, &title, focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let theme = &app.theme;
    let bg = theme.background;
    if app.habits.is_empty() {
        let empty = Paragraph::new(" No habits").style(Style::default().fg(theme.dim).bg(bg));
        frame.render_widget(empty, inner);
        return;
    }

    let height = inner.height as usize;
    let offset = scroll_offset(app.habit_cursor, height);
    let lines: Vec<Line> = app
        .habits
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(idx, habit)| {
            let is_cursor = focused && idx == app.habit_cursor;
            let row_bg = if is_cursor { theme.selection_bg } else { bg };
            let done = habit.is_done_on(today);
            let (mark, mark_color) = if done {
                ("[x] ", theme.green)
            } else {
                ("[ ] ", theme.text)
            };
            let cursor = if is_cursor { "\u{258E}" } else { " " };
            let text_cells = (inner.width as usize).saturating_sub(5);
            Line::from(vec![
                Span::styled(cursor, Style::default().fg(theme.selection_border).bg(row_bg)),
                Span::styled(mark, Style::default().fg(mark_color).bg(row_bg)),
                Span::styled(
                    unicode::fit_to_width(&habit.text, text_cells),
                    Style::default()
                        .fg(if done { theme.dim } else { theme.text_bright })
                        .bg(row_bg),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn marks_follow_today() {
        let (_tmp, mut app) = app_with_tasks();
        let output = render_to_string(30, 4, |frame, area| {
            render_habit_panel(frame, &app, area);
        });
        assert!(output.contains("Habits 0/1"));
        assert!(output.contains("[ ] Read"));

        app.panel = Panel::Habits;
        app.toggle_habit();
        let output = render_to_string(30, 4, |frame, area| {
            render_habit_panel(frame, &app, area);
        });
        assert!(output.contains("Habits 1/1"));
        assert!(output.contains("\u{258E}[x] Read"));
    }
}
