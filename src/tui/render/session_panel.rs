use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::cli::output::{format_minutes, stars};
use crate::ops::stats::recent_sessions;
use crate::tui::app::{App, Panel};
use crate::util::unicode;

use super::helpers::panel_block;

/// Render the most recent sessions, newest first
pub fn render_session_panel(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.panel == Panel::Sessions;
    let block = panel_block(app, "Recent sessions", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let theme = &app.theme;
    let bg = theme.background;
    let recent = recent_sessions(&app.sessions, app.sessions.len());
    if recent.is_empty() {
        let empty =
            Paragraph::new(" No sessions yet").style(Style::default().fg(theme.dim).bg(bg));
        frame.render_widget(empty, inner);
        return;
    }

    let height = inner.height as usize;
    let offset = app.session_scroll.min(recent.len().saturating_sub(height));
    let lines: Vec<Line> = recent
        .iter()
        .skip(offset)
        .take(height)
        .map(|session| {
            let head = format!(
                " {}  {:>6}  ",
                session.date.format("%m-%d %H:%M"),
                format_minutes(session.duration)
            );
            let rating = format!("{}  ", stars(session.rating));
            let used = unicode::display_width(&head) + unicode::display_width(&rating);
            let name_cells = (inner.width as usize).saturating_sub(used);
            let name = if session.task_name.is_empty() {
                "Unknown"
            } else {
                session.task_name.as_str()
            };
            Line::from(vec![
                Span::styled(head, Style::default().fg(theme.dim).bg(bg)),
                Span::styled(rating, Style::default().fg(theme.yellow).bg(bg)),
                Span::styled(
                    unicode::truncate_to_width(name, name_cells),
                    Style::default().fg(theme.text).bg(bg),
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
    fn newest_session_first() {
        let (_tmp, app) = app_with_history();
        let output = render_to_string(60, 5, |frame, area| {
            render_session_panel(frame, &app, area);
        });
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[1].contains("05-14 09:30     25m  ★★★★★  Draft"));
        assert!(lines[2].contains("05-14 09:00     25m  ★★★★☆  Draft"));
    }

    #[test]
    fn no_sessions_hint() {
        let (_tmp, app) = empty_app();
        let output = render_to_string(40, 4, |frame, area| {
            render_session_panel(frame, &app, area);
        });
        assert!(output.contains("No sessions yet"));
    }
}
