use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::timer::TimerStatus;
use crate::tui::app::App;
use crate::util::unicode;

/// Key hints for the current timer state
pub fn key_hints(status: TimerStatus) -> &'static str {
    match status {
        TimerStatus::Idle => "s start  m mode  +/- length  space toggle  tab panel  ? help  q quit",
        TimerStatus::Running => "p pause  x stop  d distraction  c discard  ? help  q quit",
        TimerStatus::Paused => "s resume  x stop  c discard  ? help  q quit",
        TimerStatus::Completed => "1-5 rate and save  c discard  ? help  q quit",
    }
}

/// Render the status row (bottom of screen): the last message, else key hints
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let span = match &app.message {
        Some(msg) => {
            let color = if msg.is_error { app.theme.red } else { app.theme.green };
            Span::styled(
                unicode::truncate_to_width(&format!(" {}", msg.text), width),
                Style::default().fg(color).bg(bg),
            )
        }
        None if app.config.ui.show_key_hints => Span::styled(
            unicode::truncate_to_width(&format!(" {}", key_hints(app.timer.status())), width),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
        None => Span::styled(" ".repeat(width), Style::default().bg(bg)),
    };

    let paragraph = Paragraph::new(Line::from(span)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
