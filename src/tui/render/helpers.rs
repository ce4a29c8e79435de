use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders};

use crate::model::TaskStatus;
use crate::tui::app::App;
use crate::util::unicode;

/// Status symbols for each task status (markdown checkbox style)
pub(super) fn status_symbol(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "[ ]",
        TaskStatus::InProgress => "[>]",
        TaskStatus::Done => "[x]",
    }
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// Bordered panel; the focused panel gets the selection border color.
pub(super) fn panel_block<'a>(app: &App, title: &'a str, focused: bool) -> Block<'a> {
    let border = if focused {
        app.theme.selection_border
    } else {
        app.theme.dim
    };
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(app.theme.text_bright).bg(app.theme.background),
        ))
        .border_style(Style::default().fg(border).bg(app.theme.background))
        .style(Style::default().bg(app.theme.background))
}

/// Split `width` cells of a progress bar into (filled, empty) cell counts.
pub(super) fn bar_cells(progress: f64, width: usize) -> (usize, usize) {
    let filled = ((progress.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    (filled, width - filled)
}

/// First visible row so that `cursor` stays on screen.
pub(super) fn scroll_offset(cursor: usize, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    cursor.saturating_sub(height - 1)
}
