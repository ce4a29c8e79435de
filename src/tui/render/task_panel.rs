use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::cli::output::format_hours;
use crate::model::{Priority, TaskStatus};
use crate::tui::app::{App, Panel};
use crate::util::unicode;

use super::helpers::{panel_block, scroll_offset, spans_width, status_symbol};

/// Render the task list: status, name, project and accumulated focus time
pub fn render_task_panel(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.panel == Panel::Tasks;
    let title = if app.show_done { "Tasks (all)" } else { "Tasks" };
    let block = panel_block(app, title, focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let theme = &app.theme;
    let bg = theme.background;
    let tasks = app.visible_tasks();
    if tasks.is_empty() {
        let empty = Paragraph::new(" No tasks (flow task add <name> -p <project>)")
            .style(Style::default().fg(theme.dim).bg(bg));
        frame.render_widget(empty, inner);
        return;
    }

    let width = inner.width as usize;
    let height = inner.height as usize;
    let offset = scroll_offset(app.task_cursor, height);
    let timing = app.timer.task().map(|t| t.id);

    let mut lines: Vec<Line> = Vec::new();
    for (idx, task) in tasks.iter().enumerate().skip(offset).take(height) {
        let is_cursor = focused && idx == app.task_cursor;
        let row_bg = if is_cursor { theme.selection_bg } else { bg };
        let mut spans: Vec<Span> = Vec::new();

        if is_cursor {
            spans.push(Span::styled(
                "\u{258E}",
                Style::default().fg(theme.selection_border).bg(row_bg),
            ));
        } else {
            spans.push(Span::styled(" ", Style::default().bg(row_bg)));
        }
        spans.push(Span::styled(
            format!("{} ", status_symbol(task.status)),
            Style::default().fg(theme.status_color(task.status)).bg(row_bg),
        ));

        // Right side: priority marker, project swatch, hours
        let color = app
            .projects
            .iter()
            .find(|p| p.name == task.project)
            .map_or(theme.blue, |p| theme.project_color(&p.color));
        let mut right: Vec<Span> = Vec::new();
        if task.priority == Priority::High {
            right.push(Span::styled("! ", Style::default().fg(theme.red).bg(row_bg)));
        }
        right.push(Span::styled("\u{25CF} ", Style::default().fg(color).bg(row_bg)));
        right.push(Span::styled(
            format!("{} ", task.project),
            Style::default().fg(theme.dim).bg(row_bg),
        ));
        right.push(Span::styled(
            format!("{:>7}", format_hours(task.focus_time)),
            Style::default().fg(theme.text).bg(row_bg),
        ));

        let used = spans_width(&spans) + spans_width(&right);
        let name_cells = width.saturating_sub(used + 1);
        let mut name_style = Style::default().fg(theme.text_bright).bg(row_bg);
        if task.status == TaskStatus::Done {
            name_style = name_style.fg(theme.dim).add_modifier(Modifier::CROSSED_OUT);
        }
        if timing == Some(task.id) {
            name_style = name_style.add_modifier(Modifier::BOLD);
        }
        spans.push(Span::styled(unicode::fit_to_width(&task.name, name_cells), name_style));
        spans.push(Span::styled(" ", Style::default().bg(row_bg)));
        spans.extend(right);

        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), inner);
}
