use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Panel};

use super::helpers::spans_width;

/// Render the tab bar: app name + panel tabs + clock, with separator line below
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // separator
        ])
        .split(area);

    render_tabs(frame, app, chunks[0]);

    let sep = Paragraph::new(Span::styled(
        "\u{2500}".repeat(chunks[1].width as usize),
        Style::default().fg(app.theme.dim).bg(app.theme.background),
    ));
    frame.render_widget(sep, chunks[1]);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let bg_style = Style::default().bg(bg);
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));

    let mut spans: Vec<Span> = vec![
        Span::styled(" ", bg_style),
        Span::styled("\u{25B6}", Style::default().fg(app.theme.purple).bg(bg)),
        Span::styled(
            " flowstate  ",
            Style::default().fg(app.theme.text_bright).bg(bg).add_modifier(Modifier::BOLD),
        ),
    ];

    for panel in [Panel::Tasks, Panel::Habits, Panel::Sessions] {
        let is_current = app.panel == panel;
        spans.push(Span::styled(format!(" {} ", panel.as_str()), tab_style(app, is_current)));
        spans.push(sep.clone());
    }

    // Right-aligned date and time
    let clock = app.now.format("%a %d %b %H:%M ").to_string();
    let width = area.width as usize;
    let used = spans_width(&spans);
    if used + clock.len() < width {
        spans.push(Span::styled(" ".repeat(width - used - clock.len()), bg_style));
        spans.push(Span::styled(clock, Style::default().fg(app.theme.dim).bg(bg)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.dim).bg(app.theme.background)
    }
}
