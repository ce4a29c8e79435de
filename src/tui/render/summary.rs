use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::cli::output::{format_hour_range, format_minutes, plural};
use crate::ops::stats::weekday_name;
use crate::tui::app::App;

use super::helpers::{bar_cells, panel_block};

/// Today/week figures from the dashboard, plus a 7-day focus sparkline
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let dash = &app.dashboard;
    let label = Style::default().fg(theme.dim).bg(bg);
    let value = Style::default().fg(theme.text_bright).bg(bg);

    let row = |name: &'static str, text: String| {
        Line::from(vec![
            Span::styled(format!(" {:<10}", name), label),
            Span::styled(text, value),
        ])
    };

    let mut lines = vec![
        row(
            "Today",
            format!(
                "{}  ({} session{})",
                format_minutes(dash.today_minutes),
                dash.today_sessions,
                plural(dash.today_sessions)
            ),
        ),
        row("Week", format_minutes(dash.week_minutes)),
        row("Streak", format!("{} day{}", dash.streak, plural(dash.streak))),
        row(
            "Score",
            format!(
                "{}%  habits {}/{}",
                dash.productivity_score, dash.habits_done, dash.habits_total
            ),
        ),
        row(
            "Best",
            match (dash.best_hour, dash.best_weekday) {
                (Some(hour), Some(day)) => format!("{}, {}", format_hour_range(hour), weekday_name(day)),
                (Some(hour), None) => format_hour_range(hour),
                _ => "-".to_string(),
            },
        ),
        row("Top", dash.top_project.clone().unwrap_or_else(|| "-".to_string())),
    ];

    // One cell per day, height by share of the busiest day
    let max = dash
        .focus_by_day
        .iter()
        .map(|d| d.hours)
        .fold(0.0_f64, f64::max);
    let blocks = [' ', '\u{2581}', '\u{2582}', '\u{2583}', '\u{2584}', '\u{2585}', '\u{2586}', '\u{2587}', '\u{2588}'];
    let spark: String = dash
        .focus_by_day
        .iter()
        .map(|d| {
            if max <= 0.0 {
                return blocks[0];
            }
            let (level, _) = bar_cells(d.hours / max, blocks.len() - 1);
            blocks[level]
        })
        .collect();
    lines.push(Line::from(vec![
        Span::styled(format!(" {:<10}", "7 days"), label),
        Span::styled(spark, Style::default().fg(theme.gauge).bg(bg)),
    ]));

    let block = panel_block(app, "Today", false);
    let paragraph = Paragraph::new(lines).block(block).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
