use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::cli::output::{format_clock, format_minutes};
use crate::ops::timer::{TimerMode, TimerStatus};
use crate::tui::app::App;

use super::helpers::{bar_cells, panel_block};

/// Render the timer: task, clock, progress gauge and session details
pub fn render_timer_panel(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let timer = &app.timer;
    let snap = timer.snapshot(app.now);
    let block = panel_block(app, "Focus", false);
    let inner_width = area.width.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = Vec::new();

    // Task line
    match &snap.task {
        Some(task) => lines.push(Line::from(vec![
            Span::styled(
                format!(" {}", task.name),
                Style::default().fg(theme.text_bright).bg(bg).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", task.project), Style::default().fg(theme.dim).bg(bg)),
        ])),
        None if snap.status == TimerStatus::Idle => lines.push(Line::from(Span::styled(
            " pick a task and press s",
            Style::default().fg(theme.dim).bg(bg),
        ))),
        None => lines.push(Line::from("")),
    }

    // Clock + status
    let clock = format_clock(timer.display_secs(app.now));
    let status_color = match snap.status {
        TimerStatus::Idle => theme.dim,
        TimerStatus::Running => theme.green,
        TimerStatus::Paused => theme.yellow,
        TimerStatus::Completed => theme.highlight,
    };
    let mode = match snap.mode {
        TimerMode::Countdown => format!("countdown {}", format_minutes((snap.planned_secs / 60) as u32)),
        TimerMode::Elapsed => "elapsed".to_string(),
    };
    lines.push(Line::from(vec![
        Span::styled(
            format!(" {}", clock),
            Style::default().fg(theme.text_bright).bg(bg).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", snap.status.to_string().to_uppercase()),
            Style::default().fg(status_color).bg(bg).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", mode), Style::default().fg(theme.dim).bg(bg)),
    ]));

    // Gauge
    let percent = format!(" {:>3}%", (snap.progress * 100.0).round() as u32);
    let bar_width = inner_width.saturating_sub(percent.len() + 1);
    let (filled, empty) = bar_cells(snap.progress, bar_width);
    lines.push(Line::from(vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled("\u{2588}".repeat(filled), Style::default().fg(theme.gauge).bg(bg)),
        Span::styled("\u{2591}".repeat(empty), Style::default().fg(theme.dim).bg(bg)),
        Span::styled(percent, Style::default().fg(theme.text).bg(bg)),
    ]));

    // Details
    let mut details = Vec::new();
    if snap.status != TimerStatus::Idle {
        details.push(format!("distractions {}", snap.distractions));
    }
    if let Some(end) = snap.ends_at {
        details.push(format!("ends {}", end.format("%H:%M")));
    }
    if let Some((minutes, at)) = timer.suggested_break(app.now) {
        details.push(format!("break {}m at {}", minutes, at.format("%H:%M")));
    }
    lines.push(Line::from(Span::styled(
        format!(" {}", details.join("   ")),
        Style::default().fg(theme.text).bg(bg),
    )));

    if snap.status == TimerStatus::Completed {
        lines.push(Line::from(Span::styled(
            " session complete: rate it 1-5, or c to discard",
            Style::default().fg(theme.highlight).bg(bg),
        )));
    }

    let paragraph = Paragraph::new(lines).block(block).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;
    use chrono::Duration;

    #[test]
    fn idle_timer_prompts_for_task() {
        let (_tmp, app) = app_with_tasks();
        let output = render_to_string(TERM_W, 8, |frame, area| {
            render_timer_panel(frame, &app, area);
        });
        assert!(output.contains("pick a task and press s"));
        assert!(output.contains("25:00  IDLE  countdown 25m"));
        assert!(output.contains("0%"));
    }

    #[test]
    fn running_timer_shows_remaining_and_progress() {
        let (_tmp, mut app) = app_with_tasks();
        app.start_or_resume();
        app.tick(app.now + Duration::minutes(5));
        let output = render_to_string(TERM_W, 8, |frame, area| {
            render_timer_panel(frame, &app, area);
        });
        assert!(output.contains("Draft  Book"));
        assert!(output.contains("20:00  RUNNING"));
        assert!(output.contains(" 20%"));
        assert!(output.contains("ends 09:25"));
    }

    #[test]
    fn completed_timer_asks_for_rating() {
        let (_tmp, mut app) = app_with_tasks();
        app.start_or_resume();
        app.stop();
        let output = render_to_string(TERM_W, 8, |frame, area| {
            render_timer_panel(frame, &app, area);
        });
        assert!(output.contains("COMPLETED"));
        assert!(output.contains("rate it 1-5"));
    }
}
