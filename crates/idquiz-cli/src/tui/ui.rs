//! TUI rendering.
//!
//! ┌──────────────────────────────────────────────┐
//! │  idquiz   trial 3/8   blur 75%               │
//! ├──────────────────────────────────────────────┤
//! │  ████████████████░░░░░░░░  3 left            │
//! ├─────────────────────┬────────────────────────┤
//! │  Reference          │  Who is this?          │
//! │  Photo 3 of 8       │  ▸ 1  Candidate 1      │
//! │                     │    2  Candidate 2      │
//! │                     │    ...                 │
//! ├─────────────────────┴────────────────────────┤
//! │  1-6 answer   ←→ move   enter: pick   q: quit│
//! └──────────────────────────────────────────────┘
//!
//! Once the last trial closes the main area shows the report instead.

use std::path::Path;

use super::app::App;
use idquiz_core::{Method, TrialView};
use ratatui::{prelude::*, widgets::*};

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(3), // countdown
            Constraint::Min(10),   // main
            Constraint::Length(1), // status
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app);
    match app.view() {
        Some(view) => {
            draw_countdown(f, rows[1], app);
            draw_trial(f, rows[2], app, &view);
        }
        None => {
            draw_summary_line(f, rows[1], app);
            draw_report(f, rows[2], app);
        }
    }
    draw_status(f, rows[3], app);
    draw_keys(f, rows[4], app);
}

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let progress = match app.view() {
        Some(view) => format!(
            "  trial {}/{}   {} ",
            view.position,
            view.total,
            condition_label(view.method, view.intensity)
        ),
        None => format!("  finished {}/{} ", app.completed_trials(), app.total_trials()),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(" idquiz ", Style::default().bold().fg(Color::Cyan)),
            Span::styled(progress, Style::default().fg(Color::Yellow)),
        ]));

    f.render_widget(block, area);
}

fn draw_countdown(f: &mut Frame, area: Rect, app: &App) {
    let total = app.countdown_ticks().max(1);
    let left = app.countdown().unwrap_or(0);
    let color = if left * 3 <= total {
        Color::Red
    } else {
        Color::Green
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Time "))
        .gauge_style(Style::default().fg(color))
        .ratio(f64::from(left.min(total)) / f64::from(total))
        .label(format!("{left} left"));

    f.render_widget(gauge, area);
}

fn draw_trial(f: &mut Frame, area: Rect, app: &App, view: &TrialView<'_>) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let reference = if app.show_files() {
        view.reference
            .display_path(app.image_root())
            .display()
            .to_string()
    } else {
        format!("Photo {} of {}", view.position, view.total)
    };
    let lines = vec![
        Line::from(Span::styled(
            "Original photo",
            Style::default().bold().fg(Color::Cyan),
        )),
        Line::from(""),
        Line::from(reference),
        Line::from(""),
        Line::from(Span::styled(
            "Which candidate shows the same person?",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let reference = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Reference "));
    f.render_widget(reference, cols[0]);

    let method_dir = app.show_files().then(|| app.image_root().join(view.method.to_string()));
    let rows: Vec<Row> = view
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let is_cursor = i == app.cursor();
            let pointer = if is_cursor { "▸" } else { " " };
            let style = if is_cursor {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else {
                Style::default()
            };
            Row::new(vec![
                pointer.to_string(),
                format!("{}", i + 1),
                candidate_label(i, &option.file, method_dir.as_deref()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(2), // pointer
            Constraint::Length(3), // key
            Constraint::Min(10),   // image
        ],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Candidates ({}) ", view.method)),
    );

    f.render_widget(table, cols[1]);
}

fn draw_summary_line(f: &mut Frame, area: Rect, app: &App) {
    let text = match app.report() {
        Some(report) => format!(" Overall accuracy: {}%", report.overall),
        None => " Quiz stopped".to_string(),
    };
    let p = Paragraph::new(text)
        .style(Style::default().bold().fg(Color::Green))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_report(f: &mut Frame, area: Rect, app: &App) {
    let text = app.report().map(|r| r.to_text()).unwrap_or_default();
    let p = Paragraph::new(text)
        .scroll((app.scroll(), 0))
        .block(Block::default().borders(Borders::ALL).title(" Results "));
    f.render_widget(p, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let p = Paragraph::new(format!(" {}", app.status().unwrap_or("")))
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(p, area);
}

fn draw_keys(f: &mut Frame, area: Rect, app: &App) {
    let keys = if app.report().is_some() {
        " ↑↓ scroll   s: save report   q: quit"
    } else {
        " 1-6 answer   ←→↑↓ move   enter: pick   q: quit"
    };
    let bar = Paragraph::new(keys).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}

/// Neutral `"Candidate 3"`, or the image path when file names are shown.
fn candidate_label(index: usize, file: &str, method_dir: Option<&Path>) -> String {
    match method_dir {
        Some(dir) => dir.join(file).display().to_string(),
        None => format!("Candidate {}", index + 1),
    }
}

/// `"blur 75%"`, or just the method name where intensity does not apply.
fn condition_label(method: Method, intensity: Option<u32>) -> String {
    match intensity {
        Some(i) if method.has_intensity() => format!("{method} {i}%"),
        _ => method.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_label() {
        assert_eq!(condition_label(Method::Blur, Some(75)), "blur 75%");
        assert_eq!(condition_label(Method::Mask, None), "mask");
        assert_eq!(condition_label(Method::Mask, Some(50)), "mask");
        assert_eq!(condition_label(Method::Pixel, None), "pixel");
    }

    #[test]
    fn test_candidate_labels_hide_file_names_by_default() {
        assert_eq!(candidate_label(0, "P1_blur_50.jpg", None), "Candidate 1");
        assert_eq!(candidate_label(5, "P7_mask.jpg", None), "Candidate 6");
        let dir = Path::new("images").join("blur");
        let shown = candidate_label(2, "P1_blur_50.jpg", Some(dir.as_path()));
        assert!(shown.ends_with("P1_blur_50.jpg"));
        assert!(shown.starts_with("images"));
    }
}
