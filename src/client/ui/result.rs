//! Submitted screen: the grade the service attached to its ack.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::client::ClientApp;

/// Render the post-submission screen.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(11),
        Constraint::Fill(1),
    ])
    .split(area);

    let mut content = vec![
        Line::from(Span::styled(
            "SUBMITTED",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
    ];

    match app.session.receipt() {
        Some(receipt) => {
            let percentage = if receipt.total > 0 {
                (receipt.score as f64 / receipt.total as f64) * 100.0
            } else {
                0.0
            };

            let grade_color = match percentage as u32 {
                90..=100 => Color::Green,
                70..=89 => Color::Cyan,
                50..=69 => Color::Yellow,
                _ => Color::Red,
            };

            content.push(Line::from(Span::styled(
                format!("{} / {}  ({:.0}%)", receipt.score, receipt.total, percentage),
                Style::default().fg(grade_color).bold(),
            )));
            content.push(Line::from(""));
            content.push(Line::from(Span::styled(
                format!("Attempt {}", receipt.attempt_id),
                Style::default().fg(Color::DarkGray),
            )));
        }
        None => {
            content.push(Line::from(Span::styled(
                "Your answers were received.",
                Style::default().fg(Color::Green),
            )));
        }
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "Press [Q] to exit",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    frame.render_widget(widget, chunks[1]);
}
