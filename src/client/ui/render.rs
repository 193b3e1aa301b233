//! Main client UI renderer.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};

use crate::client::ClientApp;
use crate::session::Status;

use super::{question, result};

/// Render the client UI based on the session status.
pub fn render(frame: &mut Frame, app: &ClientApp) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.session.status() {
        Status::Loading => render_loading(frame, area, app),
        Status::InProgress => question::render(frame, area, app),
        Status::Submitting => render_submitting(frame, area),
        Status::Submitted => result::render(frame, area, app),
        Status::Failed => render_submit_failed(frame, area, app),
        Status::LoadFailed => render_load_failed(frame, area, app),
    }
}

fn centered(frame: &mut Frame, area: Rect, height: u16, content: Vec<Line>) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .split(area);

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}

fn render_loading(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let content = vec![
        Line::from(Span::styled(
            "QUIZ ATTEMPT",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Loading quiz {:?}...", app.session.quiz_id()),
            Style::default().fg(Color::Yellow),
        )),
    ];
    centered(frame, area, 5, content);
}

fn render_submitting(frame: &mut Frame, area: Rect) {
    let content = vec![
        Line::from(Span::styled(
            "QUIZ ATTEMPT",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Sending your answers...",
            Style::default().fg(Color::Yellow),
        )),
    ];
    centered(frame, area, 5, content);
}

fn render_load_failed(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let reason = app
        .session
        .load_error()
        .unwrap_or("The quiz could not be loaded");

    let content = vec![
        Line::from(Span::styled(
            "QUIZ ATTEMPT",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            reason.to_string(),
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Check that the quiz id is correct  ·  [Q] exit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    centered(frame, area, 7, content);
}

fn render_submit_failed(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let reason = app
        .session
        .submit_error()
        .unwrap_or("The submission was not accepted");

    let content = vec![
        Line::from(Span::styled(
            "SUBMISSION FAILED",
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            reason.to_string(),
            Style::default().fg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Your answers are unchanged.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[R] retry submission  ·  [Q] exit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    centered(frame, area, 9, content);
}
