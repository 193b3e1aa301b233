//! Question screen: countdown, prompt, options, answer status.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap};

use crate::client::ClientApp;

/// Render the active question.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let Some(question) = app.session.current_question() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(2), // Title
        Constraint::Length(3), // Progress
        Constraint::Length(1), // Countdown
        Constraint::Length(6), // Question text
        Constraint::Min(6),    // Options
        Constraint::Length(3), // Answer status
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_title(frame, chunks[0], app);
    render_progress(frame, chunks[1], app);
    render_countdown(frame, chunks[2], app.session.remaining_time());
    render_question_text(frame, chunks[3], &question.text);
    render_options(frame, chunks[4], app);
    render_answer_status(frame, chunks[5], app);
    render_controls(frame, chunks[6], app);
}

fn render_title(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let title = app.session.quiz_title().unwrap_or("Quiz");

    let widget = Paragraph::new(title)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan).bold());

    frame.render_widget(widget, area);
}

fn render_progress(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let label = format!(
        "Question {} of {}",
        app.session.current_index() + 1,
        app.session.question_count()
    );

    let widget = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio(app.session.progress_fraction())
        .label(label);

    frame.render_widget(widget, area);
}

fn render_countdown(frame: &mut Frame, area: Rect, remaining: u32) {
    let style = if remaining <= 5 {
        Style::default().fg(Color::Red).bold()
    } else {
        Style::default().fg(Color::White).bold()
    };

    let widget = Paragraph::new(format!("{}s", remaining))
        .alignment(Alignment::Center)
        .style(style);

    frame.render_widget(widget, area);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(widget, area);
}

fn render_options(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let Some(question) = app.session.current_question() else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Options ")
        .title_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1));

    if question.options.is_empty() {
        // Degraded display state: nothing selectable, nothing recorded.
        let widget = Paragraph::new("No options available for this question")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow))
            .block(block);
        frame.render_widget(widget, area);
        return;
    }

    let recorded = app.session.selected_answer(&question.id);

    let lines: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let highlighted = i == app.option_cursor;
            let is_recorded = recorded == Some(option.as_str());

            let cursor = if highlighted { "> " } else { "  " };
            let label = option_label(i);
            let marker = if is_recorded { "  [recorded]" } else { "" };

            let style = if highlighted {
                Style::default().fg(Color::Yellow).bold()
            } else if is_recorded {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(cursor, style),
                Span::styled(format!("{}) ", label), style),
                Span::styled(option.clone(), style),
                Span::styled(marker, Style::default().fg(Color::Green)),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).block(block);
    frame.render_widget(widget, area);
}

fn render_answer_status(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let mut lines = Vec::new();

    if let Some(question) = app.session.current_question() {
        match app.session.selected_answer(&question.id) {
            Some(answer) => lines.push(Line::from(Span::styled(
                format!("Selected: {}", answer),
                Style::default().fg(Color::Green),
            ))),
            None => lines.push(Line::from(Span::styled(
                "No answer selected",
                Style::default().fg(Color::Gray),
            ))),
        }
    }

    lines.push(Line::from(Span::styled(
        format!(
            "{} / {} questions answered",
            app.session.answered_count(),
            app.session.question_count()
        ),
        Style::default().fg(Color::DarkGray),
    )));

    if let Some(reason) = &app.transport_error {
        lines.push(Line::from(Span::styled(
            format!("Connection lost: {}", reason),
            Style::default().fg(Color::Red),
        )));
    }

    let widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let on_last = app.session.current_index() + 1 == app.session.question_count();
    let next_hint = if on_last { "submit" } else { "next" };

    let widget = Paragraph::new(format!(
        "j/k select  ·  Enter/Space record  ·  h previous  ·  l {}  ·  q quit",
        next_hint
    ))
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);

    frame.render_widget(widget, area);
}

fn option_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}
