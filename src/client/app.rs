//! Client-side view state wrapped around the attempt session.

use crate::session::{AttemptSession, SessionEvent, Status};

/// The attempt session plus the purely presentational state the terminal
/// UI needs: which option the cursor is on and whether the transport died
/// mid-quiz.
pub struct ClientApp {
    pub session: AttemptSession,
    pub option_cursor: usize,
    pub transport_error: Option<String>,
}

impl ClientApp {
    pub fn new(session: AttemptSession) -> Self {
        Self {
            session,
            option_cursor: 0,
            transport_error: None,
        }
    }

    /// Feed one event through to the session, tracking transport failures
    /// the engine leaves to the surrounding application.
    pub fn apply(&mut self, event: SessionEvent) {
        if let SessionEvent::ConnectionLost { reason } = &event {
            if self.session.status() == Status::InProgress {
                self.transport_error = Some(reason.clone());
            }
        }

        let was_loading = self.session.status() == Status::Loading;
        self.session.apply(event);
        if was_loading && self.session.status() == Status::InProgress {
            self.sync_cursor();
        }
    }

    pub fn select_next_option(&mut self) {
        if let Some(count) = self.option_count() {
            self.option_cursor = (self.option_cursor + 1) % count;
        }
    }

    pub fn select_previous_option(&mut self) {
        if let Some(count) = self.option_count() {
            self.option_cursor = (self.option_cursor + count - 1) % count;
        }
    }

    /// Record the highlighted option as the answer for the active question.
    pub fn record_highlighted(&mut self) {
        let answer = match self.session.current_question() {
            Some(q) if !q.options.is_empty() => {
                q.options[self.option_cursor.min(q.options.len() - 1)].clone()
            }
            _ => return,
        };
        self.session.record(answer);
    }

    pub fn go_next(&mut self) {
        self.session.go_next();
        self.sync_cursor();
    }

    pub fn go_previous(&mut self) {
        self.session.go_previous();
        self.sync_cursor();
    }

    /// Point the cursor at the recorded answer when entering a question,
    /// falling back to the first option.
    fn sync_cursor(&mut self) {
        self.option_cursor = self
            .session
            .current_question()
            .and_then(|q| {
                let selected = self.session.selected_answer(&q.id)?;
                q.options.iter().position(|option| option == selected)
            })
            .unwrap_or(0);
    }

    fn option_count(&self) -> Option<usize> {
        match self.session.current_question() {
            Some(q) if !q.options.is_empty() => Some(q.options.len()),
            _ => None,
        }
    }
}
