//! The attempt session state machine.
//!
//! Owns the current question index, the countdown lifecycle, the answer
//! buffer, and the overall attempt status. User intents (`record`,
//! `go_next`, `go_previous`, `retry_submit`) and asynchronous events
//! (server responses, ticks, expiry) all funnel through one instance on one
//! task, which is what makes the submission guard race-free: by the time a
//! timer expiry and a submit click are both observed, one of them has
//! already moved the status out of `InProgress` and the other becomes a
//! no-op.

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::models::{Question, Quiz};
use crate::protocol::{ClientMessage, ServerMessage};

use super::answers::AnswerBuffer;
use super::timer::Countdown;
use super::SessionEvent;

/// Attempt status. Transitions are monotonic except the explicit
/// `Failed -> InProgress` step taken by `retry_submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Waiting for the quiz content and the attempt id.
    Loading,
    /// The participant is answering questions; the countdown is running.
    InProgress,
    /// The answer set is frozen and on its way to the server.
    Submitting,
    /// The server acknowledged the submission. Terminal.
    Submitted,
    /// The server rejected the submission or the transport dropped;
    /// an explicit retry is allowed.
    Failed,
    /// The quiz or the attempt could not be obtained. Terminal.
    LoadFailed,
}

/// What caused a question advance.
#[derive(Debug, Clone, Copy)]
enum AdvanceTrigger {
    UserAction,
    TimerExpiry,
}

/// The grade the server attached to its acknowledgement.
#[derive(Debug, Clone, Copy)]
pub struct SubmitReceipt {
    pub attempt_id: Uuid,
    pub score: usize,
    pub total: usize,
}

/// One participant's run through one quiz.
///
/// Created with [`AttemptSession::open`], which immediately requests the
/// quiz content and an attempt id. The session stays in [`Status::Loading`]
/// until both responses have arrived, then starts the countdown for
/// question 0.
#[derive(Debug)]
pub struct AttemptSession {
    quiz_id: String,
    quiz: Option<Quiz>,
    attempt_id: Option<Uuid>,
    current_index: usize,
    answers: AnswerBuffer,
    status: Status,
    remaining: u32,
    timer: Countdown,
    outbox: mpsc::UnboundedSender<ClientMessage>,
    receipt: Option<SubmitReceipt>,
    load_error: Option<String>,
    submit_error: Option<String>,
}

impl AttemptSession {
    /// Open an attempt at the given quiz: send the two load requests and
    /// enter `Loading`.
    pub fn open(
        quiz_id: impl Into<String>,
        outbox: mpsc::UnboundedSender<ClientMessage>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let quiz_id = quiz_id.into();
        let mut session = Self {
            quiz_id: quiz_id.clone(),
            quiz: None,
            attempt_id: None,
            current_index: 0,
            answers: AnswerBuffer::default(),
            status: Status::Loading,
            remaining: 0,
            timer: Countdown::new(events),
            outbox,
            receipt: None,
            load_error: None,
            submit_error: None,
        };

        let requested = session
            .outbox
            .send(ClientMessage::FetchQuiz {
                quiz_id: quiz_id.clone(),
            })
            .and_then(|()| session.outbox.send(ClientMessage::OpenAttempt { quiz_id }));
        if requested.is_err() {
            session.fail_load("connection to quiz service closed");
        }

        session
    }

    /// Feed one event into the state machine.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Server(msg) => self.apply_server(msg),
            SessionEvent::Tick { epoch, remaining } => {
                if epoch == self.timer.epoch() && self.status == Status::InProgress {
                    self.remaining = remaining;
                }
            }
            SessionEvent::Expired { epoch } => {
                if epoch == self.timer.epoch() && self.status == Status::InProgress {
                    self.remaining = 0;
                    self.advance(AdvanceTrigger::TimerExpiry);
                }
            }
            SessionEvent::ConnectionLost { reason } => match self.status {
                Status::Loading => self.fail_load(reason),
                Status::Submitting => self.fail_submit(reason),
                // Mid-quiz the engine state is untouched; the surrounding
                // application decides how to surface a dead transport.
                _ => {}
            },
        }
    }

    fn apply_server(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Quiz { quiz } if self.status == Status::Loading => {
                if quiz.questions.is_empty() {
                    self.fail_load(format!("quiz {:?} has no questions", quiz.id));
                } else {
                    self.quiz = Some(quiz);
                    self.maybe_begin();
                }
            }
            ServerMessage::QuizNotFound { quiz_id } if self.status == Status::Loading => {
                self.fail_load(format!("quiz {:?} not found", quiz_id));
            }
            ServerMessage::AttemptOpened { attempt_id } if self.status == Status::Loading => {
                self.attempt_id = Some(attempt_id);
                self.maybe_begin();
            }
            ServerMessage::SubmitAck {
                attempt_id,
                score,
                total,
            } if self.status == Status::Submitting && self.attempt_id == Some(attempt_id) => {
                self.receipt = Some(SubmitReceipt {
                    attempt_id,
                    score,
                    total,
                });
                self.status = Status::Submitted;
            }
            ServerMessage::SubmitRejected { reason } if self.status == Status::Submitting => {
                self.fail_submit(reason);
            }
            // Anything else is a stale or out-of-phase response.
            _ => {}
        }
    }

    /// Enter `InProgress` once both the quiz and the attempt id are in.
    fn maybe_begin(&mut self) {
        if self.quiz.is_some() && self.attempt_id.is_some() {
            self.status = Status::InProgress;
            self.reset_clock();
        }
    }

    /// Record an answer for the active question, overwriting any prior one.
    pub fn record(&mut self, answer: impl Into<String>) {
        if self.status != Status::InProgress {
            return;
        }
        let Some(question_id) = self.current_question().map(|q| q.id.clone()) else {
            return;
        };
        self.answers.record(&question_id, answer);
    }

    /// Move to the next question, or submit if this was the last one.
    pub fn go_next(&mut self) {
        self.advance(AdvanceTrigger::UserAction);
    }

    /// Move back one question. The revisited question gets a fresh full
    /// time budget; its previously recorded answer is kept.
    pub fn go_previous(&mut self) {
        if self.status != Status::InProgress || self.current_index == 0 {
            return;
        }
        self.current_index -= 1;
        self.reset_clock();
    }

    fn advance(&mut self, trigger: AdvanceTrigger) {
        if self.status != Status::InProgress {
            return;
        }
        log::debug!(
            "advancing from question {} ({:?})",
            self.current_index,
            trigger
        );

        let last_index = self.question_count().saturating_sub(1);
        if self.current_index < last_index {
            self.current_index += 1;
            self.reset_clock();
        } else {
            self.submit();
        }
    }

    /// Freeze the answers and send them, exactly once per try.
    fn submit(&mut self) {
        if self.status != Status::InProgress {
            return;
        }
        let Some(attempt_id) = self.attempt_id else {
            return;
        };

        self.status = Status::Submitting;
        self.timer.cancel();

        let answers = self.answers.snapshot();
        if self
            .outbox
            .send(ClientMessage::SubmitAttempt {
                attempt_id,
                answers,
            })
            .is_err()
        {
            self.fail_submit("connection to quiz service closed");
        }
    }

    /// After a failed submission, re-arm the guard and send the same frozen
    /// answer set again.
    pub fn retry_submit(&mut self) {
        if self.status != Status::Failed {
            return;
        }
        self.submit_error = None;
        self.status = Status::InProgress;
        self.submit();
    }

    /// Cancel the countdown. Called by the surrounding application when the
    /// session is torn down.
    pub fn teardown(&mut self) {
        self.timer.cancel();
    }

    fn reset_clock(&mut self) {
        let budget = self.quiz.as_ref().map(Quiz::time_budget).unwrap_or(0);
        self.remaining = budget;
        self.timer.restart(budget);
    }

    fn fail_load(&mut self, reason: impl Into<String>) {
        self.status = Status::LoadFailed;
        self.load_error = Some(reason.into());
        self.timer.cancel();
    }

    fn fail_submit(&mut self, reason: impl Into<String>) {
        self.status = Status::Failed;
        self.submit_error = Some(reason.into());
    }

    // Accessors for the surrounding application.

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn quiz_title(&self) -> Option<&str> {
        self.quiz.as_ref().map(|q| q.title.as_str())
    }

    pub fn attempt_id(&self) -> Option<Uuid> {
        self.attempt_id
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.as_ref()?.questions.get(self.current_index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn question_count(&self) -> usize {
        self.quiz.as_ref().map_or(0, |q| q.questions.len())
    }

    /// Completion fraction shown by progress bars: `(index + 1) / count`.
    pub fn progress_fraction(&self) -> f64 {
        match self.question_count() {
            0 => 0.0,
            count => (self.current_index + 1) as f64 / count as f64,
        }
    }

    /// Seconds left on the active question.
    pub fn remaining_time(&self) -> u32 {
        self.remaining
    }

    pub fn selected_answer(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn receipt(&self) -> Option<&SubmitReceipt> {
        self.receipt.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn quiz(difficulty: Difficulty, question_count: usize) -> Quiz {
        let questions = (1..=question_count)
            .map(|n| Question {
                id: format!("q{}", n),
                text: format!("Question {}?", n),
                options: vec![
                    "alpha".to_string(),
                    "beta".to_string(),
                    "gamma".to_string(),
                    "delta".to_string(),
                ],
                correct_answer: None,
            })
            .collect();
        Quiz {
            id: "sample".to_string(),
            title: "Sample Quiz".to_string(),
            difficulty,
            questions,
        }
    }

    struct Harness {
        session: AttemptSession,
        outbox: UnboundedReceiver<ClientMessage>,
    }

    /// An opened session with the quiz and attempt id already delivered,
    /// the two load requests drained from the outbox.
    fn in_progress(quiz: Quiz) -> Harness {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let (event_tx, _event_rx) = mpsc::unbounded_channel();

        let mut session = AttemptSession::open(quiz.id.clone(), out_tx, event_tx);
        assert!(matches!(
            out_rx.try_recv().unwrap(),
            ClientMessage::FetchQuiz { .. }
        ));
        assert!(matches!(
            out_rx.try_recv().unwrap(),
            ClientMessage::OpenAttempt { .. }
        ));

        session.apply(SessionEvent::Server(ServerMessage::Quiz { quiz }));
        session.apply(SessionEvent::Server(ServerMessage::AttemptOpened {
            attempt_id: Uuid::new_v4(),
        }));
        assert_eq!(session.status(), Status::InProgress);

        Harness {
            session,
            outbox: out_rx,
        }
    }

    fn sent_submissions(
        outbox: &mut UnboundedReceiver<ClientMessage>,
    ) -> Vec<std::collections::HashMap<String, String>> {
        let mut submissions = Vec::new();
        while let Ok(msg) = outbox.try_recv() {
            if let ClientMessage::SubmitAttempt { answers, .. } = msg {
                submissions.push(answers);
            }
        }
        submissions
    }

    fn ack_for(session: &AttemptSession, score: usize, total: usize) -> ServerMessage {
        ServerMessage::SubmitAck {
            attempt_id: session.attempt_id().unwrap(),
            score,
            total,
        }
    }

    #[tokio::test]
    async fn loading_completes_only_when_both_responses_arrive() {
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let mut session = AttemptSession::open("sample", out_tx, event_tx);

        assert_eq!(session.status(), Status::Loading);
        assert!(session.current_question().is_none());

        // Attempt id first, quiz second: order must not matter.
        session.apply(SessionEvent::Server(ServerMessage::AttemptOpened {
            attempt_id: Uuid::new_v4(),
        }));
        assert_eq!(session.status(), Status::Loading);

        session.apply(SessionEvent::Server(ServerMessage::Quiz {
            quiz: quiz(Difficulty::Easy, 3),
        }));
        assert_eq!(session.status(), Status::InProgress);
        assert_eq!(session.remaining_time(), 30);
        assert_eq!(session.current_index(), 0);
    }

    #[tokio::test]
    async fn unknown_quiz_is_a_terminal_load_failure() {
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let mut session = AttemptSession::open("missing", out_tx, event_tx);

        session.apply(SessionEvent::Server(ServerMessage::QuizNotFound {
            quiz_id: "missing".to_string(),
        }));
        assert_eq!(session.status(), Status::LoadFailed);
        assert!(session.load_error().unwrap().contains("missing"));

        // Terminal: a late AttemptOpened must not revive the session.
        session.apply(SessionEvent::Server(ServerMessage::AttemptOpened {
            attempt_id: Uuid::new_v4(),
        }));
        assert_eq!(session.status(), Status::LoadFailed);
    }

    #[tokio::test]
    async fn empty_quiz_is_a_load_failure() {
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let mut session = AttemptSession::open("sample", out_tx, event_tx);

        let mut empty = quiz(Difficulty::Easy, 1);
        empty.questions.clear();
        session.apply(SessionEvent::Server(ServerMessage::Quiz { quiz: empty }));
        assert_eq!(session.status(), Status::LoadFailed);
    }

    #[tokio::test]
    async fn connection_loss_while_loading_is_load_failed() {
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let mut session = AttemptSession::open("sample", out_tx, event_tx);

        session.apply(SessionEvent::ConnectionLost {
            reason: "peer reset".to_string(),
        });
        assert_eq!(session.status(), Status::LoadFailed);
    }

    #[tokio::test]
    async fn full_run_submits_every_answer_once() {
        let mut h = in_progress(quiz(Difficulty::Easy, 5));

        for n in 1..=5 {
            assert_eq!(h.session.current_question().unwrap().id, format!("q{}", n));
            h.session.record("alpha");
            h.session.go_next();
        }

        assert_eq!(h.session.status(), Status::Submitting);
        let submissions = sent_submissions(&mut h.outbox);
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].len(), 5);

        let ack = ack_for(&h.session, 5, 5);
        h.session.apply(SessionEvent::Server(ack));
        assert_eq!(h.session.status(), Status::Submitted);
        assert_eq!(h.session.receipt().unwrap().score, 5);
    }

    #[tokio::test]
    async fn expiry_on_last_question_submits_partial_answers() {
        let mut h = in_progress(quiz(Difficulty::Easy, 5));

        for _ in 0..4 {
            h.session.record("beta");
            h.session.go_next();
        }
        assert_eq!(h.session.current_index(), 4);

        // Question 5 times out with nothing recorded.
        let epoch = h.session.timer.epoch();
        h.session.apply(SessionEvent::Expired { epoch });

        assert_eq!(h.session.status(), Status::Submitting);
        let submissions = sent_submissions(&mut h.outbox);
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].len(), 4);
        assert!(!submissions[0].contains_key("q5"));
    }

    #[tokio::test]
    async fn simultaneous_expiry_and_submit_click_send_one_submission() {
        let mut h = in_progress(quiz(Difficulty::Hard, 2));
        h.session.go_next();
        assert_eq!(h.session.current_index(), 1);

        // The expiry was already queued when the participant clicked
        // submit: the click wins, the stale expiry is discarded.
        let queued_epoch = h.session.timer.epoch();
        h.session.record("gamma");
        h.session.go_next();
        h.session.apply(SessionEvent::Expired {
            epoch: queued_epoch,
        });

        assert_eq!(h.session.status(), Status::Submitting);
        assert_eq!(sent_submissions(&mut h.outbox).len(), 1);
    }

    #[tokio::test]
    async fn expiry_then_submit_click_also_sends_one_submission() {
        let mut h = in_progress(quiz(Difficulty::Hard, 2));
        h.session.go_next();

        // The expiry is observed first; the click arrives a moment later.
        let epoch = h.session.timer.epoch();
        h.session.apply(SessionEvent::Expired { epoch });
        h.session.go_next();
        h.session.go_next();

        assert_eq!(sent_submissions(&mut h.outbox).len(), 1);
    }

    #[tokio::test]
    async fn failed_submission_retries_with_the_same_snapshot() {
        let mut h = in_progress(quiz(Difficulty::Easy, 2));
        h.session.record("alpha");
        h.session.go_next();
        h.session.record("delta");
        h.session.go_next();

        h.session.apply(SessionEvent::Server(ServerMessage::SubmitRejected {
            reason: "service unavailable".to_string(),
        }));
        assert_eq!(h.session.status(), Status::Failed);
        assert_eq!(h.session.submit_error(), Some("service unavailable"));

        // The buffer is frozen while failed.
        h.session.record("tampered");

        h.session.retry_submit();
        assert_eq!(h.session.status(), Status::Submitting);

        let submissions = sent_submissions(&mut h.outbox);
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0], submissions[1]);

        let ack = ack_for(&h.session, 1, 2);
        h.session.apply(SessionEvent::Server(ack));
        assert_eq!(h.session.status(), Status::Submitted);
    }

    #[tokio::test]
    async fn connection_loss_while_submitting_allows_retry() {
        let mut h = in_progress(quiz(Difficulty::Easy, 1));
        h.session.record("alpha");
        h.session.go_next();
        assert_eq!(h.session.status(), Status::Submitting);

        h.session.apply(SessionEvent::ConnectionLost {
            reason: "broken pipe".to_string(),
        });
        assert_eq!(h.session.status(), Status::Failed);

        h.session.retry_submit();
        assert_eq!(h.session.status(), Status::Submitting);
        assert_eq!(sent_submissions(&mut h.outbox).len(), 2);
    }

    #[tokio::test]
    async fn revisit_restores_answer_and_resets_clock() {
        let mut h = in_progress(quiz(Difficulty::Easy, 3));

        h.session.record("beta");
        h.session.go_next();
        h.session.go_next();
        assert_eq!(h.session.current_index(), 2);

        // Simulate time spent on question 3, then walk back to question 1.
        let epoch = h.session.timer.epoch();
        h.session.apply(SessionEvent::Tick {
            epoch,
            remaining: 12,
        });
        assert_eq!(h.session.remaining_time(), 12);

        h.session.go_previous();
        h.session.go_previous();
        assert_eq!(h.session.current_index(), 0);
        assert_eq!(h.session.remaining_time(), 30);
        assert_eq!(h.session.selected_answer("q1"), Some("beta"));
    }

    #[tokio::test]
    async fn retreat_from_first_question_is_a_no_op() {
        let mut h = in_progress(quiz(Difficulty::Easy, 3));
        h.session.go_previous();
        assert_eq!(h.session.current_index(), 0);
        assert_eq!(h.session.status(), Status::InProgress);
    }

    #[tokio::test]
    async fn record_overwrites_previous_answer() {
        let mut h = in_progress(quiz(Difficulty::Easy, 2));
        h.session.record("alpha");
        h.session.record("beta");
        assert_eq!(h.session.selected_answer("q1"), Some("beta"));
        assert_eq!(h.session.answered_count(), 1);
    }

    #[tokio::test]
    async fn mid_quiz_expiry_advances_with_a_fresh_budget() {
        let mut h = in_progress(quiz(Difficulty::Hard, 3));

        let epoch = h.session.timer.epoch();
        h.session.apply(SessionEvent::Tick { epoch, remaining: 3 });
        h.session.apply(SessionEvent::Expired { epoch });

        assert_eq!(h.session.current_index(), 1);
        assert_eq!(h.session.remaining_time(), 15);
        assert_eq!(h.session.status(), Status::InProgress);
    }

    #[tokio::test]
    async fn stale_tick_after_navigation_is_discarded() {
        let mut h = in_progress(quiz(Difficulty::Easy, 3));

        let old_epoch = h.session.timer.epoch();
        h.session.go_next();
        assert_eq!(h.session.remaining_time(), 30);

        h.session.apply(SessionEvent::Tick {
            epoch: old_epoch,
            remaining: 4,
        });
        assert_eq!(h.session.remaining_time(), 30);

        h.session.apply(SessionEvent::Expired { epoch: old_epoch });
        assert_eq!(h.session.current_index(), 1);
        assert_eq!(h.session.status(), Status::InProgress);
    }

    #[tokio::test]
    async fn nothing_mutates_once_submitted() {
        let mut h = in_progress(quiz(Difficulty::Easy, 1));
        h.session.record("alpha");
        h.session.go_next();
        let ack = ack_for(&h.session, 1, 1);
        h.session.apply(SessionEvent::Server(ack));
        assert_eq!(h.session.status(), Status::Submitted);

        h.session.record("beta");
        h.session.go_next();
        h.session.go_previous();
        h.session.retry_submit();

        assert_eq!(h.session.status(), Status::Submitted);
        assert_eq!(h.session.current_index(), 0);
        assert_eq!(h.session.selected_answer("q1"), Some("alpha"));
        assert_eq!(sent_submissions(&mut h.outbox).len(), 1);
    }

    #[tokio::test]
    async fn progress_fraction_tracks_the_active_question() {
        let mut h = in_progress(quiz(Difficulty::Easy, 4));
        assert!((h.session.progress_fraction() - 0.25).abs() < f64::EPSILON);
        h.session.go_next();
        assert!((h.session.progress_fraction() - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn double_submit_click_sends_one_submission() {
        let mut h = in_progress(quiz(Difficulty::Easy, 1));
        h.session.go_next();
        h.session.go_next();
        assert_eq!(sent_submissions(&mut h.outbox).len(), 1);
    }
}
