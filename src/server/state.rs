//! Server state: the quiz bank and the attempts opened against it.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use crate::models::Quiz;

/// The grade recorded for a submitted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub score: usize,
    pub total: usize,
}

/// Why a submission was not accepted.
#[derive(Debug, Error)]
pub enum GradeError {
    #[error("unknown attempt id {0}")]
    UnknownAttempt(Uuid),
}

/// One opened attempt and, once submitted, its grade.
#[derive(Debug)]
struct AttemptRecord {
    quiz_id: String,
    grade: Option<Grade>,
}

/// In-memory service state.
#[derive(Debug)]
pub struct ServerState {
    quizzes: HashMap<String, Quiz>,
    attempts: HashMap<Uuid, AttemptRecord>,
}

impl ServerState {
    pub fn new(quizzes: Vec<Quiz>) -> Self {
        Self {
            quizzes: quizzes.into_iter().map(|q| (q.id.clone(), q)).collect(),
            attempts: HashMap::new(),
        }
    }

    /// Look up a quiz by id.
    pub fn quiz(&self, quiz_id: &str) -> Option<&Quiz> {
        self.quizzes.get(quiz_id)
    }

    /// Open a new attempt at a quiz. Returns `None` for an unknown quiz id.
    pub fn open_attempt(&mut self, quiz_id: &str) -> Option<Uuid> {
        if !self.quizzes.contains_key(quiz_id) {
            return None;
        }
        let attempt_id = Uuid::new_v4();
        self.attempts.insert(
            attempt_id,
            AttemptRecord {
                quiz_id: quiz_id.to_string(),
                grade: None,
            },
        );
        Some(attempt_id)
    }

    /// Grade a submitted answer set against the stored answer key.
    ///
    /// Submitting an already-graded attempt returns the recorded grade
    /// again, so a client retrying after a lost acknowledgement converges
    /// on the same result.
    pub fn submit(
        &mut self,
        attempt_id: Uuid,
        answers: &HashMap<String, String>,
    ) -> Result<Grade, GradeError> {
        let record = self
            .attempts
            .get_mut(&attempt_id)
            .ok_or(GradeError::UnknownAttempt(attempt_id))?;

        if let Some(grade) = record.grade {
            return Ok(grade);
        }

        let quiz = self
            .quizzes
            .get(&record.quiz_id)
            .ok_or(GradeError::UnknownAttempt(attempt_id))?;

        let score = quiz
            .questions
            .iter()
            .filter(|question| {
                match (&question.correct_answer, answers.get(&question.id)) {
                    (Some(key), Some(answer)) => key == answer,
                    _ => false,
                }
            })
            .count();
        let grade = Grade {
            score,
            total: quiz.questions.len(),
        };
        record.grade = Some(grade);
        Ok(grade)
    }
}
