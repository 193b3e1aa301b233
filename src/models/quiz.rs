use serde::{Deserialize, Serialize};

/// Difficulty tier of a quiz. Determines the per-question time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Hard,
}

impl Difficulty {
    /// Seconds granted per question visit.
    pub fn time_budget(self) -> u32 {
        match self {
            Difficulty::Easy => 30,
            Difficulty::Hard => 15,
        }
    }
}

/// A single question within a quiz.
///
/// `correct_answer` is only present in the server's quiz bank; it is never
/// serialized, so the payload sent to clients carries no answer key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    /// May be empty, in which case the question is shown as a degraded
    /// display state with nothing selectable.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing)]
    pub correct_answer: Option<String>,
}

/// A quiz as served to a participant: ordered questions, immutable once
/// loaded for the lifetime of an attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Time budget for every question of this quiz, in seconds.
    pub fn time_budget(&self) -> u32 {
        self.difficulty.time_budget()
    }
}
