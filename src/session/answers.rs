//! The answer buffer: question id to the participant's current selection.

use std::collections::HashMap;

/// Answers recorded so far, keyed by question id.
///
/// The buffer itself is plain storage; the session engine enforces that it
/// is only written while the attempt is in progress. A question the
/// participant never answered is simply absent, and stays absent in the
/// submitted snapshot.
#[derive(Debug, Clone, Default)]
pub struct AnswerBuffer {
    entries: HashMap<String, String>,
}

impl AnswerBuffer {
    /// Store or overwrite the answer for a question.
    pub fn record(&mut self, question_id: &str, answer: impl Into<String>) {
        self.entries.insert(question_id.to_string(), answer.into());
    }

    /// The currently recorded answer for a question, if any.
    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.entries.get(question_id).map(String::as_str)
    }

    /// Number of questions with a recorded answer.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// An immutable copy of the buffer, taken at the moment submission
    /// begins.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries.clone()
    }
}
