//! Protocol messages for client-server communication.
//!
//! All messages are serialized as JSON over WebSocket. The client never
//! receives answer keys; grading happens exclusively on the server.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Quiz;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Request the content of a quiz by id.
    FetchQuiz { quiz_id: String },

    /// Open a new attempt at a quiz; the server issues the attempt id.
    OpenAttempt { quiz_id: String },

    /// Submit the frozen answer set for an attempt.
    SubmitAttempt {
        attempt_id: Uuid,
        answers: HashMap<String, String>,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Quiz content, with answer keys stripped.
    Quiz { quiz: Quiz },

    /// The requested quiz id is unknown.
    QuizNotFound { quiz_id: String },

    /// A new attempt has been opened.
    AttemptOpened { attempt_id: Uuid },

    /// The submission was accepted and graded.
    SubmitAck {
        attempt_id: Uuid,
        score: usize,
        total: usize,
    },

    /// The submission was rejected (unknown attempt, malformed payload).
    SubmitRejected { reason: String },
}

/// Default server port.
pub const DEFAULT_PORT: u16 = 8712;
