//! Data model shared by the client, the server, and the session engine.

mod quiz;

pub use quiz::{Difficulty, Question, Quiz};
