use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Quiz;

/// Error loading the quiz bank.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("quiz bank contains no quizzes")]
    EmptyBank,

    #[error("quiz {quiz_id:?} has no questions")]
    EmptyQuiz { quiz_id: String },

    #[error("duplicate quiz id {quiz_id:?}")]
    DuplicateId { quiz_id: String },
}

/// Load and validate a quiz bank from a JSON file.
///
/// The file holds a JSON array of quizzes, answer keys included; the keys
/// stay on the server and are stripped whenever a quiz goes on the wire.
pub fn load_quiz_bank<P: AsRef<Path>>(path: P) -> Result<Vec<Quiz>, LoadError> {
    let path = path.as_ref();

    let json = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let quizzes: Vec<Quiz> = serde_json::from_str(&json).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_bank(quizzes)
}

fn validate_bank(quizzes: Vec<Quiz>) -> Result<Vec<Quiz>, LoadError> {
    if quizzes.is_empty() {
        return Err(LoadError::EmptyBank);
    }

    let mut seen = HashSet::new();
    for quiz in &quizzes {
        if quiz.questions.is_empty() {
            return Err(LoadError::EmptyQuiz {
                quiz_id: quiz.id.clone(),
            });
        }
        if !seen.insert(quiz.id.clone()) {
            return Err(LoadError::DuplicateId {
                quiz_id: quiz.id.clone(),
            });
        }
    }

    Ok(quizzes)
}
