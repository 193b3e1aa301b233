//! Quiz bank loading for the server.

mod loader;

pub use loader::{load_quiz_bank, LoadError};
