//! Quiz service module.
//!
//! A headless WebSocket service that serves quiz content, opens attempts,
//! and grades submissions. This is the remote collaborator the attempt
//! session talks to; correctness and scores never leave it.

mod server;
mod state;

pub use server::run;
pub use state::{Grade, GradeError, ServerState};
