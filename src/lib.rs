//! # quiz-attempt
//!
//! A timed quiz attempt client and service.
//!
//! A participant takes a multi-question quiz under a per-question
//! countdown: 30 seconds per question on easy quizzes, 15 on hard ones.
//! The heart of the crate is [`session::AttemptSession`], the state machine
//! that sequences questions, reconciles user navigation against timer
//! expiry, buffers answers, and submits the frozen answer set to the quiz
//! service exactly once. The [`client`] module wraps it in a terminal UI;
//! the [`server`] module is the WebSocket service that serves quiz content,
//! opens attempts, and grades submissions (answer keys never reach the
//! client).
//!
//! ## Usage
//!
//! The session engine is driven by events and plain method calls:
//!
//! ```rust,no_run
//! use tokio::sync::mpsc;
//! use quiz_attempt::session::AttemptSession;
//!
//! # fn demo() {
//! // Requests leave through the outbox; responses and timer ticks come
//! // back in as events.
//! let (outbox_tx, _outbox_rx) = mpsc::unbounded_channel();
//! let (event_tx, _event_rx) = mpsc::unbounded_channel();
//!
//! let mut session = AttemptSession::open("rust-basics", outbox_tx, event_tx);
//! session.record("let");
//! session.go_next();
//! # }
//! ```

pub mod client;
pub mod data;
pub mod models;
pub mod protocol;
pub mod server;
pub mod session;
pub mod terminal;
