//! The timed attempt session engine.
//!
//! The engine is a synchronous state machine driven by discrete events:
//! server responses, countdown ticks, and user intents. Remote calls are
//! never awaited inside it; outbound requests go through an unbounded
//! channel of [`ClientMessage`]s and the responses come back as
//! [`SessionEvent`]s. Everything here runs on one task, so no state needs
//! locking.

mod answers;
mod engine;
mod timer;

pub use answers::AnswerBuffer;
pub use engine::{AttemptSession, Status, SubmitReceipt};
pub use timer::Countdown;

use crate::protocol::ServerMessage;

/// A discrete event delivered to the session's event loop.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A response from the remote quiz service.
    Server(ServerMessage),

    /// One second elapsed on the countdown started under `epoch`.
    Tick { epoch: u64, remaining: u32 },

    /// The countdown started under `epoch` reached zero.
    Expired { epoch: u64 },

    /// The transport to the quiz service dropped.
    ConnectionLost { reason: String },
}
