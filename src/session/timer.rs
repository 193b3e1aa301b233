//! Per-question countdown timer.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::SessionEvent;

/// A cancellable one-second countdown for the active question.
///
/// Each `start` spawns a task that sends one [`SessionEvent::Tick`] per
/// second and a single [`SessionEvent::Expired`] when the budget runs out.
/// Every event carries the epoch the countdown was started under; `cancel`
/// bumps the epoch as well as aborting the task, so a tick that was already
/// sitting in the event queue when the countdown was cancelled is discarded
/// by the epoch check on the receiving side. At most one countdown task is
/// live at a time.
#[derive(Debug)]
pub struct Countdown {
    events: mpsc::UnboundedSender<SessionEvent>,
    epoch: u64,
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn new(events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            events,
            epoch: 0,
            handle: None,
        }
    }

    /// The epoch of the most recent `start`. Events carrying any other
    /// epoch are stale.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Begin counting down from `budget` seconds.
    pub fn start(&mut self, budget: u32) {
        self.cancel();

        let epoch = self.epoch;
        let events = self.events.clone();

        self.handle = Some(tokio::spawn(async move {
            let mut remaining = budget;
            while remaining > 0 {
                tokio::time::sleep(Duration::from_secs(1)).await;
                remaining -= 1;
                if events.send(SessionEvent::Tick { epoch, remaining }).is_err() {
                    return;
                }
            }
            let _ = events.send(SessionEvent::Expired { epoch });
        }));
    }

    /// Stop ticking and invalidate anything already emitted. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.epoch += 1;
    }

    /// `cancel` followed by `start`: a fresh full budget for the question
    /// now becoming active.
    pub fn restart(&mut self, budget: u32) {
        self.start(budget);
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
