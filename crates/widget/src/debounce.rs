// Cancellable debounce deadline

use std::time::{Duration, Instant};

/// One-shot deadline that re-arming replaces. Polled rather than
/// timer-driven: the owner asks `fire_if_due` from its event loop.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or re-arm) the deadline at `now + delay`. Any pending deadline
    /// is dropped, so only the last arm in a burst fires.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once the armed deadline has passed. Firing disarms.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
