// Injectable time source
// TTL expiry and debounce deadlines read time through this trait so tests
// can advance a fake clock instead of sleeping.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Real time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests.
///
/// `Instant` cannot be constructed from scratch, so the fake anchors at
/// creation time and adds an adjustable offset.
pub struct FakeClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl FakeClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { start: Instant::now(), offset: Mutex::new(Duration::ZERO) })
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap();
        *offset += by;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap()
    }
}
