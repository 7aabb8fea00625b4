use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Time source for ack deadlines and the settle pause between writes.
///
/// The chip's timings are short (tens of milliseconds), so tests swap
/// in [`MockClock`] to run them without waiting.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall-clock time and real sleeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Deterministic clock for tests.
///
/// Every `now()` advances time by a fixed tick, so a poll loop that
/// checks its deadline once per iteration always terminates. `sleep()`
/// advances by the full requested duration without blocking. Clones
/// share the same timeline, letting a test move time forward on a
/// clock it has already handed to the driver.
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<Instant>>,
    tick: Duration,
}

impl MockClock {
    pub fn new() -> Self {
        Self::with_tick(Duration::from_millis(1))
    }

    pub fn with_tick(tick: Duration) -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
            tick,
        }
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        let mut current = self.current.lock().unwrap();
        let now = *current;
        *current += self.tick;
        now
    }

    fn sleep(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap();
        *current += duration;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}
