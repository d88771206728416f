use std::time::Instant;

/// Source of "now" for the monitor loop.
///
/// Injected so presence timing can be driven deterministically in tests.
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
