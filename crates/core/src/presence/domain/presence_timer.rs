use std::time::{Duration, Instant};

/// Per-cycle presence classification.
///
/// `Locked` is terminal: once entered, the monitor stops and no further
/// frames are classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresenceState {
    Present,
    Absent,
    Locked,
}

impl std::fmt::Display for PresenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresenceState::Present => write!(f, "present"),
            PresenceState::Absent => write!(f, "absent"),
            PresenceState::Locked => write!(f, "locked"),
        }
    }
}

/// Tracks when a face was last seen and derives the lock decision.
///
/// `last_seen` never moves backwards and is never ahead of the `now`
/// values passed in by the caller.
#[derive(Clone, Debug)]
pub struct PresenceTimer {
    last_seen: Instant,
}

impl PresenceTimer {
    pub fn new(start: Instant) -> Self {
        Self { last_seen: start }
    }

    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    pub fn record_detection(&mut self, now: Instant) {
        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    pub fn elapsed_since(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_seen)
    }

    /// Strictly greater: sitting exactly on the threshold does not lock.
    pub fn should_lock(&self, now: Instant, threshold: Duration) -> bool {
        self.elapsed_since(now) > threshold
    }

    /// Whole seconds left before locking, rounded up and floored at zero.
    pub fn countdown_seconds(&self, now: Instant, threshold: Duration) -> u64 {
        let remaining = threshold.saturating_sub(self.elapsed_since(now));
        remaining.as_secs_f64().ceil() as u64
    }
}
