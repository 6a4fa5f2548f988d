use std::time::{Duration, Instant};

/// Tracks how long a condition has held without interruption
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertTimer {
    active_since: Option<Instant>,
}

impl AlertTimer {
    /// Record one observation of the condition
    ///
    /// A true observation starts the timer if it is idle; a false one clears it.
    pub fn observe(&mut self, active: bool, now: Instant) {
        if !active {
            self.active_since = None;
        } else if self.active_since.is_none() {
            self.active_since = Some(now);
        }
    }

    pub fn reset(&mut self) {
        self.active_since = None;
    }

    pub fn active_since(&self) -> Option<Instant> {
        self.active_since
    }

    pub fn is_active(&self) -> bool {
        self.active_since.is_some()
    }

    /// Time held as of `now`, zero while idle
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.active_since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or(Duration::ZERO)
    }
}
