use std::time::{Duration, Instant};
use tracing::info;

/// Countdown started by a recalibrate request
#[derive(Debug, Clone)]
pub struct CalibrationWindow {
    duration: Duration,
    started_at: Option<Instant>,
}

impl Default for CalibrationWindow {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

impl CalibrationWindow {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started_at: None,
        }
    }

    /// Start or restart the countdown
    pub fn start(&mut self, now: Instant) {
        info!("Calibration started ({:.1}s)", self.duration.as_secs_f32());
        self.started_at = Some(now);
    }

    /// Remaining time, or `None` once the window has closed
    pub fn remaining(&mut self, now: Instant) -> Option<Duration> {
        let started = self.started_at?;
        let elapsed = now.saturating_duration_since(started);
        if elapsed >= self.duration {
            self.started_at = None;
            info!("Calibration complete");
            return None;
        }
        Some(self.duration - elapsed)
    }

    pub fn is_running(&mut self, now: Instant) -> bool {
        self.remaining(now).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown() {
        let t0 = Instant::now();
        let mut window = CalibrationWindow::default();
        assert_eq!(window.remaining(t0), None);

        window.start(t0);
        assert_eq!(window.remaining(t0 + Duration::from_secs(1)), Some(Duration::from_secs(2)));
        assert!(window.is_running(t0 + Duration::from_millis(2999)));
        assert!(!window.is_running(t0 + Duration::from_secs(3)));
        assert_eq!(window.remaining(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_restart_extends() {
        let t0 = Instant::now();
        let mut window = CalibrationWindow::new(Duration::from_secs(3));
        window.start(t0);
        window.start(t0 + Duration::from_secs(2));
        assert!(window.is_running(t0 + Duration::from_secs(4)));
    }
}
