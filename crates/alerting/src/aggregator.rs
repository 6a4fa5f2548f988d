//! Temporal Alert Aggregator

use crate::policy::{AlertDecision, AlertThresholds};
use crate::timer::AlertTimer;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How long each condition has held; `None` while its timer is idle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertElapsed {
    pub drowsy: Option<Duration>,
    pub not_forward: Option<Duration>,
    pub two_footed: Option<Duration>,
}

impl AlertElapsed {
    pub fn drowsy_or_zero(&self) -> Duration {
        self.drowsy.unwrap_or_default()
    }

    pub fn not_forward_or_zero(&self) -> Duration {
        self.not_forward.unwrap_or_default()
    }

    pub fn two_footed_or_zero(&self) -> Duration {
        self.two_footed.unwrap_or_default()
    }

    pub fn drowsy_decision(&self, thresholds: &AlertThresholds) -> AlertDecision {
        decide(self.drowsy, thresholds.drowsy())
    }

    pub fn not_forward_decision(&self, thresholds: &AlertThresholds) -> AlertDecision {
        decide(self.not_forward, thresholds.not_forward())
    }

    pub fn two_footed_decision(&self, thresholds: &AlertThresholds) -> AlertDecision {
        decide(self.two_footed, thresholds.two_footed())
    }
}

fn decide(elapsed: Option<Duration>, threshold: Duration) -> AlertDecision {
    AlertDecision::classify(elapsed.is_some(), elapsed.unwrap_or_default(), threshold)
}

/// Per-condition timers advanced once per fusion cycle
#[derive(Debug, Default)]
pub struct TemporalAlertAggregator {
    drowsy: AlertTimer,
    not_forward: AlertTimer,
    two_footed: AlertTimer,
}

impl TemporalAlertAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one cycle's observations and report the held durations
    pub fn update(&mut self, now: Instant, drowsy: bool, two_footed: bool, not_forward: bool) -> AlertElapsed {
        let was_drowsy = self.drowsy.is_active();
        self.drowsy.observe(drowsy, now);
        self.not_forward.observe(not_forward, now);
        self.two_footed.observe(two_footed, now);

        if drowsy && !was_drowsy {
            debug!("Drowsiness timer started");
        }

        AlertElapsed {
            drowsy: self.drowsy.is_active().then(|| self.drowsy.elapsed(now)),
            not_forward: self.not_forward.is_active().then(|| self.not_forward.elapsed(now)),
            two_footed: self.two_footed.is_active().then(|| self.two_footed.elapsed(now)),
        }
    }

    /// Clear every timer
    pub fn recalibrate(&mut self) {
        self.drowsy.reset();
        self.not_forward.reset();
        self.two_footed.reset();
        info!("Alert timers reset");
    }

    pub fn timers(&self) -> [&AlertTimer; 3] {
        [&self.drowsy, &self.not_forward, &self.two_footed]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{select_alert, AlertKind};
    use proptest::prelude::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_drowsy_held_then_released() {
        let t0 = Instant::now();
        let mut agg = TemporalAlertAggregator::new();

        // 100 ms cycles, drowsy through 3.1 s
        let mut at_3s = None;
        for i in 0..=31u64 {
            let e = agg.update(t0 + ms(i * 100), true, false, false);
            if i == 30 {
                at_3s = Some(e);
            }
        }
        let at_3s = at_3s.unwrap();
        assert!(at_3s.drowsy_or_zero() >= Duration::from_secs(3));
        assert_eq!(select_alert(&at_3s, &AlertThresholds::default()), Some(AlertKind::Drowsiness));

        let after = agg.update(t0 + ms(3200), false, false, false);
        assert_eq!(after.drowsy, None);
        assert_eq!(after.drowsy_or_zero(), Duration::ZERO);
        assert_eq!(select_alert(&after, &AlertThresholds::default()), None);
    }

    #[test]
    fn test_recalibrate_clears_timers() {
        let t0 = Instant::now();
        let mut agg = TemporalAlertAggregator::new();
        agg.update(t0, true, true, true);
        agg.update(t0 + Duration::from_secs(10), true, true, true);

        agg.recalibrate();
        assert!(agg.timers().iter().all(|t| !t.is_active()));

        let e = agg.update(t0 + Duration::from_secs(11), true, true, true);
        assert_eq!(e.drowsy, Some(Duration::ZERO));
        assert_eq!(e.not_forward, Some(Duration::ZERO));
        assert_eq!(e.two_footed, Some(Duration::ZERO));
    }

    #[test]
    fn test_two_footed_needs_five_seconds() {
        let t0 = Instant::now();
        let mut agg = TemporalAlertAggregator::new();
        let th = AlertThresholds::default();
        agg.update(t0, false, true, false);

        let e = agg.update(t0 + ms(4900), false, true, false);
        assert_eq!(e.two_footed_decision(&th), AlertDecision::Pending);
        let e = agg.update(t0 + ms(5000), false, true, false);
        assert_eq!(select_alert(&e, &th), Some(AlertKind::TwoFootedDriving));
    }

    #[test]
    fn test_conditions_are_independent() {
        let t0 = Instant::now();
        let mut agg = TemporalAlertAggregator::new();
        agg.update(t0, true, false, true);
        let e = agg.update(t0 + ms(500), false, false, true);
        assert_eq!(e.drowsy, None);
        assert_eq!(e.not_forward, Some(ms(500)));
    }

    proptest! {
        /// Elapsed equals time since the start of the current true run
        #[test]
        fn prop_elapsed_tracks_current_run(obs in proptest::collection::vec(any::<bool>(), 1..200)) {
            let t0 = Instant::now();
            let mut agg = TemporalAlertAggregator::new();
            let mut run_start: Option<u64> = None;

            for (i, &on) in obs.iter().enumerate() {
                let i = i as u64;
                let e = agg.update(t0 + ms(i * 33), on, false, false);
                run_start = match (on, run_start) {
                    (false, _) => None,
                    (true, None) => Some(i),
                    (true, s) => s,
                };
                let expected = run_start.map(|s| ms((i - s) * 33));
                prop_assert_eq!(e.drowsy, expected);
            }
        }
    }
}
