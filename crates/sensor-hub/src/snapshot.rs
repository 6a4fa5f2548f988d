//! Published sensor snapshots

use fsr_monitor::BinarySensorState;
use mmwave_protocol::{DecoderStats, Measurement, MeasurementKind};
use std::time::{Duration, Instant};

/// Latest radar view, replaced as a whole by the radar worker
#[derive(Debug, Clone, Default)]
pub struct RadarSnapshot {
    pub heart_rate: Option<Measurement>,
    pub breath_rate: Option<Measurement>,
    /// Time of the last checksum-valid frame, known type or not
    pub last_valid: Option<Instant>,
    pub stats: DecoderStats,
}

impl RadarSnapshot {
    pub(crate) fn record(&mut self, measurement: Measurement) {
        match measurement.kind {
            MeasurementKind::HeartRate => self.heart_rate = Some(measurement),
            MeasurementKind::BreathRate => self.breath_rate = Some(measurement),
        }
        self.touch(measurement.observed_at);
    }

    /// Mark the channel alive at `at` without a new value
    pub(crate) fn touch(&mut self, at: Instant) {
        self.last_valid = Some(self.last_valid.map_or(at, |prev| prev.max(at)));
    }

    /// Whether the channel produced a valid frame within `stale_after` of `now`
    pub fn is_fresh(&self, now: Instant, stale_after: Duration) -> bool {
        self.last_valid
            .map(|t| now.saturating_duration_since(t) <= stale_after)
            .unwrap_or(false)
    }

    /// Value of `kind` if the channel is fresh
    pub fn value_at(&self, kind: MeasurementKind, now: Instant, stale_after: Duration) -> Option<f32> {
        if !self.is_fresh(now, stale_after) {
            return None;
        }
        let m = match kind {
            MeasurementKind::HeartRate => self.heart_rate,
            MeasurementKind::BreathRate => self.breath_rate,
        };
        m.map(|m| m.value)
    }
}

/// Latest foot-rest view, replaced as a whole by the FSR worker
#[derive(Debug, Clone, Default)]
pub struct FsrSnapshot {
    pub state: BinarySensorState,
    /// Whether the last poll reached the ADC
    pub healthy: bool,
    /// Prolonged-release signals since the worker started
    pub prolonged_releases: u64,
}
