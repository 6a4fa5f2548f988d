//! Threshold debouncing and release-duration tracking

use crate::adc::AnalogChannel;
use crate::FsrConfig;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Latest view of the foot rest
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BinarySensorState {
    pub pressed: bool,
    pub raw: i32,
    pub voltage: f32,
    /// Start of the current released run, cleared once the alarm fires
    #[serde(skip)]
    pub released_since: Option<Instant>,
}

/// Result of one poll
#[derive(Debug, Clone, PartialEq)]
pub struct SensorPoll {
    pub state: BinarySensorState,
    /// The released run just crossed the not-pressed duration
    pub prolonged_release: bool,
    /// Whether the ADC answered
    pub healthy: bool,
    /// Delay before the next poll
    pub next_poll_in: Duration,
}

/// Thresholded pressed/released sensor with edge tracking
pub struct DebouncedBinarySensor<C> {
    channel: C,
    threshold: i32,
    not_pressed_duration: Duration,
    check_interval: Duration,
    unavailable_interval: Duration,
    log_transitions: bool,
    was_pressed: bool,
    state: BinarySensorState,
}

impl<C: AnalogChannel> DebouncedBinarySensor<C> {
    pub fn new(channel: C, config: &FsrConfig) -> Self {
        Self {
            channel,
            threshold: config.threshold,
            not_pressed_duration: config.not_pressed_duration(),
            check_interval: config.check_interval(),
            unavailable_interval: config.unavailable_interval(),
            log_transitions: config.log_transitions,
            was_pressed: false,
            state: BinarySensorState::default(),
        }
    }

    /// Sample the channel once
    pub fn poll(&mut self, now: Instant) -> SensorPoll {
        let reading = match self.channel.read() {
            Ok(reading) => reading,
            Err(e) => {
                warn!("FSR read failed: {}", e);
                self.state.pressed = false;
                return SensorPoll {
                    state: self.state.clone(),
                    prolonged_release: false,
                    healthy: false,
                    next_poll_in: self.unavailable_interval,
                };
            }
        };

        let pressed_now = reading.raw > self.threshold;
        if pressed_now && !self.was_pressed {
            if self.log_transitions {
                debug!("FSR pressed (raw={}, V={:.3})", reading.raw, reading.voltage);
            }
            self.state.released_since = None;
        } else if !pressed_now && self.was_pressed {
            if self.log_transitions {
                debug!("FSR released (raw={}, V={:.3})", reading.raw, reading.voltage);
            }
            self.state.released_since = Some(now);
        }
        self.was_pressed = pressed_now;
        self.state.pressed = pressed_now;
        self.state.raw = reading.raw;
        self.state.voltage = reading.voltage;

        let mut prolonged_release = false;
        if let Some(since) = self.state.released_since.filter(|_| !pressed_now) {
            if now.saturating_duration_since(since) >= self.not_pressed_duration {
                warn!(
                    "FSR released for {:.1}s or longer",
                    self.not_pressed_duration.as_secs_f32()
                );
                self.state.released_since = None;
                prolonged_release = true;
            }
        }

        SensorPoll {
            state: self.state.clone(),
            prolonged_release,
            healthy: true,
            next_poll_in: self.check_interval,
        }
    }

    /// Latest state without sampling
    pub fn state(&self) -> &BinarySensorState {
        &self.state
    }
}
