//! Foot-Rest Pressure Monitor
//!
//! Reads a force-sensitive resistor on the driver's foot rest through an
//! ADS1115 ADC and turns the raw counts into a debounced pressed/released
//! state. A foot that leaves the rest for too long raises a one-shot
//! prolonged-release signal.

mod adc;
mod debounce;

pub use adc::{Ads1115, AnalogChannel, AnalogReading};
pub use debounce::{BinarySensorState, DebouncedBinarySensor, SensorPoll};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// FSR error types
#[derive(Error, Debug)]
pub enum FsrError {
    #[error("Failed to open ADC on {device}: {source}")]
    Open {
        device: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to select I2C address {0:#04X}")]
    Address(u8),

    #[error("ADC read failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("ADC conversion did not complete")]
    ConversionTimeout,

    #[error("ADC not available")]
    Unavailable,
}

/// FSR channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FsrConfig {
    /// I2C bus device path
    pub device: String,
    /// ADS1115 I2C address (default: 0x48)
    pub address: u8,
    /// Raw count above which the rest counts as pressed
    pub threshold: i32,
    /// Poll interval while the ADC answers (milliseconds)
    pub check_interval_ms: u64,
    /// Poll interval after a failed read (milliseconds)
    pub unavailable_interval_ms: u64,
    /// Released time that triggers the prolonged-release signal (milliseconds)
    pub not_pressed_duration_ms: u64,
    /// Log every pressed/released transition
    pub log_transitions: bool,
}

impl Default for FsrConfig {
    fn default() -> Self {
        Self {
            device: "/dev/i2c-1".to_string(),
            address: 0x48,
            threshold: 2000,
            check_interval_ms: 50,
            unavailable_interval_ms: 500,
            not_pressed_duration_ms: 5000,
            log_transitions: false,
        }
    }
}

impl FsrConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn unavailable_interval(&self) -> Duration {
        Duration::from_millis(self.unavailable_interval_ms)
    }

    pub fn not_pressed_duration(&self) -> Duration {
        Duration::from_millis(self.not_pressed_duration_ms)
    }
}
