//! Sensor Hub
//!
//! Owns one background thread per physical channel (mmWave radar, foot-rest
//! FSR). Each worker owns its device handle and publishes the latest reading
//! through a `tokio::sync::watch` channel, so readers always see a whole
//! snapshot and never wait on a device.
//!
//! A device that cannot be opened degrades its channel to
//! [`ChannelStatus::Unavailable`] instead of failing the hub.

mod hub;
mod snapshot;
mod worker;

pub use hub::{ads1115_opener, serial_radar_opener, FsrOpener, RadarOpener, SensorHub};
pub use snapshot::{FsrSnapshot, RadarSnapshot};

use fsr_monitor::FsrConfig;
use mmwave_protocol::RadarConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Hub error types
#[derive(Error, Debug)]
pub enum HubError {
    #[error("Failed to spawn {name} worker: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Lifecycle of one acquisition channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    /// Not started, or stopped
    Stopped,
    /// Worker running with an open device
    Running,
    /// Disabled, or the device failed to open
    Unavailable,
}

/// Hub configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Start the radar worker
    pub radar_enabled: bool,
    pub radar: RadarConfig,
    /// Start the FSR worker
    pub fsr_enabled: bool,
    pub fsr: FsrConfig,
    /// Longest wait for a worker to exit on stop (milliseconds)
    pub join_timeout_ms: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            radar_enabled: true,
            radar: RadarConfig::default(),
            fsr_enabled: true,
            fsr: FsrConfig::default(),
            join_timeout_ms: 1000,
        }
    }
}

impl HubConfig {
    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }
}
