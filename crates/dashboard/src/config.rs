//! Dashboard configuration
//!
//! Defaults, overlaid by an optional TOML file, overlaid by `DMS__`
//! environment variables (`DMS__HUB__RADAR__PORT=/dev/ttyUSB0`).

use alerting::AlertThresholds;
use sensor_hub::HubConfig;
use serde::{Deserialize, Serialize};
use spi_link::SpiConfig;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DMS";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level (`trace`, `debug`, `info`, `warn`, `error`)
    pub level: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub logging: LoggingConfig,
    pub hub: HubConfig,
    /// Feed the radar channel from a synthetic source instead of the UART
    pub simulate_radar: bool,
    pub spi_enabled: bool,
    pub spi: SpiConfig,
    pub alerts: AlertThresholds,
    /// Fusion cycle period (milliseconds)
    pub cycle_interval_ms: u64,
    /// Recalibration countdown (seconds)
    pub calibration_secs: f64,
    /// Samples kept per vital-sign history
    pub history_len: usize,
    /// Render every Nth cycle
    pub render_every: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            hub: HubConfig::default(),
            simulate_radar: false,
            spi_enabled: true,
            spi: SpiConfig::default(),
            alerts: AlertThresholds::default(),
            cycle_interval_ms: 33,
            calibration_secs: 3.0,
            history_len: 200,
            render_every: 30,
        }
    }
}

impl DashboardConfig {
    /// Load from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_interval_ms == 0 {
            return Err(ConfigError::Invalid("cycle_interval_ms must be > 0".into()));
        }
        if self.history_len == 0 {
            return Err(ConfigError::Invalid("history_len must be > 0".into()));
        }
        for (name, secs) in self
            .alerts
            .fields()
            .into_iter()
            .map(|(name, secs)| (format!("alerts.{}", name), secs))
            .chain([("calibration_secs".to_string(), self.calibration_secs)])
        {
            if Duration::try_from_secs_f64(secs).is_err() {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number of seconds, got {}",
                    name, secs
                )));
            }
        }
        Ok(())
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }

    pub fn calibration(&self) -> Duration {
        Duration::try_from_secs_f64(self.calibration_secs.max(0.0)).unwrap_or(Duration::MAX)
    }
}
