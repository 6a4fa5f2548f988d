//! Driver Monitoring Dashboard
//!
//! Wires the sensor hub, the companion MCU link and the vision collaborators
//! into one fusion cycle that produces an immutable [`CycleState`] per tick
//! for a renderer.

pub mod config;
pub mod cycle;
pub mod history;
pub mod logging;
pub mod render;
pub mod sim;
pub mod vision;

pub use crate::config::{ConfigError, DashboardConfig, LoggingConfig};
pub use cycle::{CycleState, FusionCycle, IndicatorLights};
pub use history::SlidingWindow;
pub use logging::init_logging;
pub use render::{LogRenderer, RenderError, Renderer};
pub use sim::SimulatedRadar;
pub use vision::{expression_code, DriverVision, HeadlessVision, VisionObservation};
