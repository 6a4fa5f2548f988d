//! Alerting System
//!
//! Turns per-cycle driver observations into duration-gated alerts. Each
//! condition (drowsiness, eyes off the road, two-footed pedal use) has a
//! timer that starts when the condition is first seen and resets on the
//! first cycle it is not. The aggregator reports how long each condition has
//! held; the policy picks at most one alert by priority.

mod aggregator;
mod calibration;
mod policy;
mod timer;

pub use aggregator::{AlertElapsed, TemporalAlertAggregator};
pub use calibration::CalibrationWindow;
pub use policy::{select_alert, AlertDecision, AlertKind, AlertThresholds};
pub use timer::AlertTimer;
