//! Vision collaborator interface
//!
//! Face landmarks, the emotion classifier and the pedal tracker run outside
//! this workspace. The fusion cycle only sees their per-frame verdicts.

use serde::{Deserialize, Serialize};

/// Label reported when no face is in view
pub const NO_FACE: &str = "No Face";

/// One frame's worth of vision verdicts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionObservation {
    pub face_detected: bool,
    pub drowsy: bool,
    pub forward_looking: bool,
    /// Classifier label, e.g. `"Happy"`
    pub emotion: String,
    /// Brake pedal travel, 0-100
    pub brake_pct: u8,
}

impl Default for VisionObservation {
    fn default() -> Self {
        Self {
            face_detected: false,
            drowsy: false,
            forward_looking: true,
            emotion: NO_FACE.to_string(),
            brake_pct: 0,
        }
    }
}

/// Source of per-cycle vision verdicts
pub trait DriverVision {
    /// Produce the verdicts for the current frame
    fn observe(&mut self) -> VisionObservation;

    /// Re-learn the driver's neutral baselines
    fn recalibrate(&mut self);
}

impl<T: DriverVision + ?Sized> DriverVision for Box<T> {
    fn observe(&mut self) -> VisionObservation {
        (**self).observe()
    }

    fn recalibrate(&mut self) {
        (**self).recalibrate()
    }
}

/// Vision stand-in for hosts without a camera pipeline
#[derive(Debug, Default)]
pub struct HeadlessVision {
    recalibrations: u32,
}

impl HeadlessVision {
    pub fn recalibrations(&self) -> u32 {
        self.recalibrations
    }
}

impl DriverVision for HeadlessVision {
    fn observe(&mut self) -> VisionObservation {
        VisionObservation::default()
    }

    fn recalibrate(&mut self) {
        self.recalibrations += 1;
    }
}

/// Expression code sent to the MCU for an emotion label
pub fn expression_code(emotion: &str) -> u8 {
    match emotion {
        "Neutral" => 0,
        "Happy" => 1,
        "Sad" => 2,
        "Angry" => 3,
        "Surprise" => 4,
        _ => 0,
    }
}
