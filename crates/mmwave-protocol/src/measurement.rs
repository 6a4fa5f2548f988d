//! Vital-Sign Measurements and Payload Decoding

use crate::frame::RadarFrame;
use crate::frame_type;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Kind of reading carried by a radar frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum MeasurementKind {
    /// Heart rate in beats per minute (0x0A15)
    HeartRate = frame_type::HEART_RATE,
    /// Breath rate in breaths per minute (0x0A14)
    BreathRate = frame_type::BREATH_RATE,
}

impl MeasurementKind {
    /// Map a frame type code to a measurement kind
    pub fn from_type_code(code: u16) -> Option<Self> {
        match code {
            frame_type::HEART_RATE => Some(Self::HeartRate),
            frame_type::BREATH_RATE => Some(Self::BreathRate),
            _ => None,
        }
    }

    /// Frame type code for this kind
    pub fn type_code(&self) -> u16 {
        *self as u16
    }
}

/// A decoded reading from the radar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub kind: MeasurementKind,
    pub value: f32,
    /// When the frame completed on the host side
    pub observed_at: Instant,
}

impl Measurement {
    /// Decode a validated frame
    ///
    /// Returns `None` for unknown type codes and for payloads that are not
    /// exactly one little-endian `f32`.
    pub fn from_frame(frame: &RadarFrame, observed_at: Instant) -> Option<Self> {
        let kind = MeasurementKind::from_type_code(frame.frame_type)?;
        let bytes: [u8; 4] = frame.payload.as_slice().try_into().ok()?;
        Some(Self {
            kind,
            value: f32::from_le_bytes(bytes),
            observed_at,
        })
    }
}
