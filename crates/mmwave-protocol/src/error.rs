//! Radar Error Types

use thiserror::Error;

/// Errors that can occur while talking to the radar module
#[derive(Debug, Error)]
pub enum RadarError {
    /// Serial port could not be opened or configured
    #[error("Serial port error: {0}")]
    SerialError(String),

    /// Read from the byte source failed
    #[error("Radar read failed: {0}")]
    Io(#[from] std::io::Error),

    /// Header checksum mismatch
    #[error("Header checksum mismatch: expected {expected:02X}, got {actual:02X}")]
    HeaderChecksum { expected: u8, actual: u8 },

    /// Payload checksum mismatch
    #[error("Payload checksum mismatch: expected {expected:02X}, got {actual:02X}")]
    PayloadChecksum { expected: u8, actual: u8 },

    /// Declared payload length exceeds the protocol limit
    #[error("Declared payload length {0} exceeds limit")]
    PayloadTooLong(usize),

    /// Frame is shorter than its header claims
    #[error("Truncated frame: need {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

impl From<tokio_serial::Error> for RadarError {
    fn from(err: tokio_serial::Error) -> Self {
        RadarError::SerialError(err.to_string())
    }
}
