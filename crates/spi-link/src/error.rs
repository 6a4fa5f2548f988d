//! SPI Error Types

use thiserror::Error;

/// Errors on the SPI link
#[derive(Debug, Error)]
pub enum SpiError {
    /// Device node could not be opened
    #[error("Failed to open SPI device {device}: {source}")]
    Open {
        device: String,
        #[source]
        source: std::io::Error,
    },

    /// Mode, speed or word-size setup rejected by the driver
    #[error("SPI configuration failed ({setting}): {source}")]
    Configure {
        setting: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Transaction ioctl failed
    #[error("SPI transfer failed: {0}")]
    Transfer(#[source] std::io::Error),

    /// Received buffer is not exactly one frame
    #[error("Framing error: expected {expected} bytes, got {actual}")]
    FrameLength { expected: usize, actual: usize },
}
