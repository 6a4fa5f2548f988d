//! mmWave Vital-Sign Radar Protocol
//!
//! This crate decodes the framed serial stream emitted by 60 GHz vital-sign
//! radar modules. Frames carry heart-rate and breath-rate readings as
//! little-endian `f32` payloads, guarded by XOR-fold checksums over the
//! header and the payload.

mod decoder;
mod error;
mod frame;
mod measurement;
mod reader;

pub use decoder::{DecoderStats, SerialFrameDecoder};
pub use error::RadarError;
pub use frame::{header_checksum, xor_fold, ChecksumMode, RadarFrame};
pub use measurement::{Measurement, MeasurementKind};
pub use reader::{open_serial_port, ByteSource, RadarConfig, RadarReader, ReadEvent};

/// Start-of-frame marker
pub const SOF_BYTE: u8 = 0x01;

/// Header length: SOF, two ID bytes, length (BE u16), type (BE u16), checksum
pub const FRAME_HEADER_SIZE: usize = 8;

/// Largest payload accepted before the decoder gives up on a frame
pub const MAX_PAYLOAD_LEN: usize = 200;

/// Default radar UART baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Frame type codes
pub mod frame_type {
    /// Breath rate, `f32` breaths per minute
    pub const BREATH_RATE: u16 = 0x0A14;
    /// Heart rate, `f32` beats per minute
    pub const HEART_RATE: u16 = 0x0A15;
}
