//! Radar Frame Layout and Checksums
//!
//! ```text
//! +-----+--------+--------+--------+-------+---------------+--------+
//! | SOF | ID(2)  | LEN(2) | TYPE(2)| HCKSUM| PAYLOAD (LEN) | PCKSUM |
//! +-----+--------+--------+--------+-------+---------------+--------+
//! ```
//!
//! Multi-byte header fields are big-endian.

use crate::error::RadarError;
use crate::{FRAME_HEADER_SIZE, MAX_PAYLOAD_LEN, SOF_BYTE};
use serde::{Deserialize, Serialize};

/// XOR of every byte in `data`
pub fn xor_fold(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Header checksum: inverted XOR-fold of the first seven header bytes
pub fn header_checksum(header: &[u8]) -> u8 {
    !xor_fold(header)
}

/// How the trailing payload checksum is formed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumMode {
    /// Plain XOR-fold of the payload
    #[default]
    Xor,
    /// Inverted XOR-fold, same rule as the header
    InvertedXor,
}

impl ChecksumMode {
    /// Compute the payload checksum under this mode
    pub fn payload_checksum(&self, payload: &[u8]) -> u8 {
        match self {
            ChecksumMode::Xor => xor_fold(payload),
            ChecksumMode::InvertedXor => !xor_fold(payload),
        }
    }
}

/// A single validated radar frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadarFrame {
    /// Frame ID (the two bytes after SOF)
    pub id: u16,
    /// Type code, see [`crate::frame_type`]
    pub frame_type: u16,
    /// Raw payload bytes
    pub payload: Vec<u8>,
}

impl RadarFrame {
    /// Create a frame with ID zero
    pub fn new(frame_type: u16, payload: Vec<u8>) -> Self {
        Self {
            id: 0,
            frame_type,
            payload,
        }
    }

    /// Heart-rate frame carrying `bpm`
    pub fn heart_rate(bpm: f32) -> Self {
        Self::new(crate::frame_type::HEART_RATE, bpm.to_le_bytes().to_vec())
    }

    /// Breath-rate frame carrying `rpm`
    pub fn breath_rate(rpm: f32) -> Self {
        Self::new(crate::frame_type::BREATH_RATE, rpm.to_le_bytes().to_vec())
    }

    /// Set the frame ID
    pub fn with_id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    /// Total encoded length in bytes
    pub fn encoded_len(&self) -> usize {
        FRAME_HEADER_SIZE + self.payload.len() + 1
    }

    /// Serialize to wire bytes
    pub fn to_bytes(&self, mode: ChecksumMode) -> Vec<u8> {
        let len = self.payload.len() as u16;
        let mut out = Vec::with_capacity(self.encoded_len());
        out.push(SOF_BYTE);
        out.extend_from_slice(&self.id.to_be_bytes());
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&self.frame_type.to_be_bytes());
        out.push(header_checksum(&out));
        out.extend_from_slice(&self.payload);
        out.push(mode.payload_checksum(&self.payload));
        out
    }

    /// Declared payload length of a buffered header
    ///
    /// `buf` must hold at least [`FRAME_HEADER_SIZE`] bytes.
    pub(crate) fn declared_len(buf: &[u8]) -> usize {
        u16::from_be_bytes([buf[3], buf[4]]) as usize
    }

    /// Validate and split a complete frame buffer
    pub fn parse(buf: &[u8], mode: ChecksumMode) -> Result<Self, RadarError> {
        if buf.len() < FRAME_HEADER_SIZE + 1 {
            return Err(RadarError::Truncated {
                expected: FRAME_HEADER_SIZE + 1,
                actual: buf.len(),
            });
        }

        let len = Self::declared_len(buf);
        if len > MAX_PAYLOAD_LEN {
            return Err(RadarError::PayloadTooLong(len));
        }
        let total = FRAME_HEADER_SIZE + len + 1;
        if buf.len() < total {
            return Err(RadarError::Truncated {
                expected: total,
                actual: buf.len(),
            });
        }

        let header = &buf[..FRAME_HEADER_SIZE];
        let expected = header_checksum(&header[..FRAME_HEADER_SIZE - 1]);
        if expected != header[FRAME_HEADER_SIZE - 1] {
            return Err(RadarError::HeaderChecksum {
                expected,
                actual: header[FRAME_HEADER_SIZE - 1],
            });
        }

        let payload = &buf[FRAME_HEADER_SIZE..total - 1];
        let expected = mode.payload_checksum(payload);
        if expected != buf[total - 1] {
            return Err(RadarError::PayloadChecksum {
                expected,
                actual: buf[total - 1],
            });
        }

        Ok(Self {
            id: u16::from_be_bytes([buf[1], buf[2]]),
            frame_type: u16::from_be_bytes([buf[5], buf[6]]),
            payload: payload.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_type;

    #[test]
    fn test_header_checksum_is_inverted_xor() {
        // 01 ^ 00 ^ 00 ^ 00 ^ 04 ^ 0A ^ 15 = 0x1A, inverted = 0xE5
        let header = [0x01, 0x00, 0x00, 0x00, 0x04, 0x0A, 0x15];
        assert_eq!(header_checksum(&header), 0xE5);
    }

    #[test]
    fn test_heart_rate_frame_layout() {
        let bytes = RadarFrame::heart_rate(72.5).to_bytes(ChecksumMode::Xor);
        assert_eq!(bytes.len(), 13);
        assert_eq!(&bytes[..8], &[0x01, 0x00, 0x00, 0x00, 0x04, 0x0A, 0x15, 0xE5]);
        assert_eq!(&bytes[8..12], &72.5f32.to_le_bytes());
        assert_eq!(bytes[12], xor_fold(&72.5f32.to_le_bytes()));
    }

    #[test]
    fn test_parse_valid_frame() {
        let frame = RadarFrame::breath_rate(14.0).with_id(0x1234);
        let parsed = RadarFrame::parse(&frame.to_bytes(ChecksumMode::Xor), ChecksumMode::Xor).unwrap();
        assert_eq!(parsed, frame);
        assert_eq!(parsed.frame_type, frame_type::BREATH_RATE);
    }

    #[test]
    fn test_parse_rejects_wrong_checksum_mode() {
        let bytes = RadarFrame::heart_rate(60.0).to_bytes(ChecksumMode::InvertedXor);
        assert!(matches!(
            RadarFrame::parse(&bytes, ChecksumMode::Xor),
            Err(RadarError::PayloadChecksum { .. })
        ));
        assert!(RadarFrame::parse(&bytes, ChecksumMode::InvertedXor).is_ok());
    }

    #[test]
    fn test_parse_rejects_corrupt_header() {
        let mut bytes = RadarFrame::heart_rate(60.0).to_bytes(ChecksumMode::Xor);
        bytes[2] ^= 0x40;
        assert!(matches!(
            RadarFrame::parse(&bytes, ChecksumMode::Xor),
            Err(RadarError::HeaderChecksum { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_truncated() {
        let bytes = RadarFrame::heart_rate(60.0).to_bytes(ChecksumMode::Xor);
        assert!(matches!(
            RadarFrame::parse(&bytes[..10], ChecksumMode::Xor),
            Err(RadarError::Truncated { expected: 13, actual: 10 })
        ));
    }
}
