//! Byte-at-a-time Frame Decoder
//!
//! Reassembles radar frames from an unframed byte stream. The decoder owns
//! its accumulation buffer; nothing is observable until a whole frame has
//! passed both checksums.

use crate::error::RadarError;
use crate::frame::{ChecksumMode, RadarFrame};
use crate::measurement::Measurement;
use crate::{FRAME_HEADER_SIZE, MAX_PAYLOAD_LEN, SOF_BYTE};
use std::time::Instant;
use tracing::{debug, trace};

/// Framing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Scanning for SOF
    Idle,
    /// Accumulating a frame
    Framing,
}

/// Running counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Frames that passed both checksums
    pub frames_ok: u64,
    /// Frames dropped on a header or payload checksum
    pub checksum_errors: u64,
    /// Frames abandoned because the declared length was too large
    pub oversized: u64,
    /// Valid frames with an unknown type or malformed payload
    pub ignored: u64,
}

/// Streaming decoder for the radar serial protocol
#[derive(Debug)]
pub struct SerialFrameDecoder {
    state: State,
    buffer: Vec<u8>,
    checksum_mode: ChecksumMode,
    stats: DecoderStats,
}

impl SerialFrameDecoder {
    /// Create a decoder expecting the given payload checksum form
    pub fn new(checksum_mode: ChecksumMode) -> Self {
        Self {
            state: State::Idle,
            buffer: Vec::with_capacity(FRAME_HEADER_SIZE + MAX_PAYLOAD_LEN + 1),
            checksum_mode,
            stats: DecoderStats::default(),
        }
    }

    /// Feed one byte, stamping any completed measurement with the current time
    pub fn feed(&mut self, byte: u8) -> Option<Measurement> {
        self.feed_at(byte, Instant::now())
    }

    /// Feed one byte with an explicit completion timestamp
    pub fn feed_at(&mut self, byte: u8, now: Instant) -> Option<Measurement> {
        match self.state {
            State::Idle => {
                if byte == SOF_BYTE {
                    self.buffer.clear();
                    self.buffer.push(byte);
                    self.state = State::Framing;
                }
                None
            }
            State::Framing => {
                self.buffer.push(byte);
                if self.buffer.len() < FRAME_HEADER_SIZE {
                    return None;
                }

                let len = RadarFrame::declared_len(&self.buffer);
                if len > MAX_PAYLOAD_LEN {
                    debug!("Dropping frame with declared length {}", len);
                    self.stats.oversized += 1;
                    self.reset();
                    return None;
                }

                if self.buffer.len() < FRAME_HEADER_SIZE + len + 1 {
                    return None;
                }

                let result = self.complete(now);
                self.reset();
                result
            }
        }
    }

    /// Feed a chunk and collect every measurement it completes
    pub fn feed_slice(&mut self, bytes: &[u8]) -> Vec<Measurement> {
        let now = Instant::now();
        bytes.iter().filter_map(|&b| self.feed_at(b, now)).collect()
    }

    /// Whether a partial frame is buffered
    pub fn is_framing(&self) -> bool {
        self.state == State::Framing
    }

    /// Diagnostic counters
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Drop any partial frame and return to scanning
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.buffer.clear();
    }

    fn complete(&mut self, now: Instant) -> Option<Measurement> {
        let frame = match RadarFrame::parse(&self.buffer, self.checksum_mode) {
            Ok(frame) => frame,
            Err(e @ (RadarError::HeaderChecksum { .. } | RadarError::PayloadChecksum { .. })) => {
                debug!("Dropping radar frame: {}", e);
                self.stats.checksum_errors += 1;
                return None;
            }
            Err(e) => {
                debug!("Dropping radar frame: {}", e);
                return None;
            }
        };

        self.stats.frames_ok += 1;
        let measurement = Measurement::from_frame(&frame, now);
        match &measurement {
            Some(m) => trace!("Radar {:?} = {}", m.kind, m.value),
            None => {
                trace!(
                    "Ignoring frame type {:04X} ({} byte payload)",
                    frame.frame_type,
                    frame.payload.len()
                );
                self.stats.ignored += 1;
            }
        }
        measurement
    }
}

impl Default for SerialFrameDecoder {
    fn default() -> Self {
        Self::new(ChecksumMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::xor_fold;
    use crate::measurement::MeasurementKind;
    use proptest::prelude::*;

    fn heart_frame(bpm: f32) -> Vec<u8> {
        RadarFrame::heart_rate(bpm).to_bytes(ChecksumMode::Xor)
    }

    fn feed_all(decoder: &mut SerialFrameDecoder, bytes: &[u8]) -> Vec<Measurement> {
        bytes.iter().filter_map(|&b| decoder.feed(b)).collect()
    }

    #[test]
    fn test_literal_heart_rate_frame() {
        let payload = 72.5f32.to_le_bytes();
        let mut bytes = vec![0x01, 0x00, 0x00, 0x00, 0x04, 0x0A, 0x15, 0xE5];
        bytes.extend_from_slice(&payload);
        bytes.push(xor_fold(&payload));

        let mut decoder = SerialFrameDecoder::default();
        let out = feed_all(&mut decoder, &bytes);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, MeasurementKind::HeartRate);
        assert_eq!(out[0].value, 72.5);
        assert!(!decoder.is_framing());
    }

    #[test]
    fn test_nothing_emitted_before_last_byte() {
        let bytes = heart_frame(64.0);
        let mut decoder = SerialFrameDecoder::default();
        for &b in &bytes[..bytes.len() - 1] {
            assert!(decoder.feed(b).is_none());
        }
        assert!(decoder.feed(bytes[bytes.len() - 1]).is_some());
    }

    #[test]
    fn test_leading_noise_skipped() {
        let mut bytes = vec![0xFF, 0x00, 0x7E, 0x55];
        bytes.extend(heart_frame(80.0));
        let mut decoder = SerialFrameDecoder::default();
        let out = feed_all(&mut decoder, &bytes);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, 80.0);
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut bytes = heart_frame(70.0);
        bytes.extend(RadarFrame::breath_rate(15.0).to_bytes(ChecksumMode::Xor));
        let mut decoder = SerialFrameDecoder::default();
        let out = decoder.feed_slice(&bytes);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].kind, MeasurementKind::BreathRate);
        assert_eq!(decoder.stats().frames_ok, 2);
    }

    #[test]
    fn test_oversized_length_aborts() {
        // Declared length 0x00C9 = 201
        let bytes = [0x01, 0x00, 0x00, 0x00, 0xC9, 0x0A, 0x15, 0x00];
        let mut decoder = SerialFrameDecoder::default();
        assert!(feed_all(&mut decoder, &bytes).is_empty());
        assert!(!decoder.is_framing());
        assert_eq!(decoder.stats().oversized, 1);

        // Decoder recovers on the next frame
        let out = feed_all(&mut decoder, &heart_frame(90.0));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_max_length_frame_accepted() {
        let frame = RadarFrame::new(0x0F01, vec![0xAB; MAX_PAYLOAD_LEN]);
        let mut decoder = SerialFrameDecoder::default();
        assert!(decoder.feed_slice(&frame.to_bytes(ChecksumMode::Xor)).is_empty());
        assert_eq!(decoder.stats().frames_ok, 1);
        assert_eq!(decoder.stats().ignored, 1);
    }

    #[test]
    fn test_sync_byte_inside_frame_does_not_restart() {
        // Payload containing 0x01 must not be taken as a new SOF
        let frame = RadarFrame::new(crate::frame_type::HEART_RATE, vec![0x01, 0x01, 0x01, 0x01]);
        let mut decoder = SerialFrameDecoder::default();
        let out = decoder.feed_slice(&frame.to_bytes(ChecksumMode::Xor));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, f32::from_le_bytes([0x01; 4]));
    }

    #[test]
    fn test_inverted_payload_checksum_mode() {
        let bytes = RadarFrame::heart_rate(66.0).to_bytes(ChecksumMode::InvertedXor);
        let mut plain = SerialFrameDecoder::new(ChecksumMode::Xor);
        assert!(plain.feed_slice(&bytes).is_empty());
        assert_eq!(plain.stats().checksum_errors, 1);

        let mut inverted = SerialFrameDecoder::new(ChecksumMode::InvertedXor);
        assert_eq!(inverted.feed_slice(&bytes).len(), 1);
    }

    proptest! {
        #[test]
        fn prop_chunked_frame_emits_once(
            bpm in 30.0f32..220.0,
            id in any::<u16>(),
            splits in proptest::collection::vec(1usize..13, 0..6),
        ) {
            let bytes = RadarFrame::heart_rate(bpm).with_id(id).to_bytes(ChecksumMode::Xor);
            let mut decoder = SerialFrameDecoder::default();
            let mut out = Vec::new();
            let mut rest: &[u8] = &bytes;
            for split in splits {
                let at = split.min(rest.len());
                let (chunk, tail) = rest.split_at(at);
                out.extend(decoder.feed_slice(chunk));
                rest = tail;
            }
            out.extend(decoder.feed_slice(rest));

            prop_assert_eq!(out.len(), 1);
            prop_assert_eq!(out[0].value, bpm);
        }

        #[test]
        fn prop_single_bit_flip_rejected(
            bpm in 30.0f32..220.0,
            byte_idx in 1usize..13,
            bit in 0u8..8,
        ) {
            // Flips in the SOF byte only desynchronise; every other position
            // must fail a checksum or the length guard.
            let mut bytes = RadarFrame::heart_rate(bpm).to_bytes(ChecksumMode::Xor);
            bytes[byte_idx] ^= 1 << bit;
            let mut decoder = SerialFrameDecoder::default();
            let out = decoder.feed_slice(&bytes);
            prop_assert!(out.is_empty());
        }
    }
}
