//! Bit-Packed Frame Codec
//!
//! Outbound word (big-endian on the wire):
//!
//! ```text
//!  63      56 55      48 47      40 39      32 31                 0
//! +----------+----------+----------+----------+--------------------+
//! |  pedal % | expr code| heart bpm| resp rpm |   zero padding     |
//! +----------+----------+----------+----------+--------------------+
//! ```
//!
//! Inbound word:
//!
//! ```text
//!  63          48 47          32 31    24 23    16 15  10 9   4 3 2 1 0
//! +--------------+--------------+--------+--------+------+-----+-+-+-+-+
//! |  rate_inst   |   rate_avg   |bpm_long|bpm_shrt|rr_lng|rr_sh|P|C|-|M|
//! +--------------+--------------+--------+--------+------+-----+-+-+-+-+
//! ```

use crate::error::SpiError;
use crate::FRAME_LEN;
use serde::{Deserialize, Serialize};

/// Outbound driver-state summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxFrame {
    pub pedal_pct: u8,
    pub expression_code: u8,
    pub heart_rate: u8,
    pub resp_rate: u8,
}

impl TxFrame {
    /// Build from wider integers, keeping only the low 8 bits of each
    pub fn masked(pedal_pct: i64, expression_code: i64, heart_rate: i64, resp_rate: i64) -> Self {
        Self {
            pedal_pct: (pedal_pct & 0xFF) as u8,
            expression_code: (expression_code & 0xFF) as u8,
            heart_rate: (heart_rate & 0xFF) as u8,
            resp_rate: (resp_rate & 0xFF) as u8,
        }
    }

    /// Recover the fields from the upper half of a 64-bit transmit word
    pub fn from_word(word: u64) -> Self {
        Self {
            pedal_pct: (word >> 56) as u8,
            expression_code: (word >> 48) as u8,
            heart_rate: (word >> 40) as u8,
            resp_rate: (word >> 32) as u8,
        }
    }

    /// The 32-bit packed field word
    pub fn packed(&self) -> u32 {
        (self.pedal_pct as u32) << 24
            | (self.expression_code as u32) << 16
            | (self.heart_rate as u32) << 8
            | self.resp_rate as u32
    }

    /// Serialize to the 8-byte transmit frame
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        ((self.packed() as u64) << 32).to_be_bytes()
    }
}

/// Pack the four outbound fields into an 8-byte frame
pub fn encode(pedal_pct: u8, expression_code: u8, heart_rate: u8, resp_rate: u8) -> [u8; FRAME_LEN] {
    TxFrame {
        pedal_pct,
        expression_code,
        heart_rate,
        resp_rate,
    }
    .encode()
}

/// Inbound MCU status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RxStatus {
    /// Instantaneous rate (16 bit)
    pub rate_inst: u16,
    /// Averaged rate (16 bit)
    pub rate_avg: u16,
    /// Long-window heart-rate average
    pub bpm_long_avg: u8,
    /// Short-window heart-rate average
    pub bpm_short_avg: u8,
    /// Long-window respiration average (6 bit)
    pub rr_long_avg: u8,
    /// Short-window respiration average (6 bit)
    pub rr_short_avg: u8,
    /// Pedal operation anomaly
    pub pedal_flag: bool,
    /// Abnormal biosignal condition
    pub cond_flag: bool,
    /// Pedal misuse detected
    pub pedal_misuse: bool,
    /// Reconstituted 64-bit word
    pub raw: u64,
    /// `raw` as `0x` + 16 upper-case hex digits
    pub raw_hex: String,
}

impl RxStatus {
    /// Split a 64-bit word into its fields
    pub fn from_word(w: u64) -> Self {
        Self {
            rate_inst: ((w >> 48) & 0xFFFF) as u16,
            rate_avg: ((w >> 32) & 0xFFFF) as u16,
            bpm_long_avg: ((w >> 24) & 0xFF) as u8,
            bpm_short_avg: ((w >> 16) & 0xFF) as u8,
            rr_long_avg: ((w >> 10) & 0x3F) as u8,
            rr_short_avg: ((w >> 4) & 0x3F) as u8,
            pedal_flag: (w >> 3) & 0x1 == 1,
            cond_flag: (w >> 2) & 0x1 == 1,
            pedal_misuse: w & 0x1 == 1,
            raw: w,
            raw_hex: format!("0x{:016X}", w),
        }
    }

    /// Interpret the upper half of the word as an outbound frame
    pub fn tx_fields(&self) -> TxFrame {
        TxFrame::from_word(self.raw)
    }
}

impl Default for RxStatus {
    /// The all-zero word, as reported when no MCU answered
    fn default() -> Self {
        Self::from_word(0)
    }
}

/// Decode an 8-byte receive buffer
pub fn decode(rx: &[u8]) -> Result<RxStatus, SpiError> {
    let bytes: [u8; FRAME_LEN] = rx.try_into().map_err(|_| SpiError::FrameLength {
        expected: FRAME_LEN,
        actual: rx.len(),
    })?;
    Ok(RxStatus::from_word(u64::from_be_bytes(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_layout() {
        assert_eq!(encode(50, 1, 72, 16), [50, 1, 72, 16, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_decode_scenario() {
        let status = decode(&encode(50, 1, 72, 16)).unwrap();
        let tx = status.tx_fields();
        assert_eq!(tx.pedal_pct, 50);
        assert_eq!(tx.expression_code, 1);
        assert_eq!(tx.heart_rate, 72);
        assert_eq!(tx.resp_rate, 16);
        assert_eq!(status.raw_hex, "0x3201481000000000");
        assert!(!status.pedal_flag && !status.cond_flag && !status.pedal_misuse);
    }

    #[test]
    fn test_decode_field_table() {
        // rate_inst=0x1234 rate_avg=0x5678 bpm_long=0x9A bpm_short=0xBC
        // rr_long=0x2A rr_short=0x15 pedal=1 cond=0 misuse=1
        let w: u64 = 0x1234 << 48
            | 0x5678 << 32
            | 0x9A << 24
            | 0xBC << 16
            | 0x2A << 10
            | 0x15 << 4
            | 1 << 3
            | 1;
        let status = decode(&w.to_be_bytes()).unwrap();
        assert_eq!(status.rate_inst, 0x1234);
        assert_eq!(status.rate_avg, 0x5678);
        assert_eq!(status.bpm_long_avg, 0x9A);
        assert_eq!(status.bpm_short_avg, 0xBC);
        assert_eq!(status.rr_long_avg, 0x2A);
        assert_eq!(status.rr_short_avg, 0x15);
        assert!(status.pedal_flag);
        assert!(!status.cond_flag);
        assert!(status.pedal_misuse);
        assert_eq!(status.raw, w);
    }

    #[test]
    fn test_decode_all_ones() {
        let status = decode(&[0xFF; 8]).unwrap();
        assert_eq!(status.rr_long_avg, 0x3F);
        assert_eq!(status.rr_short_avg, 0x3F);
        assert!(status.pedal_flag && status.cond_flag && status.pedal_misuse);
        assert_eq!(status.raw_hex, "0xFFFFFFFFFFFFFFFF");
    }

    #[test]
    fn test_decode_wrong_length() {
        for len in [0usize, 7, 9] {
            let buf = vec![0u8; len];
            assert!(matches!(
                decode(&buf),
                Err(SpiError::FrameLength { expected: 8, actual }) if actual == len
            ));
        }
    }

    #[test]
    fn test_default_is_zero_word() {
        let status = RxStatus::default();
        assert_eq!(status, RxStatus::from_word(0));
        assert_eq!(status.raw_hex, "0x0000000000000000");
    }

    #[test]
    fn test_masked_wraps() {
        let tx = TxFrame::masked(300, -1, 256, 72);
        assert_eq!(tx.pedal_pct, 44);
        assert_eq!(tx.expression_code, 255);
        assert_eq!(tx.heart_rate, 0);
        assert_eq!(tx.resp_rate, 72);
    }

    proptest! {
        #[test]
        fn prop_upper_half_roundtrip(p in any::<u8>(), e in any::<u8>(), h in any::<u8>(), r in any::<u8>()) {
            let frame = encode(p, e, h, r);
            prop_assert_eq!(&frame[4..], &[0u8; 4]);
            let tx = decode(&frame).unwrap().tx_fields();
            prop_assert_eq!(tx, TxFrame { pedal_pct: p, expression_code: e, heart_rate: h, resp_rate: r });
        }
    }
}
