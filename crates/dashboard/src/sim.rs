//! Synthetic radar byte stream for bench setups without the module attached

use mmwave_protocol::{ChecksumMode, RadarFrame};
use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};
use std::time::{Duration, Instant};

/// Longest a read blocks before reporting a timeout
const MAX_BLOCK: Duration = Duration::from_millis(50);

/// Emits alternating heart-rate and breath-rate frames on a fixed period
pub struct SimulatedRadar {
    mode: ChecksumMode,
    period: Duration,
    started: Instant,
    next_at: Instant,
    heart_next: bool,
    pending: VecDeque<u8>,
}

impl SimulatedRadar {
    pub fn new(mode: ChecksumMode, period: Duration) -> Self {
        let now = Instant::now();
        Self {
            mode,
            period,
            started: now,
            next_at: now,
            heart_next: true,
            pending: VecDeque::new(),
        }
    }

    fn emit(&mut self, now: Instant) {
        let t = now.saturating_duration_since(self.started).as_secs_f32();
        let frame = if self.heart_next {
            RadarFrame::heart_rate(72.0 + 6.0 * (t * 0.2).sin())
        } else {
            RadarFrame::breath_rate(15.0 + 2.0 * (t * 0.1).sin())
        };
        self.heart_next = !self.heart_next;
        self.pending.extend(frame.to_bytes(self.mode));
        self.next_at += self.period;
    }
}

impl Read for SimulatedRadar {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            let now = Instant::now();
            if now < self.next_at {
                std::thread::sleep((self.next_at - now).min(MAX_BLOCK));
            }
            let now = Instant::now();
            if now < self.next_at {
                return Err(io::Error::new(ErrorKind::TimedOut, "no frame due"));
            }
            self.emit(now);
        }

        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmwave_protocol::{MeasurementKind, RadarReader, ReadEvent};

    #[test]
    fn test_stream_decodes() {
        let sim = SimulatedRadar::new(ChecksumMode::InvertedXor, Duration::from_millis(1));
        let mut reader = RadarReader::new(sim, ChecksumMode::InvertedXor);

        let mut kinds = Vec::new();
        while kinds.len() < 2 {
            if let ReadEvent::Measurements(ms) = reader.poll().unwrap() {
                kinds.extend(ms.into_iter().map(|m| m.kind));
            }
        }
        assert_eq!(kinds[0], MeasurementKind::HeartRate);
        assert_eq!(kinds[1], MeasurementKind::BreathRate);
        assert_eq!(reader.stats().checksum_errors, 0);
    }
}
