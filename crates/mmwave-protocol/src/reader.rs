//! Radar Serial Reader
//!
//! Couples a blocking byte source (normally the radar UART) with the frame
//! decoder. Read timeouts are reported as "no data" and leave any partial
//! frame in the decoder untouched.

use crate::decoder::{DecoderStats, SerialFrameDecoder};
use crate::error::RadarError;
use crate::frame::ChecksumMode;
use crate::measurement::Measurement;
use crate::DEFAULT_BAUD_RATE;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read};
use std::time::Duration;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::info;

/// Bytes requested per read call
const READ_CHUNK: usize = 64;

/// Radar channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Serial device path (e.g., "/dev/ttyTHS1" or "/dev/ttyUSB0")
    pub port: String,
    /// UART baud rate
    pub baud_rate: u32,
    /// Read timeout before a poll reports no data (milliseconds)
    pub read_timeout_ms: u64,
    /// Age after which the last reading is treated as absent (milliseconds)
    pub stale_after_ms: u64,
    /// Payload checksum form emitted by the module
    pub checksum_mode: ChecksumMode,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyTHS1".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: 1000,
            stale_after_ms: 2000,
            checksum_mode: ChecksumMode::Xor,
        }
    }
}

impl RadarConfig {
    /// Read timeout as a `Duration`
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Staleness window as a `Duration`
    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }
}

/// A blocking source of radar bytes
///
/// `read_bytes` returns `Ok(0)` when no byte arrived within the source's
/// timeout.
pub trait ByteSource {
    fn read_bytes(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;
}

impl<R: Read + ?Sized> ByteSource for R {
    fn read_bytes(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            match self.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(0)
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Outcome of one reader poll
#[derive(Debug, Clone, PartialEq)]
pub enum ReadEvent {
    /// One or more frames completed, in arrival order
    Measurements(Vec<Measurement>),
    /// Bytes arrived but no frame completed
    Pending,
    /// Nothing arrived within the read timeout
    NoData,
}

/// Reader that turns a byte source into measurements
pub struct RadarReader<S> {
    source: S,
    decoder: SerialFrameDecoder,
    buf: [u8; READ_CHUNK],
}

impl<S: ByteSource> RadarReader<S> {
    /// Wrap a byte source
    pub fn new(source: S, checksum_mode: ChecksumMode) -> Self {
        Self {
            source,
            decoder: SerialFrameDecoder::new(checksum_mode),
            buf: [0; READ_CHUNK],
        }
    }

    /// Read one chunk and decode it
    pub fn poll(&mut self) -> Result<ReadEvent, RadarError> {
        let n = self.source.read_bytes(&mut self.buf)?;
        if n == 0 {
            return Ok(ReadEvent::NoData);
        }

        let measurements = self.decoder.feed_slice(&self.buf[..n]);
        if measurements.is_empty() {
            Ok(ReadEvent::Pending)
        } else {
            Ok(ReadEvent::Measurements(measurements))
        }
    }

    /// Decoder counters
    pub fn stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    /// Release the byte source
    pub fn into_inner(self) -> S {
        self.source
    }
}

/// Open the radar UART (8N1, no flow control)
pub fn open_serial_port(config: &RadarConfig) -> Result<Box<dyn SerialPort>, RadarError> {
    info!("Opening radar serial port {} @ {} baud", config.port, config.baud_rate);

    let port = tokio_serial::new(config.port.as_str(), config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(config.read_timeout())
        .open()?;

    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::RadarFrame;
    use crate::measurement::MeasurementKind;
    use std::collections::VecDeque;
    use std::io;

    /// Replays scripted reads; `None` simulates a timeout
    struct ScriptedSource(VecDeque<Option<Vec<u8>>>);

    impl Read for ScriptedSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(Some(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(None) => Err(io::Error::new(ErrorKind::TimedOut, "timeout")),
                None => Ok(0),
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = RadarConfig::default();
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.stale_after(), Duration::from_secs(2));
        assert_eq!(config.checksum_mode, ChecksumMode::Xor);
    }

    #[test]
    fn test_timeout_keeps_partial_frame() {
        let bytes = RadarFrame::heart_rate(75.0).to_bytes(ChecksumMode::Xor);
        let script = VecDeque::from(vec![
            Some(bytes[..6].to_vec()),
            None,
            Some(bytes[6..].to_vec()),
        ]);
        let mut reader = RadarReader::new(ScriptedSource(script), ChecksumMode::Xor);

        assert_eq!(reader.poll().unwrap(), ReadEvent::Pending);
        assert_eq!(reader.poll().unwrap(), ReadEvent::NoData);
        match reader.poll().unwrap() {
            ReadEvent::Measurements(ms) => {
                assert_eq!(ms.len(), 1);
                assert_eq!(ms[0].kind, MeasurementKind::HeartRate);
                assert_eq!(ms[0].value, 75.0);
            }
            other => panic!("expected measurement, got {:?}", other),
        }
    }

    #[test]
    fn test_cursor_source() {
        let mut bytes = RadarFrame::heart_rate(61.0).to_bytes(ChecksumMode::Xor);
        bytes.extend(RadarFrame::breath_rate(12.0).to_bytes(ChecksumMode::Xor));
        let mut reader = RadarReader::new(io::Cursor::new(bytes), ChecksumMode::Xor);

        match reader.poll().unwrap() {
            ReadEvent::Measurements(ms) => assert_eq!(ms.len(), 2),
            other => panic!("expected measurements, got {:?}", other),
        }
        assert_eq!(reader.poll().unwrap(), ReadEvent::NoData);
        assert_eq!(reader.stats().frames_ok, 2);
    }

    #[test]
    fn test_io_error_surfaces() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(ErrorKind::BrokenPipe, "unplugged"))
            }
        }
        let mut reader = RadarReader::new(Broken, ChecksumMode::Xor);
        assert!(matches!(reader.poll(), Err(RadarError::Io(_))));
    }
}
