//! Linux spidev Transport
//!
//! Thin safe wrapper over the `/dev/spidevB.C` character device using the
//! kernel's `SPI_IOC_*` ioctls.

use crate::error::SpiError;
use crate::{SpiTransfer, FRAME_LEN};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use tracing::{debug, info};

// _IOW('k', nr, size) from <linux/spi/spidev.h>
const SPI_IOC_MAGIC: u32 = b'k' as u32;
const IOC_WRITE: u32 = 1;

const fn iow(nr: u32, size: usize) -> u32 {
    (IOC_WRITE << 30) | ((size as u32) << 16) | (SPI_IOC_MAGIC << 8) | nr
}

const SPI_IOC_WR_MODE: u32 = iow(1, 1);
const SPI_IOC_WR_BITS_PER_WORD: u32 = iow(3, 1);
const SPI_IOC_WR_MAX_SPEED_HZ: u32 = iow(4, 4);
const SPI_IOC_MESSAGE_1: u32 = iow(0, std::mem::size_of::<SpiIocTransfer>());

/// `struct spi_ioc_transfer`
#[repr(C)]
#[derive(Debug, Default)]
struct SpiIocTransfer {
    tx_buf: u64,
    rx_buf: u64,
    len: u32,
    speed_hz: u32,
    delay_usecs: u16,
    bits_per_word: u8,
    cs_change: u8,
    tx_nbits: u8,
    rx_nbits: u8,
    word_delay_usecs: u8,
    pad: u8,
}

/// SPI link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiConfig {
    /// spidev node (bus 0, chip-select 0 by default)
    pub device: String,
    /// SPI mode bits (1 = CPOL 0, CPHA 1)
    pub mode: u8,
    /// Maximum clock in Hz
    pub max_speed_hz: u32,
    /// Bits per word
    pub bits_per_word: u8,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            device: "/dev/spidev0.0".to_string(),
            mode: 1,
            max_speed_hz: 11_000_000,
            bits_per_word: 8,
        }
    }
}

/// An open spidev device
pub struct SpidevPort {
    file: File,
    speed_hz: u32,
    bits_per_word: u8,
}

impl SpidevPort {
    /// Open and configure the device
    pub fn open(config: &SpiConfig) -> Result<Self, SpiError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|source| SpiError::Open {
                device: config.device.clone(),
                source,
            })?;

        let port = Self {
            file,
            speed_hz: config.max_speed_hz,
            bits_per_word: config.bits_per_word,
        };
        port.write_setting("mode", SPI_IOC_WR_MODE, &config.mode)?;
        port.write_setting("bits_per_word", SPI_IOC_WR_BITS_PER_WORD, &config.bits_per_word)?;
        port.write_setting("max_speed_hz", SPI_IOC_WR_MAX_SPEED_HZ, &config.max_speed_hz)?;

        info!(
            "SPI link open: device={}, mode={}, speed={} Hz",
            config.device, config.mode, config.max_speed_hz
        );
        Ok(port)
    }

    fn write_setting<T>(&self, setting: &'static str, request: u32, value: &T) -> Result<(), SpiError> {
        // SAFETY: `value` outlives the call and matches the size encoded in `request`
        let ret = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, value as *const T) };
        if ret < 0 {
            return Err(SpiError::Configure {
                setting,
                source: io::Error::last_os_error(),
            });
        }
        Ok(())
    }
}

impl SpiTransfer for SpidevPort {
    fn transfer(&mut self, tx: &[u8; FRAME_LEN]) -> Result<[u8; FRAME_LEN], SpiError> {
        let mut rx = [0u8; FRAME_LEN];
        let xfer = SpiIocTransfer {
            tx_buf: tx.as_ptr() as u64,
            rx_buf: rx.as_mut_ptr() as u64,
            len: FRAME_LEN as u32,
            speed_hz: self.speed_hz,
            bits_per_word: self.bits_per_word,
            ..Default::default()
        };

        // SAFETY: both buffers are FRAME_LEN bytes and live across the ioctl
        let ret = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                SPI_IOC_MESSAGE_1 as _,
                &xfer as *const SpiIocTransfer,
            )
        };
        if ret < 0 {
            return Err(SpiError::Transfer(io::Error::last_os_error()));
        }

        debug!("SPI tx={:02X?} rx={:02X?}", tx, rx);
        Ok(rx)
    }
}
