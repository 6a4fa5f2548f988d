//! ADS1115 analog input over Linux I2C

use crate::{FsrConfig, FsrError};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::io::AsRawFd;
use std::time::Duration;
use tracing::{debug, info};

/// `I2C_SLAVE` from <linux/i2c-dev.h>
const I2C_SLAVE: libc::c_ulong = 0x0703;

const REG_CONVERSION: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;

/// Single-shot, AIN0 vs GND, +/-4.096 V, 128 SPS, comparator off
const CONFIG_SINGLE_AIN0: u16 = 0x8000 // OS: start conversion
    | 0x4000 // MUX: AIN0 / GND
    | 0x0200 // PGA: +/-4.096 V
    | 0x0100 // MODE: single-shot
    | 0x0080 // DR: 128 SPS
    | 0x0003; // COMP_QUE: disabled

/// Volts per count at the +/-4.096 V range
const VOLTS_PER_COUNT: f32 = 4.096 / 32768.0;

/// Conversion-ready polls before giving up (128 SPS is ~7.8 ms)
const CONVERSION_POLLS: u32 = 10;
const CONVERSION_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// One ADC sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalogReading {
    /// Signed raw counts
    pub raw: i32,
    /// Input voltage
    pub voltage: f32,
}

/// A readable analog input channel
pub trait AnalogChannel {
    fn read(&mut self) -> Result<AnalogReading, FsrError>;
}

impl<T: AnalogChannel + ?Sized> AnalogChannel for Box<T> {
    fn read(&mut self) -> Result<AnalogReading, FsrError> {
        (**self).read()
    }
}

/// ADS1115 channel 0, single-ended
pub struct Ads1115 {
    bus: File,
    address: u8,
}

impl Ads1115 {
    /// Open the I2C bus and bind to the converter's address
    pub fn open(config: &FsrConfig) -> Result<Self, FsrError> {
        let bus = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|source| FsrError::Open {
                device: config.device.clone(),
                source,
            })?;

        // SAFETY: I2C_SLAVE takes the 7-bit address by value
        let ret = unsafe { libc::ioctl(bus.as_raw_fd(), I2C_SLAVE as _, config.address as libc::c_ulong) };
        if ret < 0 {
            return Err(FsrError::Address(config.address));
        }

        let mut adc = Self {
            bus,
            address: config.address,
        };
        // Probe once so an absent chip is reported at startup
        adc.read_register(REG_CONFIG)?;

        info!("ADS1115 ready on {} @ {:#04X}", config.device, config.address);
        Ok(adc)
    }

    fn write_register(&mut self, reg: u8, value: u16) -> Result<(), FsrError> {
        let [hi, lo] = value.to_be_bytes();
        self.bus.write_all(&[reg, hi, lo]).map_err(FsrError::Read)
    }

    fn read_register(&mut self, reg: u8) -> Result<u16, FsrError> {
        self.bus.write_all(&[reg]).map_err(FsrError::Read)?;
        let mut buf = [0u8; 2];
        self.bus.read_exact(&mut buf).map_err(FsrError::Read)?;
        Ok(u16::from_be_bytes(buf))
    }
}

impl AnalogChannel for Ads1115 {
    fn read(&mut self) -> Result<AnalogReading, FsrError> {
        self.write_register(REG_CONFIG, CONFIG_SINGLE_AIN0)?;

        let mut ready = false;
        for _ in 0..CONVERSION_POLLS {
            std::thread::sleep(CONVERSION_POLL_INTERVAL);
            if self.read_register(REG_CONFIG)? & 0x8000 != 0 {
                ready = true;
                break;
            }
        }
        if !ready {
            debug!("ADS1115 @ {:#04X} conversion timed out", self.address);
            return Err(FsrError::ConversionTimeout);
        }

        let raw = self.read_register(REG_CONVERSION)? as i16 as i32;
        Ok(AnalogReading {
            raw,
            voltage: raw as f32 * VOLTS_PER_COUNT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_word() {
        assert_eq!(CONFIG_SINGLE_AIN0, 0xC383);
    }

    #[test]
    fn test_full_scale_voltage() {
        assert!((i16::MAX as f32 * VOLTS_PER_COUNT - 4.096).abs() < 0.001);
    }

    #[test]
    fn test_open_missing_bus() {
        let config = FsrConfig {
            device: "/nonexistent/i2c-9".to_string(),
            ..Default::default()
        };
        assert!(matches!(Ads1115::open(&config), Err(FsrError::Open { .. })));
    }
}
