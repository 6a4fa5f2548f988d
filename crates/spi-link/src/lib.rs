//! Companion MCU SPI Link
//!
//! Exchanges one 8-byte frame per fusion cycle with the companion
//! microcontroller. The outbound frame carries the driver-state summary
//! (pedal %, expression code, heart and respiration rate); the inbound frame
//! carries the MCU's rate averages and anomaly flags.

mod codec;
mod error;
mod spidev;

pub use codec::{decode, encode, RxStatus, TxFrame};
pub use error::SpiError;
pub use spidev::{SpiConfig, SpidevPort};

/// Bytes per SPI transaction in each direction
pub const FRAME_LEN: usize = 8;

/// One full-frame SPI transaction
pub trait SpiTransfer {
    /// Clock out `tx` and return the bytes clocked in
    fn transfer(&mut self, tx: &[u8; FRAME_LEN]) -> Result<[u8; FRAME_LEN], SpiError>;
}

impl<T: SpiTransfer + ?Sized> SpiTransfer for Box<T> {
    fn transfer(&mut self, tx: &[u8; FRAME_LEN]) -> Result<[u8; FRAME_LEN], SpiError> {
        (**self).transfer(tx)
    }
}

/// Encode, transfer and decode in one step
pub fn exchange<T: SpiTransfer + ?Sized>(link: &mut T, frame: TxFrame) -> Result<RxStatus, SpiError> {
    let rx = link.transfer(&frame.encode())?;
    decode(&rx)
}
