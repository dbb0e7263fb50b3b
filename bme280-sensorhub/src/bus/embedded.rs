//! `RegisterBus` on top of any embedded-hal 1.0 I2C implementation
//!
//! This is the bridge for targets without `/dev/i2c-*` (microcontroller HALs,
//! `linux-embedded-hal`, bus-sharing wrappers from `embedded-hal-bus`).
use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use thiserror::Error;
use tracing::{trace, warn};

use super::RegisterBus;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("I2C transfer failed: {0:?}")]
pub struct HalBusError(pub ErrorKind);

pub struct EmbeddedHalBus<I> {
    i2c: I,
    address: u8,
    // Pointer write waiting to be fused with the next read
    pending_pointer: Option<u8>,
}

impl<I: I2c> EmbeddedHalBus<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c, address: 0, pending_pointer: None }
    }

    /// Give the wrapped peripheral back
    pub fn into_inner(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterBus for EmbeddedHalBus<I> {
    type Error = HalBusError;

    fn select(&mut self, address: u8) -> Result<(), HalBusError> {
        self.address = address;
        self.pending_pointer = None;
        Ok(())
    }

    fn write(&mut self, register: u8, value: Option<u8>, end_of_burst: bool) -> Result<(), HalBusError> {
        trace!("[i2c-hal] write addr={:#04x} reg={:#04x} value={:?} end={}", self.address, register, value, end_of_burst);
        match value {
            Some(byte) => {
                self.pending_pointer = None;
                self.i2c
                    .write(self.address, &[register, byte])
                    .map_err(|e| HalBusError(e.kind()))
            }
            None => {
                self.pending_pointer = Some(register);
                Ok(())
            }
        }
    }

    fn read(&mut self, len: usize) -> Option<Vec<u8>> {
        let mut buf = vec![0u8; len];
        let result = match self.pending_pointer.take() {
            Some(register) => self.i2c.write_read(self.address, &[register], &mut buf),
            None => self.i2c.read(self.address, &mut buf),
        };
        match result {
            Ok(()) => Some(buf),
            Err(e) => {
                warn!("[i2c-hal] read of {} bytes from {:#04x} failed: {:?}", len, self.address, e.kind());
                None
            }
        }
    }
}
