//! Register-addressed bus access used by the sensor drivers.
//!
//! A transfer is modelled the way the device sees it: a register pointer
//! write, optionally carrying one data byte, followed by zero or more reads
//! that start at that pointer.
pub mod embedded;
pub mod i2c;

pub use embedded::{EmbeddedHalBus, HalBusError};
pub use i2c::I2CBus;

pub trait RegisterBus {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Bind the transport to the 7-bit device address.
    fn select(&mut self, address: u8) -> Result<(), Self::Error>;

    /// Write a register pointer, with an optional data byte.
    ///
    /// `end_of_burst` marks the final write of a configuration sequence; the
    /// transport decides what that means for its stop condition.
    fn write(&mut self, register: u8, value: Option<u8>, end_of_burst: bool) -> Result<(), Self::Error>;

    /// Read `len` bytes from the current register pointer.
    ///
    /// `None` means the transfer failed. An empty vector is a valid, if
    /// useless, answer.
    fn read(&mut self, len: usize) -> Option<Vec<u8>>;
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    type Error = T::Error;

    fn select(&mut self, address: u8) -> Result<(), Self::Error> {
        (**self).select(address)
    }

    fn write(&mut self, register: u8, value: Option<u8>, end_of_burst: bool) -> Result<(), Self::Error> {
        (**self).write(register, value, end_of_burst)
    }

    fn read(&mut self, len: usize) -> Option<Vec<u8>> {
        (**self).read(len)
    }
}
