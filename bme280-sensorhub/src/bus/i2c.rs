#[cfg(all(target_os = "linux", feature = "linux-hal"))]
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
#[cfg(all(target_os = "linux", feature = "linux-hal"))]
use i2cdev::core::I2CDevice;
#[cfg(all(target_os = "linux", feature = "linux-hal"))]
use tracing::{trace, warn};

use super::RegisterBus;

/// I2C bus error type - platform specific
#[cfg(all(target_os = "linux", feature = "linux-hal"))]
pub type I2CError = LinuxI2CError;

#[cfg(not(all(target_os = "linux", feature = "linux-hal")))]
#[derive(Debug)]
pub struct I2CError(String);

#[cfg(not(all(target_os = "linux", feature = "linux-hal")))]
impl std::fmt::Display for I2CError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "I2C not supported on this platform: {}", self.0)
    }
}

#[cfg(not(all(target_os = "linux", feature = "linux-hal")))]
impl std::error::Error for I2CError {}

/// Linux `/dev/i2c-*` character device
#[cfg(all(target_os = "linux", feature = "linux-hal"))]
pub struct I2CBus {
    device: LinuxI2CDevice,
    path: String,
}

#[cfg(not(all(target_os = "linux", feature = "linux-hal")))]
pub struct I2CBus {
    _phantom: std::marker::PhantomData<()>,
}

#[cfg(all(target_os = "linux", feature = "linux-hal"))]
impl I2CBus {
    pub fn new(path: &str) -> Result<Self, I2CError> {
        let device = LinuxI2CDevice::new(path, 0)?;
        Ok(Self { device, path: path.to_string() })
    }
}

#[cfg(all(target_os = "linux", feature = "linux-hal"))]
impl RegisterBus for I2CBus {
    type Error = I2CError;

    fn select(&mut self, address: u8) -> Result<(), I2CError> {
        self.device.set_slave_address(address as u16)
    }

    // i2c-dev ends every write() with a stop, so the burst flag only shows up in traces.
    fn write(&mut self, register: u8, value: Option<u8>, end_of_burst: bool) -> Result<(), I2CError> {
        trace!("[i2c] {} write reg={:#04x} value={:?} end={}", self.path, register, value, end_of_burst);
        match value {
            Some(byte) => self.device.write(&[register, byte]),
            None => self.device.write(&[register]),
        }
    }

    fn read(&mut self, len: usize) -> Option<Vec<u8>> {
        let mut buf = vec![0u8; len];
        match self.device.read(&mut buf) {
            Ok(()) => {
                trace!("[i2c] {} read {:02x?}", self.path, buf);
                Some(buf)
            }
            Err(e) => {
                warn!("[i2c] {} read of {} bytes failed: {}", self.path, len, e);
                None
            }
        }
    }
}

#[cfg(not(all(target_os = "linux", feature = "linux-hal")))]
impl I2CBus {
    pub fn new(_path: &str) -> Result<Self, I2CError> {
        Err(I2CError("I2C device nodes need Linux and the linux-hal feature. Use EmbeddedHalBus elsewhere.".to_string()))
    }
}

#[cfg(not(all(target_os = "linux", feature = "linux-hal")))]
impl RegisterBus for I2CBus {
    type Error = I2CError;

    fn select(&mut self, _address: u8) -> Result<(), I2CError> {
        Err(I2CError("I2C is only supported on Linux".to_string()))
    }

    fn write(&mut self, _register: u8, _value: Option<u8>, _end_of_burst: bool) -> Result<(), I2CError> {
        Err(I2CError("I2C is only supported on Linux".to_string()))
    }

    fn read(&mut self, _len: usize) -> Option<Vec<u8>> {
        None
    }
}
