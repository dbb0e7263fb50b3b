//! Bosch BME280 combined humidity, pressure and temperature sensor.
//!
//! Construction runs the whole bring-up sequence: chip id probe, soft reset,
//! NVM copy wait and calibration load. A `Bme280` value therefore always holds
//! valid calibration for the device it talks to.

pub mod calibration;
pub mod compensation;
pub mod registers;

#[cfg(test)]
pub(crate) mod testing;

use tracing::{debug, trace};

use self::calibration::Calibration;
use self::compensation::{compensate, RawSample};
use self::registers::*;
use super::SensorDriver;
use crate::bus::RegisterBus;
use crate::errors::{SensorError, SensorResult};
use crate::hal::Clock;
use crate::messages::Reading;

pub use self::registers::{Address, DeviceMode, Filter, Oversampling, Settings, Standby};

const PROBE_ATTEMPTS: u32 = 5;
const PROBE_DELAY_MS: u32 = 1;
const RESET_POLL_ATTEMPTS: u32 = 5;
const RESET_POLL_DELAY_MS: u32 = 2;

pub struct Bme280<B, C> {
    bus: B,
    clock: C,
    address: Address,
    calibration: Calibration,
}

impl<B: RegisterBus, C: Clock> Bme280<B, C> {
    /// Bring up the sensor at `address`.
    ///
    /// Fails with `DeviceNotFound` if the chip id never matches and with
    /// `ResetTimeout` if the NVM copy does not finish after the soft reset.
    pub fn new(mut bus: B, clock: C, address: Address) -> SensorResult<Self> {
        bus.select(address.into())
            .map_err(|e| SensorError::BusSelect { address: address.into(), source: Box::new(e) })?;

        let mut dev = Self {
            bus,
            clock,
            address,
            calibration: Calibration::default(),
        };
        dev.probe()?;
        dev.reset()?;
        Ok(dev)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Hand the bus and clock back to the caller
    pub fn release(self) -> (B, C) {
        (self.bus, self.clock)
    }

    /// Soft reset, wait for the NVM copy, reload calibration.
    pub fn reset(&mut self) -> SensorResult<()> {
        self.write_register(RESET_ADDR, SOFT_RESET_COMMAND, true)?;
        debug!("[bme280@{:#04x}] soft reset issued", u8::from(self.address));
        self.await_reset_complete()?;
        self.load_calibration()
    }

    pub fn chip_id(&mut self) -> SensorResult<u8> {
        let [id] = self.read_block::<1>(CHIP_ID_ADDR)?;
        Ok(id)
    }

    fn probe(&mut self) -> SensorResult<()> {
        let mut last_id = 0;
        for attempt in 1..=PROBE_ATTEMPTS {
            last_id = self.chip_id()?;
            if last_id == CHIP_ID {
                debug!("[bme280@{:#04x}] identified on attempt {}", u8::from(self.address), attempt);
                return Ok(());
            }
            trace!("[bme280@{:#04x}] chip id {:#04x} on attempt {}", u8::from(self.address), last_id, attempt);
            self.clock.delay_ms(PROBE_DELAY_MS);
        }
        Err(SensorError::DeviceNotFound {
            address: self.address.into(),
            attempts: PROBE_ATTEMPTS,
            last_id,
        })
    }

    fn await_reset_complete(&mut self) -> SensorResult<()> {
        for attempt in 1..=RESET_POLL_ATTEMPTS {
            self.clock.delay_ms(RESET_POLL_DELAY_MS);
            let [status] = self.read_block::<1>(STATUS_ADDR)?;
            if status & STATUS_IM_UPDATE == 0 {
                debug!("[bme280@{:#04x}] reset complete after {} polls", u8::from(self.address), attempt);
                return Ok(());
            }
        }
        Err(SensorError::ResetTimeout {
            address: self.address.into(),
            attempts: RESET_POLL_ATTEMPTS,
        })
    }

    fn load_calibration(&mut self) -> SensorResult<()> {
        let tp = self.read_block::<CALIB_TP_LEN>(CALIB_TP_ADDR)?;
        let h = self.read_block::<CALIB_H_LEN>(CALIB_H_ADDR)?;
        self.calibration = Calibration::parse(&tp, &h);
        debug!("[bme280@{:#04x}] calibration loaded: {:?}", u8::from(self.address), self.calibration);
        Ok(())
    }

    /// Point at `register` and read `len` bytes.
    pub fn read_register(&mut self, register: u8, len: usize) -> SensorResult<Vec<u8>> {
        self.bus
            .write(register, None, false)
            .map_err(|e| SensorError::BusWrite { register, source: Box::new(e) })?;
        self.bus.read(len).ok_or(SensorError::RegisterReadError { register })
    }

    /// Single-byte register write. `end_of_burst` is passed through to the bus.
    pub fn write_register(&mut self, register: u8, value: u8, end_of_burst: bool) -> SensorResult<()> {
        trace!("[bme280@{:#04x}] reg {:#04x} <- {:#04x}", u8::from(self.address), register, value);
        self.bus
            .write(register, Some(value), end_of_burst)
            .map_err(|e| SensorError::BusWrite { register, source: Box::new(e) })
    }

    fn read_block<const N: usize>(&mut self, register: u8) -> SensorResult<[u8; N]> {
        let bytes = self.read_register(register, N)?;
        let actual = bytes.len();
        bytes
            .try_into()
            .map_err(|_| SensorError::ShortRead { register, expected: N, actual })
    }

    /// Current power mode, read from the device
    pub fn mode(&mut self) -> SensorResult<DeviceMode> {
        let [ctrl_meas] = self.read_block::<1>(CTRL_MEAS_ADDR)?;
        Ok(DeviceMode::from_bits(ctrl_meas))
    }

    /// Enter `target`, passing through sleep first unless already asleep.
    pub fn set_mode(&mut self, target: DeviceMode) -> SensorResult<()> {
        if self.mode()? != DeviceMode::Sleep {
            self.write_mode(DeviceMode::Sleep)?;
        }
        self.write_mode(target)
    }

    // Read-modify-write so the oversampling bits in ctrl_meas survive.
    fn write_mode(&mut self, mode: DeviceMode) -> SensorResult<()> {
        let [ctrl_meas] = self.read_block::<1>(CTRL_MEAS_ADDR)?;
        let ctrl_meas = (ctrl_meas & !MODE_MASK) | mode.bits();
        self.write_register(CTRL_MEAS_ADDR, ctrl_meas, true)
    }

    /// Apply oversampling, filter and standby settings.
    ///
    /// Leaves the device in sleep mode; call `set_mode` afterwards.
    pub fn configure(&mut self, settings: &Settings) -> SensorResult<()> {
        if self.mode()? != DeviceMode::Sleep {
            self.write_register(CTRL_MEAS_ADDR, DeviceMode::Sleep.bits(), true)?;
        }
        // ctrl_hum only takes effect after the following ctrl_meas write
        self.write_register(CTRL_HUM_ADDR, settings.ctrl_hum(), false)?;
        self.write_register(CTRL_MEAS_ADDR, settings.ctrl_meas(), false)?;
        self.write_register(CONFIG_ADDR, settings.config(), true)?;
        debug!("[bme280@{:#04x}] configured {:?}", u8::from(self.address), settings);
        Ok(())
    }

    /// Read back the settings currently held by the control registers
    pub fn settings(&mut self) -> SensorResult<Settings> {
        let [ctrl_hum] = self.read_block::<1>(CTRL_HUM_ADDR)?;
        let [ctrl_meas, config] = self.read_block::<2>(CTRL_MEAS_ADDR)?;
        Settings::from_registers(ctrl_hum, ctrl_meas, config)
    }

    /// True while a conversion is running
    pub fn is_measuring(&mut self) -> SensorResult<bool> {
        let [status] = self.read_block::<1>(STATUS_ADDR)?;
        Ok(status & STATUS_MEASURING != 0)
    }

    /// Burst-read the data registers and compensate them.
    pub fn update(&mut self) -> SensorResult<Reading> {
        let burst = self.read_block::<DATA_LEN>(DATA_ADDR)?;
        let raw = RawSample::from_burst(&burst);
        trace!("[bme280@{:#04x}] raw {:?}", u8::from(self.address), raw);
        Ok(compensate(&self.calibration, &raw))
    }
}

/// A configured BME280 as seen by the registry
pub struct Bme280Sensor<B, C> {
    id: String,
    bus_id: String,
    device: Bme280<B, C>,
}

impl<B: RegisterBus, C: Clock> Bme280Sensor<B, C> {
    /// Bring up, configure and start the device.
    pub fn new(
        id: String,
        bus_id: String,
        bus: B,
        clock: C,
        address: Address,
        settings: &Settings,
        mode: DeviceMode,
    ) -> SensorResult<Self> {
        let mut device = Bme280::new(bus, clock, address)?;
        device.configure(settings)?;
        device.set_mode(mode)?;
        Ok(Self { id, bus_id, device })
    }

    pub fn device(&mut self) -> &mut Bme280<B, C> {
        &mut self.device
    }
}

impl<B, C> SensorDriver for Bme280Sensor<B, C>
where
    B: RegisterBus + Send,
    C: Clock + Send,
{
    fn read(&mut self) -> SensorResult<Reading> {
        self.device.update()
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn bus(&self) -> &str {
        &self.bus_id
    }
}
