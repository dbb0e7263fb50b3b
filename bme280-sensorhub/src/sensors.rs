use crate::bus::RegisterBus;
use crate::config::SensorEntry;
use crate::errors::{SensorError, SensorResult};
use crate::hal::Clock;
use crate::messages::Reading;

pub mod bme280;

/// A brought-up sensor the hub can sample
pub trait SensorDriver: Send {
    /// Perform one read-compensate cycle.
    fn read(&mut self) -> SensorResult<Reading>;
    fn id(&self) -> &str;
    fn bus(&self) -> &str;
}

/// Build the driver named by `entry.driver` on an already opened bus.
///
/// Bring-up happens here, so a returned driver is ready to `read()`.
pub fn create_sensor_driver<B, C>(entry: &SensorEntry, bus: B, clock: C) -> SensorResult<Box<dyn SensorDriver>>
where
    B: RegisterBus + Send + 'static,
    C: Clock + Send + 'static,
{
    match entry.driver.as_str() {
        "bme280" => Ok(Box::new(bme280::Bme280Sensor::new(
            entry.id.clone(),
            entry.bus.clone(),
            bus,
            clock,
            bme280::Address::try_from(entry.address)?,
            &entry.settings,
            entry.mode,
        )?)),
        _ => Err(SensorError::UnsupportedDriver { driver: entry.driver.clone() }),
    }
}
