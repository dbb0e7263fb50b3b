use crate::bus::{I2CBus, RegisterBus};
use crate::config::{BusConfig, BusEntry, SensorConfig};
use crate::errors::{RegistryError, RegistryResult, SensorError, SensorResult};
use crate::hal::{Clock, StdClock};
use crate::sensors::{create_sensor_driver, SensorDriver};
use tracing::info;

/// Open one `/dev/i2c-*` handle per sensor and bring every sensor up.
pub fn init_all(sensor_config: &SensorConfig, bus_config: &BusConfig) -> RegistryResult<Vec<Box<dyn SensorDriver>>> {
    init_all_with(sensor_config, bus_config, |b| Ok(I2CBus::new(&b.path)?), || StdClock)
}

/// Registry core with the bus opener and clock factory injected
pub fn init_all_with<B, C, F, K>(
    sensor_config: &SensorConfig,
    bus_config: &BusConfig,
    mut open_bus: F,
    mut make_clock: K,
) -> RegistryResult<Vec<Box<dyn SensorDriver>>>
where
    B: RegisterBus + Send + 'static,
    C: Clock + Send + 'static,
    F: FnMut(&BusEntry) -> SensorResult<B>,
    K: FnMut() -> C,
{
    sensor_config.validate()?;

    let mut sensors: Vec<Box<dyn SensorDriver>> = Vec::new();
    info!("[registry] initializing {} sensors...", sensor_config.sensors.len());
    for s in sensor_config.sensors.iter() {
        let bus_entry = bus_config
            .find(&s.bus)
            .ok_or_else(|| RegistryError::DriverCreationError(SensorError::BusNotFound { bus: s.bus.clone() }))?;
        let bus = open_bus(bus_entry).map_err(RegistryError::DriverCreationError)?;

        info!(
            "[registry] registering sensor: id={} driver={} bus={} address={:#04x}",
            s.id, s.driver, bus_entry.path, s.address
        );
        let sensor = create_sensor_driver(s, bus, make_clock()).map_err(|e| RegistryError::RegistrationError {
            sensor: s.id.clone(),
            source: e,
        })?;
        sensors.push(sensor);
    }

    Ok(sensors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_bus_config, parse_sensor_config};
    use crate::errors::ConfigError;
    use crate::sensors::bme280::registers::{CHIP_ID_ADDR, CTRL_MEAS_ADDR};
    use crate::sensors::bme280::testing::FakeBus;

    const BUSES: &str = r#"
        [[bus]]
        id = "i2c1"
        type = "i2c"
        path = "/dev/i2c-1"
    "#;

    const SENSORS: &str = r#"
        [[sensor]]
        id = "indoor"
        driver = "bme280"
        bus = "i2c1"
        address = 0x76

        [[sensor]]
        id = "outdoor"
        driver = "bme280"
        bus = "i2c1"
        address = 0x77
        mode = "sleep"
    "#;

    #[test]
    fn test_brings_up_every_sensor() {
        let buses = parse_bus_config(BUSES).unwrap();
        let sensors = parse_sensor_config(SENSORS).unwrap();
        let fakes = vec![FakeBus::new(), FakeBus::new()];
        let mut handed_out = fakes.clone().into_iter();
        let mut clocks = fakes.iter().map(|f| f.clock()).collect::<Vec<_>>().into_iter();

        let mut drivers = init_all_with(
            &sensors,
            &buses,
            |_| Ok(handed_out.next().unwrap()),
            || clocks.next().unwrap(),
        )
        .unwrap();

        assert_eq!(drivers.len(), 2);
        assert_eq!(drivers[0].id(), "indoor");
        assert_eq!(drivers[1].bus(), "i2c1");
        // Default mode is normal, "outdoor" asked to stay asleep
        assert_eq!(fakes[0].state().registers[CTRL_MEAS_ADDR as usize] & 0b11, 0b11);
        assert_eq!(fakes[1].state().registers[CTRL_MEAS_ADDR as usize] & 0b11, 0b00);

        let reading = drivers[0].read().unwrap();
        assert!(reading.pressure > 1000.0 && reading.pressure < 1010.0);
    }

    #[test]
    fn test_unknown_bus() {
        let buses = parse_bus_config(BUSES).unwrap();
        let sensors = parse_sensor_config(
            r#"
            [[sensor]]
            id = "attic"
            driver = "bme280"
            bus = "i2c7"
            address = 0x76
            "#,
        )
        .unwrap();

        let err = init_all_with(&sensors, &buses, |_| Ok(FakeBus::new()), || FakeBus::new().clock())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RegistryError::DriverCreationError(SensorError::BusNotFound { ref bus }) if bus == "i2c7"
        ));
    }

    #[test]
    fn test_invalid_config_rejected_before_any_bus_opens() {
        let buses = parse_bus_config(BUSES).unwrap();
        // Deserialized directly so validation only runs inside the registry
        let sensors: SensorConfig = toml::from_str(
            r#"
            [[sensor]]
            id = "indoor"
            driver = "bme280"
            bus = "i2c1"
            address = 0x76

            [[sensor]]
            id = "indoor"
            driver = "bme280"
            bus = "i2c1"
            address = 0x77
            "#,
        )
        .unwrap();

        let mut opened = 0;
        let err = init_all_with(
            &sensors,
            &buses,
            |_| {
                opened += 1;
                Ok(FakeBus::new())
            },
            || FakeBus::new().clock(),
        )
        .err()
        .unwrap();

        assert!(matches!(err, RegistryError::InvalidConfig(ConfigError::InvalidValue { .. })));
        assert!(err.to_string().starts_with("Invalid sensor configuration"));
        assert_eq!(opened, 0);
    }

    #[test]
    fn test_missing_device_names_the_sensor() {
        let buses = parse_bus_config(BUSES).unwrap();
        let sensors = parse_sensor_config(SENSORS).unwrap();

        let err = init_all_with(
            &sensors,
            &buses,
            |_| {
                let fake = FakeBus::new();
                fake.state().registers[CHIP_ID_ADDR as usize] = 0x58;
                Ok(fake)
            },
            || FakeBus::new().clock(),
        )
        .err()
        .unwrap();

        match err {
            RegistryError::RegistrationError { sensor, source } => {
                assert_eq!(sensor, "indoor");
                assert!(matches!(source, SensorError::DeviceNotFound { address: 0x76, .. }));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
