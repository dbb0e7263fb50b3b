//! Board-specific constants and configuration for a Raspberry Pi weather node
//!
//! This board carries two BME280 breakouts on I2C bus 1:
//! - 0x76 indoor sensor (SDO low)
//! - 0x77 outdoor sensor (SDO high)

/// Default configuration directory (embedded at compile time)
pub const CONFIG_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config");

/// Embedded TOML configurations
pub const BUSES_TOML: &str = include_str!("../config/buses.toml");
pub const SENSORS_TOML: &str = include_str!("../config/sensors.toml");

/// Board name
pub const BOARD_NAME: &str = "RaspberryPi-BME280";

/// Get the configuration path (allow override via CONFIG_PATH env var)
pub fn get_config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| CONFIG_DIR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bme280_sensorhub::config::{parse_bus_config, parse_sensor_config};
    use bme280_sensorhub::DeviceMode;

    #[test]
    fn test_embedded_config_is_valid() {
        let buses = parse_bus_config(BUSES_TOML).unwrap();
        let sensors = parse_sensor_config(SENSORS_TOML).unwrap();

        assert_eq!(sensors.sensors.len(), 2);
        for s in sensors.sensors.iter() {
            assert!(buses.find(&s.bus).is_some(), "sensor {} on unknown bus {}", s.id, s.bus);
        }
        assert_eq!(sensors.sensors[1].mode, DeviceMode::Forced);
    }
}
