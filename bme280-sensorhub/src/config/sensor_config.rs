use serde::Deserialize;
use std::collections::HashSet;

use crate::errors::{ConfigError, ConfigResult};
use crate::sensors::bme280::{Address, DeviceMode, Settings};

const SUPPORTED_DRIVERS: &[&str] = &["bme280"];

/// Root configuration struct expecting `[[sensor]]` TOML array format
#[derive(Debug, Deserialize)]
pub struct SensorConfig {
    #[serde(rename = "sensor")]
    pub sensors: Vec<SensorEntry>,
}

/// One sensor entry, matching each `[[sensor]]` section
#[derive(Debug, Clone, Deserialize)]
pub struct SensorEntry {
    pub id: String,
    pub driver: String,
    pub bus: String,
    /// 0x76 (SDO low) or 0x77 (SDO high)
    pub address: u8,
    #[serde(default = "default_mode")]
    pub mode: DeviceMode,
    #[serde(default)]
    pub settings: Settings,
}

fn default_mode() -> DeviceMode {
    DeviceMode::Normal
}

impl SensorConfig {
    /// Reject configurations that cannot work before any bus is opened
    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for s in self.sensors.iter() {
            if !seen.insert(s.id.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("sensor.{}.id", s.id),
                    reason: "duplicate sensor id".to_string(),
                });
            }
            if !SUPPORTED_DRIVERS.contains(&s.driver.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("sensor.{}.driver", s.id),
                    reason: format!("unsupported driver '{}'", s.driver),
                });
            }
            if let Err(e) = Address::try_from(s.address) {
                return Err(ConfigError::InvalidValue {
                    field: format!("sensor.{}.address", s.id),
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }
}

pub fn parse_sensor_config(content: &str) -> ConfigResult<SensorConfig> {
    let parsed: SensorConfig = toml::from_str(content)?;
    parsed.validate()?;
    Ok(parsed)
}

/// Loads config from TOML file
pub fn load_sensor_config(path: &str) -> ConfigResult<SensorConfig> {
    parse_sensor_config(&super::read_config_file(path)?)
}
