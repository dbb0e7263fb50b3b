use serde::Deserialize;

use crate::errors::{ConfigError, ConfigResult};

/// Root structure for loading `[[bus]]` style TOML config
#[derive(Debug, Deserialize)]
pub struct BusConfig {
    #[serde(rename = "bus")]
    pub buses: Vec<BusEntry>,
}

/// One bus entry. Only `type = "i2c"` is understood.
#[derive(Debug, Deserialize)]
pub struct BusEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub r#type: String, // 'type' is a reserved word in Rust, use raw identifier
    pub path: String,
}

impl BusConfig {
    pub fn find(&self, id: &str) -> Option<&BusEntry> {
        self.buses.iter().find(|b| b.id == id)
    }
}

pub fn parse_bus_config(content: &str) -> ConfigResult<BusConfig> {
    let parsed: BusConfig = toml::from_str(content)?;
    for b in parsed.buses.iter() {
        if b.r#type != "i2c" {
            return Err(ConfigError::InvalidValue {
                field: format!("bus.{}.type", b.id),
                reason: format!("unsupported bus type '{}'", b.r#type),
            });
        }
    }
    Ok(parsed)
}

/// Load bus config file
pub fn load_bus_config(path: &str) -> ConfigResult<BusConfig> {
    parse_bus_config(&super::read_config_file(path)?)
}
