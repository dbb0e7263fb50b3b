use thiserror::Error;
use crate::bus::i2c::I2CError;

/// Sensor-level error types for the BME280 SensorHub
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("I2C communication failed: {0}")]
    I2cError(#[from] I2CError),

    #[error("No BME280 found at {address:#04x} after {attempts} attempts (last chip id {last_id:#04x})")]
    DeviceNotFound { address: u8, attempts: u32, last_id: u8 },

    #[error("BME280 at {address:#04x} still copying NVM data after {attempts} status polls")]
    ResetTimeout { address: u8, attempts: u32 },

    #[error("Register {register:#04x} read returned no data")]
    RegisterReadError { register: u8 },

    #[error("Register {register:#04x} read returned {actual} bytes, expected {expected}")]
    ShortRead { register: u8, expected: usize, actual: usize },

    #[error("Selecting device {address:#04x} failed: {source}")]
    BusSelect {
        address: u8,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Register {register:#04x} write failed: {source}")]
    BusWrite {
        register: u8,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid value {value:#04x} for setting '{setting}'")]
    InvalidSetting { setting: &'static str, value: u8 },

    #[error("Unsupported sensor driver: '{driver}'")]
    UnsupportedDriver { driver: String },

    #[error("Bus '{bus}' not found or unavailable")]
    BusNotFound { bus: String },
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from '{path}': {source}")]
    LoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration format: {0}")]
    FormatError(#[from] toml::de::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Registry and initialization errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Sensor '{sensor}' registration failed: {source}")]
    RegistrationError {
        sensor: String,
        #[source]
        source: SensorError,
    },

    #[error("Invalid sensor configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Failed to create sensor driver: {0}")]
    DriverCreationError(#[source] SensorError),
}

/// Result type aliases for convenience
pub type SensorResult<T> = Result<T, SensorError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type RegistryResult<T> = Result<T, RegistryError>;
