//! BME280 register map and typed control settings.
//!
//! Addresses and bit positions follow the Bosch BME280 datasheet (rev 1.6).

use serde::{Deserialize, Serialize};

use crate::errors::{SensorError, SensorResult};

// Register addresses
pub const CHIP_ID_ADDR: u8 = 0xD0;
pub const RESET_ADDR: u8 = 0xE0;
pub const CALIB_TP_ADDR: u8 = 0x88;
pub const CALIB_H_ADDR: u8 = 0xE1;
pub const CTRL_HUM_ADDR: u8 = 0xF2;
pub const STATUS_ADDR: u8 = 0xF3;
pub const CTRL_MEAS_ADDR: u8 = 0xF4;
pub const CONFIG_ADDR: u8 = 0xF5;
pub const DATA_ADDR: u8 = 0xF7;

// Block lengths
pub const CALIB_TP_LEN: usize = 26;
pub const CALIB_H_LEN: usize = 7;
pub const DATA_LEN: usize = 8;

pub const CHIP_ID: u8 = 0x60;
pub const SOFT_RESET_COMMAND: u8 = 0xB6;

// Status bits
pub const STATUS_IM_UPDATE: u8 = 0x01;
pub const STATUS_MEASURING: u8 = 0x08;

pub const MODE_MASK: u8 = 0x03;
pub const CTRL_HUM_MASK: u8 = 0x07;
// Low bit of the config register as written on every configure()
pub const CONFIG_INTERFACE_BIT: u8 = 0x01;

/// 7-bit I2C address, selected by the SDO pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Address {
    /// SDO tied to GND
    #[default]
    Primary,
    /// SDO tied to VDDIO
    Secondary,
}

impl From<Address> for u8 {
    fn from(address: Address) -> u8 {
        match address {
            Address::Primary => 0x76,
            Address::Secondary => 0x77,
        }
    }
}

impl TryFrom<u8> for Address {
    type Error = SensorError;

    fn try_from(value: u8) -> SensorResult<Self> {
        match value {
            0x76 => Ok(Address::Primary),
            0x77 => Ok(Address::Secondary),
            _ => Err(SensorError::InvalidSetting { setting: "address", value }),
        }
    }
}

/// Power mode, bits [1:0] of ctrl_meas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceMode {
    #[default]
    Sleep,
    Forced,
    Normal,
}

impl DeviceMode {
    pub fn bits(self) -> u8 {
        match self {
            DeviceMode::Sleep => 0b00,
            DeviceMode::Forced => 0b01,
            DeviceMode::Normal => 0b11,
        }
    }

    /// Decode the two mode bits. Both `01` and `10` mean forced.
    pub fn from_bits(bits: u8) -> Self {
        match bits & MODE_MASK {
            0b00 => DeviceMode::Sleep,
            0b11 => DeviceMode::Normal,
            _ => DeviceMode::Forced,
        }
    }
}

/// Oversampling for one measurement channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Oversampling {
    /// Channel skipped, output fixed at 0x80000 (0x8000 for humidity)
    #[default]
    None,
    X1,
    X2,
    X4,
    X8,
    X16,
}

impl Oversampling {
    pub fn bits(self) -> u8 {
        match self {
            Oversampling::None => 0,
            Oversampling::X1 => 1,
            Oversampling::X2 => 2,
            Oversampling::X4 => 3,
            Oversampling::X8 => 4,
            Oversampling::X16 => 5,
        }
    }
}

impl TryFrom<u8> for Oversampling {
    type Error = SensorError;

    fn try_from(value: u8) -> SensorResult<Self> {
        match value {
            0 => Ok(Oversampling::None),
            1 => Ok(Oversampling::X1),
            2 => Ok(Oversampling::X2),
            3 => Ok(Oversampling::X4),
            4 => Ok(Oversampling::X8),
            5 => Ok(Oversampling::X16),
            _ => Err(SensorError::InvalidSetting { setting: "oversampling", value }),
        }
    }
}

/// IIR filter coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    Off,
    X2,
    X4,
    X8,
    X16,
}

impl Filter {
    pub fn bits(self) -> u8 {
        match self {
            Filter::Off => 0,
            Filter::X2 => 1,
            Filter::X4 => 2,
            Filter::X8 => 3,
            Filter::X16 => 4,
        }
    }
}

impl TryFrom<u8> for Filter {
    type Error = SensorError;

    fn try_from(value: u8) -> SensorResult<Self> {
        match value {
            0 => Ok(Filter::Off),
            1 => Ok(Filter::X2),
            2 => Ok(Filter::X4),
            3 => Ok(Filter::X8),
            4 => Ok(Filter::X16),
            _ => Err(SensorError::InvalidSetting { setting: "filter", value }),
        }
    }
}

/// Inactive time between conversions in normal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Standby {
    #[default]
    #[serde(rename = "0.5ms")]
    Ms0_5,
    #[serde(rename = "10ms")]
    Ms10,
    #[serde(rename = "20ms")]
    Ms20,
    #[serde(rename = "62.5ms")]
    Ms62_5,
    #[serde(rename = "125ms")]
    Ms125,
    #[serde(rename = "250ms")]
    Ms250,
    #[serde(rename = "500ms")]
    Ms500,
    #[serde(rename = "1000ms")]
    Ms1000,
}

impl Standby {
    // The encoding is not ordered by duration: 10 ms and 20 ms sit at the top.
    pub fn bits(self) -> u8 {
        match self {
            Standby::Ms0_5 => 0,
            Standby::Ms62_5 => 1,
            Standby::Ms125 => 2,
            Standby::Ms250 => 3,
            Standby::Ms500 => 4,
            Standby::Ms1000 => 5,
            Standby::Ms10 => 6,
            Standby::Ms20 => 7,
        }
    }
}

impl TryFrom<u8> for Standby {
    type Error = SensorError;

    fn try_from(value: u8) -> SensorResult<Self> {
        match value {
            0 => Ok(Standby::Ms0_5),
            1 => Ok(Standby::Ms62_5),
            2 => Ok(Standby::Ms125),
            3 => Ok(Standby::Ms250),
            4 => Ok(Standby::Ms500),
            5 => Ok(Standby::Ms1000),
            6 => Ok(Standby::Ms10),
            7 => Ok(Standby::Ms20),
            _ => Err(SensorError::InvalidSetting { setting: "standby", value }),
        }
    }
}

/// Everything `configure()` writes to the control registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub osr_temperature: Oversampling,
    pub osr_pressure: Oversampling,
    pub osr_humidity: Oversampling,
    pub filter: Filter,
    pub standby: Standby,
}

impl Settings {
    pub fn ctrl_hum(&self) -> u8 {
        self.osr_humidity.bits() & CTRL_HUM_MASK
    }

    /// ctrl_meas with the mode bits left at sleep
    pub fn ctrl_meas(&self) -> u8 {
        (self.osr_temperature.bits() << 5) | (self.osr_pressure.bits() << 2) | DeviceMode::Sleep.bits()
    }

    pub fn config(&self) -> u8 {
        (self.standby.bits() << 5) | (self.filter.bits() << 2) | CONFIG_INTERFACE_BIT
    }

    /// Decode the three control registers back into typed settings.
    pub fn from_registers(ctrl_hum: u8, ctrl_meas: u8, config: u8) -> SensorResult<Self> {
        Ok(Self {
            osr_temperature: Oversampling::try_from(ctrl_meas >> 5)?,
            osr_pressure: Oversampling::try_from((ctrl_meas >> 2) & 0x07)?,
            osr_humidity: Oversampling::try_from(ctrl_hum & CTRL_HUM_MASK)?,
            filter: Filter::try_from((config >> 2) & 0x07)?,
            standby: Standby::try_from(config >> 5)?,
        })
    }
}
