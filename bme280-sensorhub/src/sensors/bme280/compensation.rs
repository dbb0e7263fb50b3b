//! Raw ADC extraction and double-precision compensation.
//!
//! The formulas are the floating-point reference implementation from the
//! datasheet (section 8.1). Constants and evaluation order are kept as
//! published; the outputs are sensitive to both.

use super::calibration::Calibration;
use super::registers::DATA_LEN;
use crate::messages::Reading;

pub const TEMPERATURE_MIN: f64 = -40.0;
pub const TEMPERATURE_MAX: f64 = 85.0;
pub const PRESSURE_MIN: f64 = 30000.0;
pub const PRESSURE_MAX: f64 = 110000.0;
pub const HUMIDITY_MIN: f64 = 0.0;
pub const HUMIDITY_MAX: f64 = 100.0;

/// Uncompensated ADC values from one burst read of 0xF7..0xFE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    /// 20-bit
    pub pressure: u32,
    /// 20-bit
    pub temperature: u32,
    /// 16-bit
    pub humidity: u32,
}

impl RawSample {
    pub fn from_burst(burst: &[u8; DATA_LEN]) -> Self {
        let b = burst.map(u32::from);
        Self {
            pressure: (b[0] << 12) | (b[1] << 4) | (b[2] >> 4),
            temperature: (b[3] << 12) | (b[4] << 4) | (b[5] >> 4),
            humidity: (b[6] << 8) | b[7],
        }
    }
}

/// `t_fine`: the unclamped temperature term shared with the pressure and
/// humidity formulas. Only `compensate_temperature` produces one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FineTemperature(f64);

impl FineTemperature {
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Returns the clamped temperature in °C and the fine temperature.
pub fn compensate_temperature(cal: &Calibration, raw: u32) -> (f64, FineTemperature) {
    let raw = raw as f64;
    let t1 = cal.dig_t1 as f64;

    let mut var1 = raw / 16384.0 - t1 / 1024.0;
    var1 *= cal.dig_t2 as f64;
    let mut var2 = raw / 131072.0 - t1 / 8192.0;
    var2 = var2 * var2 * cal.dig_t3 as f64;

    let t_fine = var1 + var2;
    let temperature = (t_fine / 5120.0).clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
    (temperature, FineTemperature(t_fine))
}

/// Pressure in Pa.
///
/// A zero `var1` term (dig_P1 of 0, or a corrupt calibration) yields
/// `PRESSURE_MIN` instead of dividing by zero.
pub fn compensate_pressure(cal: &Calibration, raw: u32, t_fine: FineTemperature) -> f64 {
    let mut var1 = t_fine.0 / 2.0 - 64000.0;
    let mut var2 = var1 * var1 * cal.dig_p6 as f64 / 32768.0;
    var2 += var1 * cal.dig_p5 as f64 * 2.0;
    var2 = var2 / 4.0 + cal.dig_p4 as f64 * 65536.0;
    let var3 = cal.dig_p3 as f64 * var1 * var1 / 524288.0;
    var1 = (var3 + cal.dig_p2 as f64 * var1) / 524288.0;
    var1 = (1.0 + var1 / 32768.0) * cal.dig_p1 as f64;

    if var1 == 0.0 {
        return PRESSURE_MIN;
    }

    let mut pressure = 1048576.0 - raw as f64;
    pressure = (pressure - var2 / 4096.0) * 6250.0 / var1;
    var1 = cal.dig_p9 as f64 * pressure * pressure / 2147483648.0;
    var2 = pressure * cal.dig_p8 as f64 / 32768.0;
    pressure += (var1 + var2 + cal.dig_p7 as f64) / 16.0;

    pressure.clamp(PRESSURE_MIN, PRESSURE_MAX)
}

/// Relative humidity in %RH.
pub fn compensate_humidity(cal: &Calibration, raw: u32, t_fine: FineTemperature) -> f64 {
    let var1 = t_fine.0 - 76800.0;
    let var2 = cal.dig_h4 as f64 * 64.0 + cal.dig_h5 as f64 / 16384.0 * var1;
    let var3 = raw as f64 - var2;
    let var4 = cal.dig_h2 as f64 / 65536.0;
    let var5 = 1.0 + cal.dig_h3 as f64 / 67108864.0 * var1;
    let mut var6 = 1.0 + cal.dig_h6 as f64 / 67108864.0 * var1 * var5;
    var6 = var3 * var4 * (var5 * var6);

    let humidity = var6 * (1.0 - cal.dig_h1 as f64 * var6 / 524288.0);
    humidity.clamp(HUMIDITY_MIN, HUMIDITY_MAX)
}

/// Run the three compensation steps in dependency order.
pub fn compensate(cal: &Calibration, raw: &RawSample) -> Reading {
    let (temperature, t_fine) = compensate_temperature(cal, raw.temperature);
    let pressure = compensate_pressure(cal, raw.pressure, t_fine);
    let humidity = compensate_humidity(cal, raw.humidity, t_fine);

    Reading {
        temperature,
        pressure: pressure / 100.0,
        humidity,
    }
}
