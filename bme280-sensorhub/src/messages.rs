use serde::{Deserialize, Serialize};
use std::fmt;

/// Compensated output of one `update()` cycle
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature (°C), within [-40, 85]
    pub temperature: f64,
    /// Atmospheric pressure (hPa), within [300, 1100]
    pub pressure: f64,
    /// Relative humidity (%RH), within [0, 100]
    pub humidity: f64,
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.2}C {:.2}hPa {:.2}%", self.temperature, self.pressure, self.humidity)
    }
}

/// Header metadata attached to every published reading
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Header {
    /// Unique device identifier
    pub device_id: String,
    /// Sensor identifier from the configuration (e.g., "indoor", "outdoor")
    pub sensor_id: String,
    /// Hub-wide sequence number, one per published reading
    pub seq: u64,
    /// UTC timestamp in nanoseconds
    pub t_utc_ns: u64,
    /// Message schema version for evolution
    pub schema_v: u16,
}

impl Header {
    /// Create a new header stamped with the current time
    pub fn new(device_id: String, sensor_id: String, seq: u64) -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};

        let now_utc = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;

        Self {
            device_id,
            sensor_id,
            seq,
            t_utc_ns: now_utc,
            schema_v: 1,
        }
    }
}

/// Reading plus header, the unit the hub logs and hands to consumers
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ReadingMessage {
    pub h: Header,
    #[serde(flatten)]
    pub reading: Reading,
}

impl ReadingMessage {
    pub fn sensor_id(&self) -> &str {
        &self.h.sensor_id
    }

    /// Serialize to single-line JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
