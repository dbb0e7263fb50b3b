// Public modules
pub mod bus;
pub mod config;
pub mod errors;
pub mod hal;
pub mod messages;
pub mod registry;
pub mod sensors;

// Re-export commonly used types
pub use bus::{EmbeddedHalBus, I2CBus, RegisterBus};
pub use config::{load_bus_config, load_sensor_config, BusConfig, SensorConfig};
pub use errors::{SensorError, SensorResult};
pub use hal::{Clock, StdClock};
pub use messages::{Reading, ReadingMessage};
pub use registry::init_all;
pub use sensors::bme280::{Address, Bme280, DeviceMode, Filter, Oversampling, Settings, Standby};
pub use sensors::SensorDriver;

use messages::Header;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEVICE_ID: &str = "bme280_hub";
// Longest single conversion at x16 on all channels is ~113 ms
const SETTLE_MS: u32 = 120;

/// Log filter from `RUST_LOG`, INFO when unset
fn log_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
}

/// Initialize tracing with default configuration
pub fn init_tracing() {
    tracing_subscriber::fmt().with_env_filter(log_filter()).init();
}

/// Read every sensor once and wrap each successful reading in a message.
///
/// `next_seq` numbers messages across the whole hub; failed reads are logged
/// and do not consume a sequence number.
pub fn sample_all(sensors: &mut [Box<dyn SensorDriver>], next_seq: &mut u64) -> Vec<ReadingMessage> {
    let mut messages = Vec::new();
    for sensor in sensors.iter_mut() {
        match sensor.read() {
            Ok(reading) => {
                messages.push(ReadingMessage {
                    h: Header::new(DEVICE_ID.to_string(), sensor.id().to_string(), *next_seq),
                    reading,
                });
                *next_seq += 1;
            }
            Err(e) => {
                error!("[{}] Sensor read error: {}", sensor.id(), e);
            }
        }
    }
    messages
}

/// Bring up every configured sensor and log one reading from each
pub fn run_sensor_hub(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("[BME280SensorHub] starting up...");

    // Load configuration
    let bus_config = load_bus_config(&format!("{}/buses.toml", config_path))?;
    let sensor_config = load_sensor_config(&format!("{}/sensors.toml", config_path))?;
    info!("[config] loaded {} bus(es), {} sensor(s)", bus_config.buses.len(), sensor_config.sensors.len());

    let mut sensors = init_all(&sensor_config, &bus_config)?;
    info!("[registry] sensors and buses initialized");

    StdClock.delay_ms(SETTLE_MS);

    let mut seq = 0;
    for msg in sample_all(&mut sensors, &mut seq) {
        info!("[{}] {}", msg.sensor_id(), msg.to_json()?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_bus_config, parse_sensor_config};
    use crate::registry::init_all_with;
    use crate::sensors::bme280::registers::DATA_ADDR;
    use crate::sensors::bme280::testing::FakeBus;
    use tracing::Level;

    #[test]
    fn test_rust_log_controls_level() {
        let debug_enabled = || {
            let subscriber = tracing_subscriber::fmt().with_env_filter(log_filter()).finish();
            tracing::subscriber::with_default(subscriber, || {
                (tracing::enabled!(Level::INFO), tracing::enabled!(Level::DEBUG))
            })
        };

        std::env::set_var("RUST_LOG", "debug");
        assert_eq!(debug_enabled(), (true, true));

        std::env::remove_var("RUST_LOG");
        assert_eq!(debug_enabled(), (true, false));
    }

    #[test]
    fn test_sequence_numbers_run_across_sensors_and_passes() {
        let buses = parse_bus_config("[[bus]]\nid = \"i2c1\"\ntype = \"i2c\"\npath = \"/dev/i2c-1\"\n").unwrap();
        let sensors = parse_sensor_config(
            r#"
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
            "#,
        )
        .unwrap();
        let fakes = vec![FakeBus::new(), FakeBus::new()];
        let mut handed_out = fakes.clone().into_iter();
        let mut drivers =
            init_all_with(&sensors, &buses, |_| Ok(handed_out.next().unwrap()), || fakes[0].clock()).unwrap();

        let mut seq = 0;
        let first = sample_all(&mut drivers, &mut seq);
        let second = sample_all(&mut drivers, &mut seq);

        let numbered: Vec<(&str, u64)> = first.iter().chain(second.iter()).map(|m| (m.sensor_id(), m.h.seq)).collect();
        assert_eq!(numbered, vec![("indoor", 0), ("outdoor", 1), ("indoor", 2), ("outdoor", 3)]);

        // A failed read is skipped without using up a number
        fakes[0].state().failing_reads.insert(DATA_ADDR);
        let third = sample_all(&mut drivers, &mut seq);
        assert_eq!(third.len(), 1);
        assert_eq!((third[0].sensor_id(), third[0].h.seq), ("outdoor", 4));
        assert_eq!(seq, 5);
    }
}
