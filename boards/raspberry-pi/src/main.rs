use bme280_sensorhub::{init_tracing, run_sensor_hub};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    init_tracing();

    // Get config path (board default or override)
    let config_path = bme280_sensorhub_raspberry_pi::get_config_path();

    tracing::info!(
        "[{}] Configuration path: {}",
        bme280_sensorhub_raspberry_pi::BOARD_NAME,
        config_path
    );

    // Bring up the sensors and log one reading each
    run_sensor_hub(&config_path)
}
