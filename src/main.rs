//! ESP32 helmet firmware binary.
//!
//! Boot sequence: join the backpack's WiFi access point (retrying forever),
//! bring up the I2C sensor suite and fan, start the MQTT client, then enter
//! the telemetry loop: publish whatever sensors are present and drive the
//! fan from the measured temperature, once per second.

#[cfg(feature = "esp32")]
fn main() {
    // Link ESP-IDF patches (must be first!)
    esp_idf_sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("=== ESP32 Helmet starting ===");

    if let Err(e) = run() {
        // Nothing sensible to do on a wearable without its radio; the
        // watchdog will reset us eventually
        log::error!("Fatal error during startup: {}", e);
    }
}

#[cfg(feature = "esp32")]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    use std::time::Instant;

    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::units::FromValueType;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs};
    use log::{info, warn};

    use helmet_esp32::config::{
        MqttConfig, WifiConfig, LOOP_DELAY, MQTT_RETRY_DELAY, WIFI_RETRY_DELAY,
    };
    use helmet_esp32::mqtt::MqttLink;
    use helmet_esp32::sensors::SensorManager;
    use helmet_esp32::wifi::{load_wifi_config, WifiManager};
    use helmet_esp32::{fan, LinkAction, LinkSupervisor};

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // Provisioned credentials win over the compiled-in defaults
    let nvs = EspNvs::new(nvs_partition.clone(), "helmet_wifi", true)?;
    let wifi_config = load_wifi_config(&nvs).unwrap_or_else(WifiConfig::default_credentials);

    // WiFi bootstrap: block until associated, retrying forever
    let mut wifi = WifiManager::new(peripherals.modem, sysloop, nvs_partition)?;
    loop {
        match wifi.connect(&wifi_config) {
            Ok(ip) => {
                info!("WiFi up, IP: {}", ip);
                break;
            }
            Err(e) => {
                warn!(
                    "WiFi connect failed: {} (retrying in {}s)",
                    e,
                    WIFI_RETRY_DELAY.as_secs()
                );
                FreeRtos::delay_ms(WIFI_RETRY_DELAY.as_millis() as u32);
            }
        }
    }

    // I2C sensor suite on the helmet bus
    let i2c_config = I2cConfig::new().baudrate(100.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &i2c_config,
    )?;
    let mut sensors = SensorManager::new(i2c);

    // Cooling fan, 25 kHz PWM on GPIO 25
    let fan_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default().frequency(25.kHz().into()),
    )?;
    let fan_channel =
        LedcDriver::new(peripherals.ledc.channel0, &fan_timer, peripherals.pins.gpio25)?;
    let mut fan = fan::Fan::new(fan_channel)?;

    let mqtt_config = MqttConfig::default_endpoint();
    let mut link = MqttLink::connect(&mqtt_config)?;
    let mut supervisor = LinkSupervisor::default();

    info!("Setup complete, entering main loop");

    loop {
        match supervisor.tick(link.is_connected(), Instant::now()) {
            LinkAction::Service => {
                let readings = sensors.read_all();

                for (topic, payload) in readings.payloads() {
                    if let Err(e) = link.publish(topic, &payload) {
                        warn!("Publish to {} failed: {:?}", topic, e);
                    }
                }

                if let Some(temp) = readings.fan_temperature() {
                    if let Err(e) = fan.set_speed(fan::speed_for_temperature(temp)) {
                        warn!("Fan control failed: {:?}", e);
                    }
                }
            }
            LinkAction::Connect => {
                info!(
                    "Connecting to MQTT broker {} (retry in {}s)",
                    mqtt_config.broker_url(),
                    MQTT_RETRY_DELAY.as_secs()
                );
            }
            LinkAction::Backoff(_) => {}
        }

        FreeRtos::delay_ms(LOOP_DELAY.as_millis() as u32);
    }
}

#[cfg(not(feature = "esp32"))]
fn main() {
    println!("This binary requires the 'esp32' feature.");
    println!("Use 'cargo test --no-default-features' for host testing.");
}
