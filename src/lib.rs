//! ESP32 helmet firmware library.
//!
//! This library contains platform-independent components that can be tested
//! on the host machine without ESP32 hardware. Hardware-facing modules (WiFi,
//! MQTT transport, I2C sensors, fan PWM) are gated behind the `esp32` feature.

pub mod config;
pub mod fan;
pub mod link;
#[cfg(feature = "esp32")]
pub mod mqtt;
pub mod sensors;
pub mod telemetry;
pub mod topics;
#[cfg(feature = "esp32")]
pub mod wifi;

// Re-export commonly used items
pub use config::{ConfigError, MqttConfig, WifiConfig};
pub use link::{LinkAction, LinkState, LinkSupervisor};
pub use telemetry::SensorReadings;
