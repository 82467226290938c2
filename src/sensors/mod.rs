//! Helmet sensor suite.
//!
//! All sensors share one I2C bus (SDA GPIO 21, SCL GPIO 22). The
//! [`SensorManager`] scans the bus at startup, initializes whatever it finds,
//! and exposes a [`read_all`](SensorManager::read_all) that tolerates any
//! subset of the suite being absent or faulty.
//!
//! Raw-value conversions live in [`convert`] and are host-testable; the
//! drivers themselves are ESP32 only.

pub mod convert;

#[cfg(feature = "esp32")]
mod aht21;
#[cfg(feature = "esp32")]
mod bme280;
#[cfg(feature = "esp32")]
mod bno055;
#[cfg(feature = "esp32")]
mod ens160;
#[cfg(feature = "esp32")]
mod ina219;
#[cfg(feature = "esp32")]
mod manager;

#[cfg(feature = "esp32")]
pub use manager::{SensorError, SensorManager};

/// I2C addresses of the helmet sensor fit.
pub mod addr {
    /// BNO055 absolute orientation IMU.
    pub const BNO055: u8 = 0x28;
    /// BME280 temperature/humidity/pressure.
    pub const BME280: u8 = 0x76;
    /// ENS160 air quality.
    pub const ENS160: u8 = 0x53;
    /// AHT21 temperature/humidity.
    pub const AHT21: u8 = 0x38;
    /// INA219 power monitor.
    pub const INA219: u8 = 0x40;
    /// PCA9548A I2C multiplexer (reserved for the eye displays).
    pub const PCA9548A: u8 = 0x70;
}
