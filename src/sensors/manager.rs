//! Sensor discovery and acquisition.

use esp_idf_hal::delay::BLOCK;
use esp_idf_hal::i2c::I2cDriver;
use esp_idf_sys::EspError;
use log::{info, warn};

use super::{addr, aht21, bme280, bno055, convert::Bme280Calib, ens160, ina219};
use crate::telemetry::{AirQuality, Climate, Environment, Orientation, Power, SensorReadings};

/// Errors from the sensor layer.
#[derive(Debug)]
pub enum SensorError {
    /// I2C transaction failed.
    I2c(EspError),
    /// A device answered with an unexpected chip id.
    BadChipId {
        sensor: &'static str,
        expected: u8,
        found: u8,
    },
    /// The device reported it is still busy or uncalibrated.
    NotReady(&'static str),
}

impl From<EspError> for SensorError {
    fn from(e: EspError) -> Self {
        Self::I2c(e)
    }
}

impl std::fmt::Display for SensorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::I2c(e) => write!(f, "I2C error: {:?}", e),
            Self::BadChipId {
                sensor,
                expected,
                found,
            } => write!(
                f,
                "{}: unexpected chip id 0x{:02X} (expected 0x{:02X})",
                sensor, found, expected
            ),
            Self::NotReady(sensor) => write!(f, "{}: not ready", sensor),
        }
    }
}

impl std::error::Error for SensorError {}

/// Owns the I2C bus and the presence/calibration state of each sensor.
pub struct SensorManager {
    i2c: I2cDriver<'static>,
    has_bno055: bool,
    /// Calibration block read at init; `None` when the BME280 is absent.
    bme280: Option<Bme280Calib>,
    has_ens160: bool,
    has_aht21: bool,
    has_ina219: bool,
    has_pca9548a: bool,
}

impl SensorManager {
    /// Scan the bus and initialize every sensor that responds.
    ///
    /// A sensor that is present but fails initialization is logged and
    /// treated as absent; the manager itself only fails if the bus is
    /// unusable.
    pub fn new(mut i2c: I2cDriver<'static>) -> Self {
        let found = scan(&mut i2c);
        info!(
            "I2C devices found: [{}]",
            found
                .iter()
                .map(|a| format!("0x{:02X}", a))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let present = |a: u8| found.contains(&a);

        let has_bno055 = present(addr::BNO055)
            && log_init("BNO055", bno055::init(&mut i2c, addr::BNO055));
        let bme280 = if present(addr::BME280) {
            match bme280::init(&mut i2c, addr::BME280) {
                Ok(calib) => {
                    info!("BME280 initialized");
                    Some(calib)
                }
                Err(e) => {
                    warn!("BME280 init failed: {}", e);
                    None
                }
            }
        } else {
            None
        };
        let has_ens160 = present(addr::ENS160)
            && log_init("ENS160", ens160::init(&mut i2c, addr::ENS160));
        let has_aht21 =
            present(addr::AHT21) && log_init("AHT21", aht21::init(&mut i2c, addr::AHT21));
        let has_ina219 = present(addr::INA219);
        let has_pca9548a = present(addr::PCA9548A);

        if has_ina219 {
            info!("INA219 present");
        }
        if has_pca9548a {
            info!("PCA9548A multiplexer present");
        }

        Self {
            i2c,
            has_bno055,
            bme280,
            has_ens160,
            has_aht21,
            has_ina219,
            has_pca9548a,
        }
    }

    /// Whether the eye-display multiplexer was seen on the bus.
    pub fn has_multiplexer(&self) -> bool {
        self.has_pca9548a
    }

    /// Read every present sensor. Failures degrade to `None` per sensor.
    pub fn read_all(&mut self) -> SensorReadings {
        SensorReadings {
            orientation: self.read_bno055(),
            environment: self.read_bme280(),
            air_quality: self.read_ens160(),
            climate: self.read_aht21(),
            power: self.read_ina219(),
        }
    }

    fn read_bno055(&mut self) -> Option<Orientation> {
        if !self.has_bno055 {
            return None;
        }
        log_read("BNO055", bno055::read(&mut self.i2c, addr::BNO055))
    }

    fn read_bme280(&mut self) -> Option<Environment> {
        let calib = self.bme280.as_ref()?;
        log_read("BME280", bme280::read(&mut self.i2c, addr::BME280, calib))
    }

    fn read_ens160(&mut self) -> Option<AirQuality> {
        if !self.has_ens160 {
            return None;
        }
        log_read("ENS160", ens160::read(&mut self.i2c, addr::ENS160))
    }

    fn read_aht21(&mut self) -> Option<Climate> {
        if !self.has_aht21 {
            return None;
        }
        log_read("AHT21", aht21::read(&mut self.i2c, addr::AHT21))
    }

    fn read_ina219(&mut self) -> Option<Power> {
        if !self.has_ina219 {
            return None;
        }
        log_read("INA219", ina219::read(&mut self.i2c, addr::INA219))
    }
}

/// Probe the 7-bit address range for devices that ACK a read.
fn scan(i2c: &mut I2cDriver<'static>) -> Vec<u8> {
    let mut found = Vec::new();
    let mut scratch = [0u8; 1];
    for address in 0x08..=0x77u8 {
        if i2c.read(address, &mut scratch, BLOCK).is_ok() {
            found.push(address);
        }
    }
    found
}

fn log_init(sensor: &str, result: Result<(), SensorError>) -> bool {
    match result {
        Ok(()) => {
            info!("{} initialized", sensor);
            true
        }
        Err(e) => {
            warn!("{} init failed: {}", sensor, e);
            false
        }
    }
}

fn log_read<T>(sensor: &str, result: Result<T, SensorError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Error reading {}: {}", sensor, e);
            None
        }
    }
}
