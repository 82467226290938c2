//! BME280 environmental sensor.
//!
//! Configured for 1x oversampling on all channels in normal mode, which is
//! plenty for a once-per-second telemetry cadence. Compensation math lives
//! in [`super::convert`].

use esp_idf_hal::delay::{FreeRtos, BLOCK};
use esp_idf_hal::i2c::I2cDriver;

use super::convert::{bme280_split_raw, Bme280Calib};
use super::manager::SensorError;
use crate::telemetry::Environment;

const REG_CHIP_ID: u8 = 0xD0;
const REG_CALIB_LOW: u8 = 0x88;
const REG_CALIB_HIGH: u8 = 0xE1;
const REG_CTRL_HUM: u8 = 0xF2;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_DATA: u8 = 0xF7;

const CHIP_ID: u8 = 0x60;
/// Humidity oversampling x1.
const CTRL_HUM_OSRS_1X: u8 = 0x01;
/// Temperature x1, pressure x1, normal mode.
const CTRL_MEAS_NORMAL_1X: u8 = 0x27;

/// Verify the chip id, read the calibration blocks, and start normal-mode
/// sampling. Returns the parsed calibration for use on every read.
pub fn init(i2c: &mut I2cDriver<'static>, addr: u8) -> Result<Bme280Calib, SensorError> {
    let mut id = [0u8; 1];
    i2c.write_read(addr, &[REG_CHIP_ID], &mut id, BLOCK)?;
    if id[0] != CHIP_ID {
        return Err(SensorError::BadChipId {
            sensor: "BME280",
            expected: CHIP_ID,
            found: id[0],
        });
    }

    let mut low = [0u8; 26];
    i2c.write_read(addr, &[REG_CALIB_LOW], &mut low, BLOCK)?;
    let mut high = [0u8; 7];
    i2c.write_read(addr, &[REG_CALIB_HIGH], &mut high, BLOCK)?;

    // ctrl_hum only latches after a ctrl_meas write, so order matters
    i2c.write(addr, &[REG_CTRL_HUM, CTRL_HUM_OSRS_1X], BLOCK)?;
    i2c.write(addr, &[REG_CTRL_MEAS, CTRL_MEAS_NORMAL_1X], BLOCK)?;

    // First conversion in normal mode needs ~10 ms before data is valid
    FreeRtos::delay_ms(10);

    Ok(Bme280Calib::from_registers(&low, &high))
}

/// Burst-read the measurement registers and compensate.
pub fn read(
    i2c: &mut I2cDriver<'static>,
    addr: u8,
    calib: &Bme280Calib,
) -> Result<Environment, SensorError> {
    let mut buf = [0u8; 8];
    i2c.write_read(addr, &[REG_DATA], &mut buf, BLOCK)?;

    let (adc_p, adc_t, adc_h) = bme280_split_raw(&buf);
    let t_fine = calib.t_fine(adc_t);

    Ok(Environment {
        temperature: Bme280Calib::temperature_centi_c(t_fine) as f32 / 100.0,
        humidity: calib.humidity_q22_10(adc_h, t_fine) as f32 / 1024.0,
        // Q24.8 Pa -> hPa
        pressure: calib.pressure_q24_8(adc_p, t_fine) as f32 / 256.0 / 100.0,
    })
}
