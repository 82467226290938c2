//! AHT21 temperature/humidity sensor (in-helmet climate).

use esp_idf_hal::delay::{FreeRtos, BLOCK};
use esp_idf_hal::i2c::I2cDriver;

use super::convert::{aht21_humidity_pct, aht21_split_raw, aht21_temperature_c};
use super::manager::SensorError;
use crate::telemetry::Climate;

const CMD_INIT: [u8; 3] = [0xBE, 0x08, 0x00];
const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];

const STATUS_BUSY: u8 = 0x80;
const STATUS_CALIBRATED: u8 = 0x08;

/// Send the init command and wait for the calibration flag.
pub fn init(i2c: &mut I2cDriver<'static>, addr: u8) -> Result<(), SensorError> {
    i2c.write(addr, &CMD_INIT, BLOCK)?;
    FreeRtos::delay_ms(10);

    let mut status = [0u8; 1];
    i2c.read(addr, &mut status, BLOCK)?;
    if status[0] & STATUS_CALIBRATED == 0 {
        return Err(SensorError::NotReady("AHT21"));
    }
    Ok(())
}

/// Trigger a measurement and read it back.
pub fn read(i2c: &mut I2cDriver<'static>, addr: u8) -> Result<Climate, SensorError> {
    i2c.write(addr, &CMD_TRIGGER, BLOCK)?;
    // Datasheet measurement time is 80 ms
    FreeRtos::delay_ms(80);

    let mut frame = [0u8; 6];
    i2c.read(addr, &mut frame, BLOCK)?;
    if frame[0] & STATUS_BUSY != 0 {
        return Err(SensorError::NotReady("AHT21"));
    }

    let (raw_humidity, raw_temperature) = aht21_split_raw(&frame);
    Ok(Climate {
        temperature: aht21_temperature_c(raw_temperature),
        humidity: aht21_humidity_pct(raw_humidity),
    })
}
