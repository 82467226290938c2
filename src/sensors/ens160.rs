//! ENS160 digital metal-oxide air quality sensor.

use esp_idf_hal::delay::{FreeRtos, BLOCK};
use esp_idf_hal::i2c::I2cDriver;

use super::convert::ens160_aqi;
use super::manager::SensorError;
use crate::telemetry::AirQuality;

const REG_PART_ID: u8 = 0x00;
const REG_OPMODE: u8 = 0x10;
const REG_DATA_AQI: u8 = 0x21;
const REG_DATA_TVOC: u8 = 0x22;
const REG_DATA_ECO2: u8 = 0x24;

/// Part id, little-endian in registers 0x00/0x01.
const PART_ID: u16 = 0x0160;
const OPMODE_STANDARD: u8 = 0x02;

/// Verify the part id and enter standard gas-sensing mode.
pub fn init(i2c: &mut I2cDriver<'static>, addr: u8) -> Result<(), SensorError> {
    let mut id = [0u8; 2];
    i2c.write_read(addr, &[REG_PART_ID], &mut id, BLOCK)?;
    let part_id = u16::from_le_bytes(id);
    if part_id != PART_ID {
        return Err(SensorError::BadChipId {
            sensor: "ENS160",
            expected: (PART_ID & 0xFF) as u8,
            found: id[0],
        });
    }

    i2c.write(addr, &[REG_OPMODE, OPMODE_STANDARD], BLOCK)?;
    // Mode switch settles within a couple of ms
    FreeRtos::delay_ms(10);
    Ok(())
}

/// Read AQI, TVOC and eCO2.
pub fn read(i2c: &mut I2cDriver<'static>, addr: u8) -> Result<AirQuality, SensorError> {
    let mut aqi = [0u8; 1];
    i2c.write_read(addr, &[REG_DATA_AQI], &mut aqi, BLOCK)?;

    let mut tvoc = [0u8; 2];
    i2c.write_read(addr, &[REG_DATA_TVOC], &mut tvoc, BLOCK)?;

    let mut eco2 = [0u8; 2];
    i2c.write_read(addr, &[REG_DATA_ECO2], &mut eco2, BLOCK)?;

    Ok(AirQuality {
        aqi: ens160_aqi(aqi[0]),
        tvoc: u16::from_le_bytes(tvoc),
        eco2: u16::from_le_bytes(eco2),
    })
}
