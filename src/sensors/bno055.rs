//! BNO055 absolute orientation IMU.
//!
//! Runs in NDOF fusion mode; we only consume the fused Euler angles
//! (1/16 degree per LSB in the default unit selection).

use esp_idf_hal::delay::{FreeRtos, BLOCK};
use esp_idf_hal::i2c::I2cDriver;

use super::convert::bno055_euler_deg;
use super::manager::SensorError;
use crate::telemetry::Orientation;

const REG_CHIP_ID: u8 = 0x00;
const REG_EULER_H_LSB: u8 = 0x1A;
const REG_OPR_MODE: u8 = 0x3D;

const CHIP_ID: u8 = 0xA0;
const MODE_CONFIG: u8 = 0x00;
const MODE_NDOF: u8 = 0x0C;

/// Verify the chip id and switch into NDOF fusion mode.
pub fn init(i2c: &mut I2cDriver<'static>, addr: u8) -> Result<(), SensorError> {
    let mut id = [0u8; 1];
    i2c.write_read(addr, &[REG_CHIP_ID], &mut id, BLOCK)?;
    if id[0] != CHIP_ID {
        return Err(SensorError::BadChipId {
            sensor: "BNO055",
            expected: CHIP_ID,
            found: id[0],
        });
    }

    // Mode changes must pass through CONFIG mode; switching takes a few ms
    i2c.write(addr, &[REG_OPR_MODE, MODE_CONFIG], BLOCK)?;
    FreeRtos::delay_ms(25);
    i2c.write(addr, &[REG_OPR_MODE, MODE_NDOF], BLOCK)?;
    FreeRtos::delay_ms(20);
    Ok(())
}

/// Read the fused Euler angles.
pub fn read(i2c: &mut I2cDriver<'static>, addr: u8) -> Result<Orientation, SensorError> {
    let mut buf = [0u8; 6];
    i2c.write_read(addr, &[REG_EULER_H_LSB], &mut buf, BLOCK)?;

    let heading = i16::from_le_bytes([buf[0], buf[1]]);
    let roll = i16::from_le_bytes([buf[2], buf[3]]);
    let pitch = i16::from_le_bytes([buf[4], buf[5]]);

    Ok(Orientation {
        heading: bno055_euler_deg(heading),
        roll: bno055_euler_deg(roll),
        pitch: bno055_euler_deg(pitch),
    })
}
