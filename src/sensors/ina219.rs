//! INA219 power monitor on the helmet battery rail.
//!
//! Current is derived from the shunt voltage and the known 0.1 ohm shunt
//! rather than the on-chip current register, which avoids programming the
//! calibration register.

use esp_idf_hal::delay::BLOCK;
use esp_idf_hal::i2c::I2cDriver;

use super::convert::{ina219_bus_voltage_v, ina219_current_a, ina219_shunt_voltage_v};
use super::manager::SensorError;
use crate::telemetry::Power;

const REG_SHUNT_VOLTAGE: u8 = 0x01;
const REG_BUS_VOLTAGE: u8 = 0x02;

/// Read bus voltage, shunt-derived current and power.
pub fn read(i2c: &mut I2cDriver<'static>, addr: u8) -> Result<Power, SensorError> {
    let mut shunt = [0u8; 2];
    i2c.write_read(addr, &[REG_SHUNT_VOLTAGE], &mut shunt, BLOCK)?;

    let mut bus = [0u8; 2];
    i2c.write_read(addr, &[REG_BUS_VOLTAGE], &mut bus, BLOCK)?;

    let shunt_v = ina219_shunt_voltage_v(i16::from_be_bytes(shunt));
    let bus_v = ina219_bus_voltage_v(u16::from_be_bytes(bus));
    let current = ina219_current_a(shunt_v);

    Ok(Power {
        voltage: bus_v,
        current,
        power: bus_v * current,
    })
}
