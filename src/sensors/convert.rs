//! Raw-register to engineering-unit conversions.
//!
//! Everything in here is pure integer/float math on bytes read over I2C, so
//! it compiles and tests on the host. The BME280 compensation follows the
//! Bosch reference implementation (int32 temperature/humidity, int64
//! pressure); the remaining sensors use the fixed LSB scalings from their
//! datasheets.

// ==================== BNO055 ====================

/// Euler angle LSB is 1/16 degree in the BNO055's default units.
pub fn bno055_euler_deg(lsb: i16) -> f32 {
    lsb as f32 / 16.0
}

// ==================== AHT21 ====================

/// Split a 6-byte AHT21 measurement frame (status + 5 data bytes) into the
/// 20-bit humidity and temperature words.
pub fn aht21_split_raw(frame: &[u8; 6]) -> (u32, u32) {
    let humidity =
        ((frame[1] as u32) << 12) | ((frame[2] as u32) << 4) | ((frame[3] as u32) >> 4);
    let temperature =
        (((frame[3] & 0x0F) as u32) << 16) | ((frame[4] as u32) << 8) | (frame[5] as u32);
    (humidity, temperature)
}

/// 20-bit raw humidity to percent relative humidity.
pub fn aht21_humidity_pct(raw: u32) -> f32 {
    raw as f32 / 1_048_576.0 * 100.0
}

/// 20-bit raw temperature to degrees Celsius.
pub fn aht21_temperature_c(raw: u32) -> f32 {
    raw as f32 / 1_048_576.0 * 200.0 - 50.0
}

// ==================== ENS160 ====================

/// The AQI register carries the UBA index in its low three bits.
pub fn ens160_aqi(reg: u8) -> u8 {
    reg & 0x07
}

// ==================== INA219 ====================

/// Shunt resistor on the helmet power rail, ohms.
pub const INA219_SHUNT_OHMS: f32 = 0.1;

/// Bus voltage register to volts (value in bits 15..3, 4 mV LSB).
pub fn ina219_bus_voltage_v(reg: u16) -> f32 {
    (reg >> 3) as f32 * 0.004
}

/// Shunt voltage register to volts (10 uV LSB, signed).
pub fn ina219_shunt_voltage_v(reg: i16) -> f32 {
    reg as f32 * 0.000_01
}

/// Load current through the shunt, amps.
pub fn ina219_current_a(shunt_v: f32) -> f32 {
    shunt_v / INA219_SHUNT_OHMS
}

// ==================== BME280 ====================

/// BME280 factory calibration coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bme280Calib {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,
    pub p1: u16,
    pub p2: i16,
    pub p3: i16,
    pub p4: i16,
    pub p5: i16,
    pub p6: i16,
    pub p7: i16,
    pub p8: i16,
    pub p9: i16,
    pub h1: u8,
    pub h2: i16,
    pub h3: u8,
    pub h4: i16,
    pub h5: i16,
    pub h6: i8,
}

impl Bme280Calib {
    /// Parse the two calibration blocks as read from the device:
    /// `low` covers registers 0x88..=0xA1, `high` covers 0xE1..=0xE7.
    pub fn from_registers(low: &[u8; 26], high: &[u8; 7]) -> Self {
        let u16_le = |b: &[u8], i: usize| u16::from_le_bytes([b[i], b[i + 1]]);
        let i16_le = |b: &[u8], i: usize| i16::from_le_bytes([b[i], b[i + 1]]);

        Self {
            t1: u16_le(low, 0),
            t2: i16_le(low, 2),
            t3: i16_le(low, 4),
            p1: u16_le(low, 6),
            p2: i16_le(low, 8),
            p3: i16_le(low, 10),
            p4: i16_le(low, 12),
            p5: i16_le(low, 14),
            p6: i16_le(low, 16),
            p7: i16_le(low, 18),
            p8: i16_le(low, 20),
            p9: i16_le(low, 22),
            // low[24] is register 0xA0, which is unused
            h1: low[25],
            h2: i16_le(high, 0),
            h3: high[2],
            // H4/H5 share the nibble-packed register 0xE5
            h4: ((high[3] as i16) << 4) | ((high[4] & 0x0F) as i16),
            h5: ((high[5] as i16) << 4) | ((high[4] >> 4) as i16),
            h6: high[6] as i8,
        }
    }

    /// Fine temperature word shared by all three compensations.
    pub fn t_fine(&self, adc_t: i32) -> i32 {
        let var1 = (((adc_t >> 3) - ((self.t1 as i32) << 1)) * self.t2 as i32) >> 11;
        let var2 = (((((adc_t >> 4) - self.t1 as i32) * ((adc_t >> 4) - self.t1 as i32)) >> 12)
            * self.t3 as i32)
            >> 14;
        var1 + var2
    }

    /// Temperature in hundredths of a degree Celsius.
    pub fn temperature_centi_c(t_fine: i32) -> i32 {
        (t_fine * 5 + 128) >> 8
    }

    /// Pressure in Pa as an unsigned Q24.8 fixed-point value (int64 variant).
    ///
    /// Returns 0 when the divisor would be zero (uncalibrated part).
    pub fn pressure_q24_8(&self, adc_p: i32, t_fine: i32) -> u32 {
        let mut var1 = t_fine as i64 - 128_000;
        let mut var2 = var1 * var1 * self.p6 as i64;
        var2 += (var1 * self.p5 as i64) << 17;
        var2 += (self.p4 as i64) << 35;
        var1 = ((var1 * var1 * self.p3 as i64) >> 8) + ((var1 * self.p2 as i64) << 12);
        var1 = (((1i64 << 47) + var1) * self.p1 as i64) >> 33;
        if var1 == 0 {
            return 0;
        }
        let mut p = 1_048_576i64 - adc_p as i64;
        p = (((p << 31) - var2) * 3125) / var1;
        var1 = ((self.p9 as i64) * (p >> 13) * (p >> 13)) >> 25;
        var2 = ((self.p8 as i64) * p) >> 19;
        p = ((p + var1 + var2) >> 8) + ((self.p7 as i64) << 4);
        p as u32
    }

    /// Relative humidity as an unsigned Q22.10 fixed-point percentage,
    /// clamped to 0..=100 %.
    pub fn humidity_q22_10(&self, adc_h: i32, t_fine: i32) -> u32 {
        let mut v = t_fine - 76_800;
        v = ((((adc_h << 14) - ((self.h4 as i32) << 20) - (self.h5 as i32) * v) + 16_384) >> 15)
            * (((((((v * self.h6 as i32) >> 10) * (((v * self.h3 as i32) >> 11) + 32_768)) >> 10)
                + 2_097_152)
                * self.h2 as i32
                + 8_192)
                >> 14);
        v -= ((((v >> 15) * (v >> 15)) >> 7) * self.h1 as i32) >> 4;
        v = v.clamp(0, 419_430_400);
        (v >> 12) as u32
    }
}

/// Split the 8-byte burst read from register 0xF7 into the raw pressure,
/// temperature and humidity words.
pub fn bme280_split_raw(buf: &[u8; 8]) -> (i32, i32, i32) {
    let adc_p =
        ((buf[0] as i32) << 12) | ((buf[1] as i32) << 4) | ((buf[2] as i32) >> 4);
    let adc_t =
        ((buf[3] as i32) << 12) | ((buf[4] as i32) << 4) | ((buf[5] as i32) >> 4);
    let adc_h = ((buf[6] as i32) << 8) | buf[7] as i32;
    (adc_p, adc_t, adc_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bno055_euler_lsb() {
        assert_eq!(bno055_euler_deg(0), 0.0);
        assert_eq!(bno055_euler_deg(16), 1.0);
        assert_eq!(bno055_euler_deg(-8), -0.5);
        assert_eq!(bno055_euler_deg(2912), 182.0);
    }

    #[test]
    fn test_aht21_scaling_endpoints() {
        assert_eq!(aht21_humidity_pct(0), 0.0);
        assert_eq!(aht21_humidity_pct(1 << 20), 100.0);
        assert_eq!(aht21_temperature_c(0), -50.0);
        assert_eq!(aht21_temperature_c(1 << 20), 150.0);
    }

    #[test]
    fn test_aht21_midscale() {
        assert_eq!(aht21_humidity_pct(1 << 19), 50.0);
        assert_eq!(aht21_temperature_c(1 << 19), 50.0);
    }

    #[test]
    fn test_aht21_frame_split() {
        // humidity word 0xABCDE, temperature word 0x12345
        let frame = [0x1C, 0xAB, 0xCD, 0xE1, 0x23, 0x45];
        let (hum, temp) = aht21_split_raw(&frame);
        assert_eq!(hum, 0xABCDE);
        assert_eq!(temp, 0x12345);
    }

    #[test]
    fn test_ens160_aqi_masks_reserved_bits() {
        assert_eq!(ens160_aqi(0b0000_0011), 3);
        assert_eq!(ens160_aqi(0b1111_1010), 2);
    }

    #[test]
    fn test_ina219_bus_voltage() {
        // 3.7 V = 925 counts of 4 mV, value lives in bits 15..3
        assert!((ina219_bus_voltage_v(925 << 3) - 3.7).abs() < 1e-6);
    }

    #[test]
    fn test_ina219_current_from_shunt() {
        // 50 mV across 0.1 ohm = 0.5 A
        let shunt = ina219_shunt_voltage_v(5000);
        assert!((shunt - 0.05).abs() < 1e-6);
        assert!((ina219_current_a(shunt) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ina219_negative_shunt() {
        assert!(ina219_shunt_voltage_v(-5000) < 0.0);
    }

    /// Calibration values from the Bosch datasheet's worked example.
    fn datasheet_calib() -> Bme280Calib {
        Bme280Calib {
            t1: 27504,
            t2: 26435,
            t3: -1000,
            p1: 36477,
            p2: -10685,
            p3: 3024,
            p4: 2855,
            p5: 140,
            p6: -7,
            p7: 15500,
            p8: -14600,
            p9: 6000,
            h1: 0,
            h2: 0,
            h3: 0,
            h4: 0,
            h5: 0,
            h6: 0,
        }
    }

    #[test]
    fn test_bme280_temperature_datasheet_vector() {
        let calib = datasheet_calib();
        let t_fine = calib.t_fine(519_888);
        // Datasheet result: 25.08 degC
        assert_eq!(Bme280Calib::temperature_centi_c(t_fine), 2508);
    }

    #[test]
    fn test_bme280_pressure_datasheet_vector() {
        let calib = datasheet_calib();
        let t_fine = calib.t_fine(519_888);
        let pa = calib.pressure_q24_8(415_148, t_fine) as f64 / 256.0;
        // Datasheet result: 100653.27 Pa
        assert!((pa - 100653.27).abs() < 0.1, "got {} Pa", pa);
    }

    #[test]
    fn test_bme280_pressure_zero_calibration() {
        let calib = Bme280Calib {
            p1: 0,
            ..datasheet_calib()
        };
        assert_eq!(calib.pressure_q24_8(415_148, 128_000), 0);
    }

    #[test]
    fn test_bme280_humidity_clamped_to_percent_range() {
        // Sweep extreme raw inputs with plausible coefficients and check the
        // clamp holds on both ends
        let calib = Bme280Calib {
            h1: 75,
            h2: 363,
            h3: 0,
            h4: 315,
            h5: 50,
            h6: 30,
            ..datasheet_calib()
        };
        for adc_h in [0, 0x4000, 0x8000, 0xFFFF] {
            let rh = calib.humidity_q22_10(adc_h, 128_000);
            assert!(rh <= 100 * 1024, "raw {} gave {}", adc_h, rh);
        }
    }

    #[test]
    fn test_bme280_raw_split() {
        let buf = [0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x66, 0x90];
        let (adc_p, adc_t, adc_h) = bme280_split_raw(&buf);
        assert_eq!(adc_p, 0x655AC);
        assert_eq!(adc_t, 0x7EED0);
        assert_eq!(adc_h, 0x6690);
    }

    #[test]
    fn test_bme280_calib_parse() {
        let mut low = [0u8; 26];
        low[0] = 0x70; // t1 = 27504 = 0x6B70
        low[1] = 0x6B;
        low[2] = 0x43; // t2 = 26435 = 0x6743
        low[3] = 0x67;
        low[4] = 0x18; // t3 = -1000 = 0xFC18
        low[5] = 0xFC;
        low[25] = 75; // h1
        let mut high = [0u8; 7];
        high[0] = 0x6B; // h2 = 363 = 0x016B
        high[1] = 0x01;
        high[3] = 0x14; // h4 high nibble source
        high[4] = 0x3A; // shared register: h4 low nibble / h5 low nibble
        high[5] = 0x02; // h5 high nibble source
        high[6] = 0x1E; // h6 = 30

        let calib = Bme280Calib::from_registers(&low, &high);
        assert_eq!(calib.t1, 27504);
        assert_eq!(calib.t2, 26435);
        assert_eq!(calib.t3, -1000);
        assert_eq!(calib.h1, 75);
        assert_eq!(calib.h2, 363);
        assert_eq!(calib.h4, (0x14 << 4) | 0x0A);
        assert_eq!(calib.h5, (0x02 << 4) | 0x03);
        assert_eq!(calib.h6, 30);
    }
}
