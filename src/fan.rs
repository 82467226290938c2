//! Cooling fan control.
//!
//! The helmet fan runs off a 25 kHz PWM signal on GPIO 25. The speed policy
//! is a simple two-threshold curve on the BME280 temperature: full speed
//! above 30 degC, half speed above 25 degC, off below.

/// Temperature above which the fan runs at full speed, degC.
pub const FULL_SPEED_TEMP: f32 = 30.0;

/// Temperature above which the fan runs at half speed, degC.
pub const HALF_SPEED_TEMP: f32 = 25.0;

/// Fan speed in percent for a measured temperature.
pub fn speed_for_temperature(temp_c: f32) -> u8 {
    if temp_c > FULL_SPEED_TEMP {
        100
    } else if temp_c > HALF_SPEED_TEMP {
        50
    } else {
        0
    }
}

/// PWM duty for a speed percentage, scaled to the timer's maximum duty.
pub fn duty_for_speed(speed_pct: u8, max_duty: u32) -> u32 {
    let speed = speed_pct.min(100) as u32;
    (max_duty * speed) / 100
}

#[cfg(feature = "esp32")]
pub use driver::Fan;

#[cfg(feature = "esp32")]
mod driver {
    use esp_idf_hal::ledc::LedcDriver;
    use esp_idf_sys::EspError;
    use log::info;

    use super::duty_for_speed;

    /// LEDC-driven fan.
    pub struct Fan {
        channel: LedcDriver<'static>,
        speed_pct: u8,
    }

    impl Fan {
        /// Wrap a configured LEDC channel, starting with the fan off.
        pub fn new(mut channel: LedcDriver<'static>) -> Result<Self, EspError> {
            channel.set_duty(0)?;
            channel.enable()?;
            Ok(Self {
                channel,
                speed_pct: 0,
            })
        }

        /// Set fan speed in percent. No-op if the speed is unchanged.
        pub fn set_speed(&mut self, speed_pct: u8) -> Result<(), EspError> {
            let speed_pct = speed_pct.min(100);
            if speed_pct == self.speed_pct {
                return Ok(());
            }
            let duty = duty_for_speed(speed_pct, self.channel.get_max_duty());
            self.channel.set_duty(duty)?;
            self.speed_pct = speed_pct;
            info!("Fan speed set to {}%", speed_pct);
            Ok(())
        }

        /// Current speed in percent.
        pub fn speed(&self) -> u8 {
            self.speed_pct
        }
    }
}
