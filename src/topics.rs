//! MQTT topic naming convention for the armor system.
//!
//! Topics the helmet node publishes to. The backpack Pi subscribes to the
//! `helmet/` subtree and renders the values on the HUD.

/// BNO055 fused orientation (heading/roll/pitch).
pub const HELMET_ORIENTATION: &str = "helmet/orientation";

/// BME280 temperature, degrees Celsius.
pub const HELMET_TEMP: &str = "helmet/temp";

/// BME280 relative humidity, percent.
pub const HELMET_HUMIDITY: &str = "helmet/humidity";

/// BME280 barometric pressure, hPa.
pub const HELMET_PRESSURE: &str = "helmet/pressure";

/// ENS160 air quality (AQI/TVOC/eCO2).
pub const HELMET_AIR_QUALITY: &str = "helmet/air_quality";

/// AHT21 in-helmet temperature and humidity.
pub const HELMET_CLIMATE: &str = "helmet/climate";

/// INA219 power metrics (voltage/current/power).
pub const HELMET_POWER: &str = "helmet/power";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_topics_under_helmet_subtree() {
        let topics = [
            HELMET_ORIENTATION,
            HELMET_TEMP,
            HELMET_HUMIDITY,
            HELMET_PRESSURE,
            HELMET_AIR_QUALITY,
            HELMET_CLIMATE,
            HELMET_POWER,
        ];
        for topic in topics {
            assert!(topic.starts_with("helmet/"), "{} not under helmet/", topic);
            assert!(!topic.ends_with('/'));
        }
    }
}
