//! Typed sensor readings and their MQTT payload encoding.
//!
//! The sensor layer produces a [`SensorReadings`] aggregate each loop
//! iteration; [`SensorReadings::payloads`] maps the readings that are present
//! onto their topics as JSON. Sensors that are absent from the bus (or whose
//! read failed) are simply skipped, so a helmet with a partial sensor fit
//! still publishes what it has.

use serde::Serialize;

use crate::topics;

/// Fused orientation from the BNO055, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Orientation {
    pub heading: f32,
    pub roll: f32,
    pub pitch: f32,
}

/// Environmental readings from the BME280.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Environment {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Relative humidity, percent.
    pub humidity: f32,
    /// Barometric pressure, hPa.
    pub pressure: f32,
}

/// Air quality readings from the ENS160.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AirQuality {
    /// UBA air quality index, 1 (excellent) to 5 (unhealthy).
    pub aqi: u8,
    /// Total volatile organic compounds, ppb.
    pub tvoc: u16,
    /// Equivalent CO2, ppm.
    pub eco2: u16,
}

/// In-helmet climate from the AHT21.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Climate {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Relative humidity, percent.
    pub humidity: f32,
}

/// Power metrics from the INA219.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Power {
    /// Bus voltage, volts.
    pub voltage: f32,
    /// Load current, amps.
    pub current: f32,
    /// Load power, watts.
    pub power: f32,
}

/// Wrapper for single-value topics (`helmet/temp` and friends).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct Scalar {
    value: f32,
}

/// One loop iteration's worth of sensor readings.
///
/// `None` means the sensor is absent or its read failed this cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorReadings {
    pub orientation: Option<Orientation>,
    pub environment: Option<Environment>,
    pub air_quality: Option<AirQuality>,
    pub climate: Option<Climate>,
    pub power: Option<Power>,
}

impl SensorReadings {
    /// Map the readings that are present onto `(topic, json)` pairs.
    ///
    /// The BME280 environment reading fans out to the three scalar topics
    /// the HUD consumes individually; everything else publishes as one
    /// structured payload per sensor.
    pub fn payloads(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();

        if let Some(orientation) = &self.orientation {
            out.push((topics::HELMET_ORIENTATION, encode(orientation)));
        }
        if let Some(env) = &self.environment {
            out.push((
                topics::HELMET_TEMP,
                encode(&Scalar {
                    value: env.temperature,
                }),
            ));
            out.push((
                topics::HELMET_HUMIDITY,
                encode(&Scalar {
                    value: env.humidity,
                }),
            ));
            out.push((
                topics::HELMET_PRESSURE,
                encode(&Scalar {
                    value: env.pressure,
                }),
            ));
        }
        if let Some(air_quality) = &self.air_quality {
            out.push((topics::HELMET_AIR_QUALITY, encode(air_quality)));
        }
        if let Some(climate) = &self.climate {
            out.push((topics::HELMET_CLIMATE, encode(climate)));
        }
        if let Some(power) = &self.power {
            out.push((topics::HELMET_POWER, encode(power)));
        }

        out
    }

    /// The temperature the fan policy reacts to (BME280 environment).
    pub fn fan_temperature(&self) -> Option<f32> {
        self.environment.map(|env| env.temperature)
    }
}

fn encode<T: Serialize>(value: &T) -> String {
    // Readings are plain structs of numbers, serialization cannot fail
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_readings() -> SensorReadings {
        SensorReadings {
            orientation: Some(Orientation {
                heading: 182.5,
                roll: -1.25,
                pitch: 3.0,
            }),
            environment: Some(Environment {
                temperature: 26.5,
                humidity: 48.0,
                pressure: 1013.25,
            }),
            air_quality: Some(AirQuality {
                aqi: 2,
                tvoc: 120,
                eco2: 450,
            }),
            climate: Some(Climate {
                temperature: 29.0,
                humidity: 55.5,
            }),
            power: Some(Power {
                voltage: 3.7,
                current: 0.5,
                power: 1.85,
            }),
        }
    }

    #[test]
    fn test_empty_readings_publish_nothing() {
        assert!(SensorReadings::default().payloads().is_empty());
    }

    #[test]
    fn test_full_readings_cover_all_topics() {
        let topics: Vec<&str> = full_readings()
            .payloads()
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(
            topics,
            vec![
                "helmet/orientation",
                "helmet/temp",
                "helmet/humidity",
                "helmet/pressure",
                "helmet/air_quality",
                "helmet/climate",
                "helmet/power",
            ]
        );
    }

    #[test]
    fn test_absent_sensor_skips_its_topics() {
        let mut readings = full_readings();
        readings.environment = None;
        let topics: Vec<&str> = readings.payloads().into_iter().map(|(t, _)| t).collect();
        assert!(!topics.contains(&"helmet/temp"));
        assert!(!topics.contains(&"helmet/humidity"));
        assert!(!topics.contains(&"helmet/pressure"));
        assert!(topics.contains(&"helmet/orientation"));
    }

    #[test]
    fn test_scalar_topics_wrap_value() {
        let readings = SensorReadings {
            environment: Some(Environment {
                temperature: 26.5,
                humidity: 48.0,
                pressure: 1013.25,
            }),
            ..Default::default()
        };
        let payloads = readings.payloads();
        let (topic, json) = &payloads[0];
        assert_eq!(*topic, "helmet/temp");
        assert_eq!(json, r#"{"value":26.5}"#);
    }

    #[test]
    fn test_orientation_payload_fields() {
        let readings = SensorReadings {
            orientation: Some(Orientation {
                heading: 90.0,
                roll: 0.0,
                pitch: -2.5,
            }),
            ..Default::default()
        };
        let (_, json) = readings.payloads().remove(0);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["heading"], 90.0);
        assert_eq!(parsed["roll"], 0.0);
        assert_eq!(parsed["pitch"], -2.5);
    }

    #[test]
    fn test_air_quality_payload_fields() {
        let readings = SensorReadings {
            air_quality: Some(AirQuality {
                aqi: 1,
                tvoc: 0,
                eco2: 400,
            }),
            ..Default::default()
        };
        let (_, json) = readings.payloads().remove(0);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["aqi"], 1);
        assert_eq!(parsed["tvoc"], 0);
        assert_eq!(parsed["eco2"], 400);
    }

    #[test]
    fn test_fan_temperature_follows_environment() {
        assert_eq!(full_readings().fan_temperature(), Some(26.5));
        assert_eq!(SensorReadings::default().fan_temperature(), None);
    }
}
