//! MQTT transport to the backpack broker.
//!
//! [`MqttLink`] wraps the ESP-IDF MQTT client. The reconnect *policy* (what
//! to do per main-loop tick) lives in the host-testable [`crate::link`]
//! module; this module supplies the connected flag the supervisor consumes
//! and carries the actual publishes.

mod client;

pub use client::MqttLink;
