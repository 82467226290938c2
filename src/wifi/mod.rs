//! WiFi station bootstrap and credential storage.
//!
//! The helmet joins the backpack's access point once at startup and never
//! gives up: association failures retry forever on a fixed delay. Credentials
//! live in NVS when they have been provisioned, with compiled-in defaults as
//! fallback.
//!
//! # Components
//!
//! - [`connection`] - ESP-IDF WiFi driver wrapper
//! - [`storage`] - NVS persistence for credentials
//!
//! Credential validation lives in [`crate::config`], which is host-testable.

mod connection;
mod storage;

pub use connection::{WifiError, WifiManager};
pub use storage::{clear_wifi_config, load_wifi_config, save_wifi_config};
