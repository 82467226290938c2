//! WiFi connection management.
//!
//! Wraps the ESP-IDF WiFi driver for joining the helmet access point in
//! station mode.

use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use esp_idf_sys::EspError;
use log::info;

use crate::config::WifiConfig;

/// WiFi connection manager.
pub struct WifiManager<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
}

impl<'a> WifiManager<'a> {
    /// Create a new WiFi manager.
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
    ) -> Result<Self, EspError> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;
        Ok(Self { wifi })
    }

    /// Attempt to associate with the configured network.
    ///
    /// Blocks until association and DHCP complete or the driver gives up on
    /// this attempt; the boot sequence retries failed attempts forever.
    /// Returns the IP address on success.
    pub fn connect(&mut self, config: &WifiConfig) -> Result<String, WifiError> {
        info!("Connecting to WiFi: {}", config.ssid);

        let auth_method = if config.is_open() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let wifi_config = Configuration::Client(ClientConfiguration {
            ssid: config
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| WifiError::InvalidSsid)?,
            password: config
                .password
                .as_str()
                .try_into()
                .map_err(|_| WifiError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        self.wifi.set_configuration(&wifi_config)?;

        if !self.wifi.is_started()? {
            self.wifi.start()?;
        }

        self.wifi.connect().map_err(WifiError::AssociationFailed)?;
        self.wifi.wait_netif_up().map_err(WifiError::DhcpFailed)?;

        let ip_info = self.wifi.wifi().sta_netif().get_ip_info()?;
        let ip = format!("{}", ip_info.ip);

        info!("WiFi connected, IP: {}", ip);
        Ok(ip)
    }

    /// Check if currently associated.
    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}

/// Errors that can occur during WiFi operations.
#[derive(Debug)]
pub enum WifiError {
    /// SSID does not fit the driver's fixed-size buffer.
    InvalidSsid,
    /// Password does not fit the driver's fixed-size buffer.
    InvalidPassword,
    /// Association with the access point failed.
    AssociationFailed(EspError),
    /// Failed to obtain an IP address via DHCP.
    DhcpFailed(EspError),
    /// Other ESP-IDF error.
    EspError(EspError),
}

impl From<EspError> for WifiError {
    fn from(e: EspError) -> Self {
        Self::EspError(e)
    }
}

impl std::fmt::Display for WifiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "invalid SSID"),
            Self::InvalidPassword => write!(f, "invalid password"),
            Self::AssociationFailed(e) => write!(f, "association failed: {:?}", e),
            Self::DhcpFailed(e) => write!(f, "DHCP failed: {:?}", e),
            Self::EspError(e) => write!(f, "ESP error: {:?}", e),
        }
    }
}

impl std::error::Error for WifiError {}
