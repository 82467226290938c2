//! Device configuration.
//!
//! Platform-independent configuration types for the helmet node: WiFi
//! credentials and the MQTT broker endpoint. Both are validated on
//! construction so the hardware modules never see malformed values.
//!
//! WiFi credentials can be persisted in NVS (see [`crate::wifi`]); the
//! constants below are the compiled-in fallback matching the helmet's
//! access point.

use std::fmt;
use std::time::Duration;

/// Maximum SSID length per IEEE 802.11 standard.
pub const MAX_SSID_LEN: usize = 32;

/// Maximum password length for WPA2.
pub const MAX_PASSWORD_LEN: usize = 64;

/// Minimum password length for WPA2.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum client identifier length guaranteed by MQTT 3.1.1 brokers.
pub const MAX_CLIENT_ID_LEN: usize = 23;

/// Default access point hosted by the HUD backpack.
pub const DEFAULT_WIFI_SSID: &str = "CloneTrooper-HUD";

/// Default access point password.
pub const DEFAULT_WIFI_PASSWORD: &str = "Order66Execute";

/// Default broker address (the backpack Pi on the helmet AP).
pub const DEFAULT_MQTT_HOST: &str = "192.168.4.1";

/// Default broker port.
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// MQTT client identifier announced to the broker.
pub const DEFAULT_MQTT_CLIENT_ID: &str = "ESP32_Helmet";

/// Delay between MQTT reconnect attempts. Fixed cadence, no backoff.
pub const MQTT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Delay between WiFi association attempts at boot.
pub const WIFI_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Main loop period.
pub const LOOP_DELAY: Duration = Duration::from_secs(1);

/// WiFi credentials for joining the helmet access point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiConfig {
    /// Network SSID (1-32 bytes).
    pub ssid: String,
    /// Network password (8-64 bytes for WPA2, empty for open networks).
    pub password: String,
}

impl WifiConfig {
    /// Create a validated WiFi configuration.
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            ssid: ssid.into(),
            password: password.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// The compiled-in credentials for the helmet AP.
    pub fn default_credentials() -> Self {
        Self {
            ssid: DEFAULT_WIFI_SSID.to_string(),
            password: DEFAULT_WIFI_PASSWORD.to_string(),
        }
    }

    /// Validate SSID and password lengths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.is_empty() {
            return Err(ConfigError::SsidEmpty);
        }
        if self.ssid.len() > MAX_SSID_LEN {
            return Err(ConfigError::SsidTooLong {
                len: self.ssid.len(),
                max: MAX_SSID_LEN,
            });
        }
        if !self.password.is_empty() && self.password.len() < MIN_PASSWORD_LEN {
            return Err(ConfigError::PasswordTooShort {
                len: self.password.len(),
                min: MIN_PASSWORD_LEN,
            });
        }
        if self.password.len() > MAX_PASSWORD_LEN {
            return Err(ConfigError::PasswordTooLong {
                len: self.password.len(),
                max: MAX_PASSWORD_LEN,
            });
        }
        Ok(())
    }

    /// Check if this is an open network (no password).
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }

    /// Serialize for NVS storage.
    ///
    /// Format: `[ssid_len:1][ssid:N][password_len:1][password:M]`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(2 + self.ssid.len() + self.password.len());
        bytes.push(self.ssid.len() as u8);
        bytes.extend_from_slice(self.ssid.as_bytes());
        bytes.push(self.password.len() as u8);
        bytes.extend_from_slice(self.password.as_bytes());
        bytes
    }

    /// Deserialize from NVS bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.is_empty() {
            return Err(ConfigError::InvalidFormat("empty data".into()));
        }

        let ssid_len = bytes[0] as usize;
        if bytes.len() < 1 + ssid_len + 1 {
            return Err(ConfigError::InvalidFormat("truncated SSID".into()));
        }
        let ssid = String::from_utf8(bytes[1..1 + ssid_len].to_vec())
            .map_err(|_| ConfigError::InvalidFormat("invalid SSID UTF-8".into()))?;

        let password_len = bytes[1 + ssid_len] as usize;
        let password_start = 2 + ssid_len;
        if bytes.len() < password_start + password_len {
            return Err(ConfigError::InvalidFormat("truncated password".into()));
        }
        let password =
            String::from_utf8(bytes[password_start..password_start + password_len].to_vec())
                .map_err(|_| ConfigError::InvalidFormat("invalid password UTF-8".into()))?;

        Self::new(ssid, password)
    }
}

/// MQTT broker endpoint and client identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttConfig {
    /// Broker hostname or IP address.
    pub host: String,
    /// Broker TCP port.
    pub port: u16,
    /// Client identifier announced on connect.
    pub client_id: String,
}

impl MqttConfig {
    /// Create a validated MQTT configuration.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        client_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            host: host.into(),
            port,
            client_id: client_id.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// The compiled-in broker endpoint.
    pub fn default_endpoint() -> Self {
        Self {
            host: DEFAULT_MQTT_HOST.to_string(),
            port: DEFAULT_MQTT_PORT,
            client_id: DEFAULT_MQTT_CLIENT_ID.to_string(),
        }
    }

    /// Validate host and client id.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::HostEmpty);
        }
        if self.client_id.is_empty() {
            return Err(ConfigError::ClientIdEmpty);
        }
        if self.client_id.len() > MAX_CLIENT_ID_LEN {
            return Err(ConfigError::ClientIdTooLong {
                len: self.client_id.len(),
                max: MAX_CLIENT_ID_LEN,
            });
        }
        Ok(())
    }

    /// Render the broker URL the esp-idf MQTT client expects.
    pub fn broker_url(&self) -> String {
        format!("mqtt://{}:{}", self.host, self.port)
    }
}

/// Errors that can occur during configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// SSID is empty.
    SsidEmpty,
    /// SSID exceeds maximum length.
    SsidTooLong { len: usize, max: usize },
    /// Password is too short for WPA2.
    PasswordTooShort { len: usize, min: usize },
    /// Password exceeds maximum length.
    PasswordTooLong { len: usize, max: usize },
    /// Broker host is empty.
    HostEmpty,
    /// Client id is empty.
    ClientIdEmpty,
    /// Client id exceeds the length brokers must accept.
    ClientIdTooLong { len: usize, max: usize },
    /// Invalid data format during deserialization.
    InvalidFormat(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SsidEmpty => write!(f, "SSID cannot be empty"),
            Self::SsidTooLong { len, max } => {
                write!(f, "SSID too long: {} bytes (max {})", len, max)
            }
            Self::PasswordTooShort { len, min } => {
                write!(f, "password too short: {} bytes (min {})", len, min)
            }
            Self::PasswordTooLong { len, max } => {
                write!(f, "password too long: {} bytes (max {})", len, max)
            }
            Self::HostEmpty => write!(f, "broker host cannot be empty"),
            Self::ClientIdEmpty => write!(f, "client id cannot be empty"),
            Self::ClientIdTooLong { len, max } => {
                write!(f, "client id too long: {} bytes (max {})", len, max)
            }
            Self::InvalidFormat(msg) => write!(f, "invalid format: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== WifiConfig Tests ====================

    #[test]
    fn test_valid_wifi_config() {
        let config = WifiConfig::new("TestNetwork", "password123").unwrap();
        assert_eq!(config.ssid, "TestNetwork");
        assert_eq!(config.password, "password123");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_credentials_are_valid() {
        let config = WifiConfig::default_credentials();
        assert!(config.validate().is_ok());
        assert_eq!(config.ssid, "CloneTrooper-HUD");
    }

    #[test]
    fn test_open_network() {
        let config = WifiConfig::new("OpenNetwork", "").unwrap();
        assert!(config.is_open());
    }

    #[test]
    fn test_empty_ssid() {
        let result = WifiConfig::new("", "password123");
        assert_eq!(result, Err(ConfigError::SsidEmpty));
    }

    #[test]
    fn test_ssid_too_long() {
        let result = WifiConfig::new("a".repeat(33), "password123");
        assert!(matches!(result, Err(ConfigError::SsidTooLong { .. })));
    }

    #[test]
    fn test_ssid_max_length() {
        let config = WifiConfig::new("a".repeat(32), "password123").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_password_too_short() {
        let result = WifiConfig::new("TestNetwork", "short");
        assert!(matches!(result, Err(ConfigError::PasswordTooShort { .. })));
    }

    #[test]
    fn test_password_bounds() {
        assert!(WifiConfig::new("TestNetwork", "12345678").is_ok());
        assert!(WifiConfig::new("TestNetwork", "a".repeat(64)).is_ok());
        assert!(matches!(
            WifiConfig::new("TestNetwork", "a".repeat(65)),
            Err(ConfigError::PasswordTooLong { .. })
        ));
    }

    // ==================== NVS Serialization Tests ====================

    #[test]
    fn test_wifi_config_roundtrip() {
        let config = WifiConfig::new("MyNetwork", "MyPassword").unwrap();
        let restored = WifiConfig::from_bytes(&config.to_bytes()).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_open_network_roundtrip() {
        let config = WifiConfig::new("OpenNet", "").unwrap();
        let restored = WifiConfig::from_bytes(&config.to_bytes()).unwrap();
        assert!(restored.is_open());
        assert_eq!(config, restored);
    }

    #[test]
    fn test_from_bytes_empty() {
        let result = WifiConfig::from_bytes(&[]);
        assert!(matches!(result, Err(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_from_bytes_truncated() {
        // Claims a 5-byte SSID but only 4 bytes follow
        let result = WifiConfig::from_bytes(&[5, b'h', b'e', b'l', b'm']);
        assert!(matches!(result, Err(ConfigError::InvalidFormat(_))));
    }

    // ==================== MqttConfig Tests ====================

    #[test]
    fn test_default_endpoint() {
        let config = MqttConfig::default_endpoint();
        assert!(config.validate().is_ok());
        assert_eq!(config.client_id, "ESP32_Helmet");
    }

    #[test]
    fn test_broker_url_unchanged() {
        // The broker address must pass through to the client verbatim
        let config = MqttConfig::new("192.168.4.1", 1883, "ESP32_Helmet").unwrap();
        assert_eq!(config.broker_url(), "mqtt://192.168.4.1:1883");
    }

    #[test]
    fn test_broker_url_custom_port() {
        let config = MqttConfig::new("broker.local", 8883, "helmet-dev").unwrap();
        assert_eq!(config.broker_url(), "mqtt://broker.local:8883");
    }

    #[test]
    fn test_empty_host() {
        let result = MqttConfig::new("", 1883, "ESP32_Helmet");
        assert_eq!(result, Err(ConfigError::HostEmpty));
    }

    #[test]
    fn test_empty_client_id() {
        let result = MqttConfig::new("192.168.4.1", 1883, "");
        assert_eq!(result, Err(ConfigError::ClientIdEmpty));
    }

    #[test]
    fn test_client_id_too_long() {
        let result = MqttConfig::new("192.168.4.1", 1883, "x".repeat(24));
        assert!(matches!(result, Err(ConfigError::ClientIdTooLong { .. })));
    }

    #[test]
    fn test_client_id_max_length() {
        let config = MqttConfig::new("192.168.4.1", 1883, "x".repeat(23)).unwrap();
        assert!(config.validate().is_ok());
    }
}
