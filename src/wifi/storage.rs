//! NVS persistence for WiFi credentials.
//!
//! Provisioned credentials survive reboots; when nothing is stored the boot
//! sequence falls back to the compiled-in defaults.

use esp_idf_svc::nvs::{EspNvs, NvsDefault};
use esp_idf_sys::EspError;

use crate::config::{WifiConfig, MAX_PASSWORD_LEN, MAX_SSID_LEN};

/// NVS key for stored credentials. The namespace is chosen by the caller
/// when opening the handle (the firmware uses `helmet_wifi`).
const NVS_KEY: &str = "credentials";

/// Serialized form: `[ssid_len:1][ssid:32][password_len:1][password:64]`,
/// with a small margin.
const MAX_CONFIG_BUFFER_SIZE: usize = 1 + MAX_SSID_LEN + 1 + MAX_PASSWORD_LEN + 4;

/// Load WiFi credentials from NVS.
///
/// Returns `None` if nothing is stored or the stored blob is corrupted.
pub fn load_wifi_config(nvs: &EspNvs<NvsDefault>) -> Option<WifiConfig> {
    let mut buf = [0u8; MAX_CONFIG_BUFFER_SIZE];
    let bytes = nvs.get_raw(NVS_KEY, &mut buf).ok()??;
    WifiConfig::from_bytes(bytes).ok()
}

/// Save WiFi credentials to NVS.
pub fn save_wifi_config(nvs: &mut EspNvs<NvsDefault>, config: &WifiConfig) -> Result<(), EspError> {
    nvs.set_raw(NVS_KEY, &config.to_bytes())?;
    Ok(())
}

/// Clear stored credentials, reverting the next boot to the defaults.
pub fn clear_wifi_config(nvs: &mut EspNvs<NvsDefault>) -> Result<(), EspError> {
    nvs.remove(NVS_KEY)?;
    Ok(())
}
