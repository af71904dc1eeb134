//! WiFi station-mode adapter.
//!
//! Association is a boot-time prerequisite, not part of the control loop:
//! [`join`] blocks, retrying at a fixed interval until the access point
//! accepts us and DHCP hands out an address.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::BlockingWifi`.
//! - **all other targets**: only the credential checks compile.

use crate::error::Error;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// SSID 1-32 printable ASCII bytes; password empty (open) or 8-64 bytes.
pub fn validate_credentials(ssid: &str, password: &str) -> Result<(), Error> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(Error::Config("wifi_ssid must be 1-32 printable ASCII bytes"));
    }
    if !password.is_empty() && !(8..=64).contains(&password.len()) {
        return Err(Error::Config("wifi_password must be empty or 8-64 bytes"));
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Station join
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use platform::{StationWifi, join};

#[cfg(target_os = "espidf")]
mod platform {
    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_hal::modem::Modem;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::sys::EspError;
    use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
    use log::{info, warn};

    use crate::config::DeviceConfig;

    pub type StationWifi = BlockingWifi<EspWifi<'static>>;

    /// Join the configured access point. Returns once an IP is assigned.
    pub fn join(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        config: &DeviceConfig,
    ) -> Result<StationWifi, EspError> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs)?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

        let auth_method = if config.wifi_password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        // Lengths were checked by DeviceConfig::validate and the field
        // capacities match the driver's.
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: config.wifi_ssid.as_str().try_into().unwrap_or_default(),
            password: config.wifi_password.as_str().try_into().unwrap_or_default(),
            auth_method,
            ..Default::default()
        }))?;
        wifi.start()?;

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            info!("WiFi: connecting to '{}' (attempt {})", config.wifi_ssid, attempt);
            match wifi.connect() {
                Ok(()) => break,
                Err(e) => {
                    warn!("WiFi: connect failed: {e}, retrying in {} ms", config.wifi_retry_ms);
                    FreeRtos::delay_ms(config.wifi_retry_ms);
                }
            }
        }
        wifi.wait_netif_up()?;

        let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
        info!("WiFi: connected, IP {}", ip_info.ip);
        Ok(wifi)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
