//! Device configuration parameters
//!
//! Every value is compiled in: the device identity, the WiFi network, the
//! coordinating server and the control-loop timing. There is no config file
//! and nothing is persisted across power loss.

use core::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::adapters::wifi::validate_credentials;
use crate::app::state::OperatingMode;
use crate::error::Error;

/// Fixed device identity string. Reused for every session.
pub type DeviceId = heapless::String<16>;

/// Fully rendered connection URL.
pub type ServerUrl = heapless::String<96>;

/// Core device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    // --- Identity ---
    /// Identifier sent as the `clientId` connection parameter and in `register`.
    /// Must match one of the server's predefined clients.
    pub device_id: DeviceId,

    // --- Network ---
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
    /// Delay between WiFi association attempts at boot (milliseconds)
    pub wifi_retry_ms: u32,
    pub server_host: heapless::String<32>,
    pub server_port: u16,
    /// Upper bound on one connection handshake (milliseconds)
    pub connect_timeout_ms: u32,
    /// Fixed wait after a failed connection attempt (milliseconds)
    pub reconnect_backoff_ms: u32,

    // --- Float switches ---
    /// Minimum time between accepted edges on one channel (milliseconds)
    pub debounce_ms: u32,
    /// Guard delay before re-sampling a channel after an accepted edge (milliseconds)
    pub settle_ms: u32,

    // --- Control ---
    /// Mode in force until the peer sends its first `Mode` command
    pub initial_mode: OperatingMode,
    /// Yield between control-loop iterations (milliseconds)
    pub loop_interval_ms: u32,
}

fn fixed<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    let _ = out.push_str(s);
    out
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            // Identity
            device_id: fixed("device2"),

            // Network
            wifi_ssid: fixed("IoT-Gateway"),
            wifi_password: fixed("12345678"),
            wifi_retry_ms: 1000,
            server_host: fixed("192.168.4.1"),
            server_port: 81,
            connect_timeout_ms: 5000,
            reconnect_backoff_ms: 5000,

            // Float switches
            debounce_ms: 200,
            settle_ms: 500,

            // Control
            initial_mode: OperatingMode::Auto,
            loop_interval_ms: 10,
        }
    }
}

impl DeviceConfig {
    /// `ws://<host>:<port>/?clientId=<device_id>`
    pub fn server_url(&self) -> ServerUrl {
        let mut url = ServerUrl::new();
        // Capacity covers the longest host and id the field types allow.
        let _ = write!(
            url,
            "ws://{}:{}/?clientId={}",
            self.server_host, self.server_port, self.device_id
        );
        url
    }

    /// Reject values that would leave the device unable to run.
    pub fn validate(&self) -> Result<(), Error> {
        if self.device_id.is_empty() {
            return Err(Error::Config("device_id is empty"));
        }
        if !self
            .device_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(Error::Config("device_id must be URL-safe ASCII"));
        }
        validate_credentials(&self.wifi_ssid, &self.wifi_password)?;
        if self.server_host.is_empty() {
            return Err(Error::Config("server_host is empty"));
        }
        if self.server_port == 0 {
            return Err(Error::Config("server_port is zero"));
        }
        if self.debounce_ms == 0 {
            return Err(Error::Config("debounce_ms is zero"));
        }
        if self.settle_ms < self.debounce_ms {
            return Err(Error::Config("settle_ms shorter than debounce window"));
        }
        if self.reconnect_backoff_ms == 0 {
            return Err(Error::Config("reconnect_backoff_ms is zero"));
        }
        if self.connect_timeout_ms == 0 {
            return Err(Error::Config("connect_timeout_ms is zero"));
        }
        Ok(())
    }
}
