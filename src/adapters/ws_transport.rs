//! WebSocket transport adapter.
//!
//! Implements the [`Transport`] port.
//!
//! ## Threading
//!
//! The ESP-IDF WebSocket client runs its own task and reports through a
//! callback. The callback never touches device state: it flips
//! [`LINK_UP`] and pushes text frames into [`INBOX`], a bounded
//! `embassy-sync` channel that the control loop drains on
//! [`Transport::poll`]. A full inbox drops the newest frame.
//!
//! ```text
//! ┌──────────────┐  InboundFrame  ┌──────────────┐
//! │   WS task    │───────────────▶│ Control loop │
//! │  (callback)  │    INBOX (8)   │  poll()      │
//! └──────────────┘                └──────────────┘
//! ```
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::ws::client::EspWebSocketClient`
//!   with auto-reconnect disabled; the session supervisor owns reconnection.
//! - **all other targets**: a loopback simulation. Connect succeeds, sent
//!   frames are logged, inbound frames are injected with
//!   [`sim_push_inbound`].

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::ports::{InboundFrame, Transport};
use crate::error::TransportError;

/// Channel depth for inbound frames.
const INBOX_DEPTH: usize = 8;

/// Inbound frames: WS task → control loop.
static INBOX: Channel<CriticalSectionRawMutex, InboundFrame, INBOX_DEPTH> = Channel::new();

/// Written by the WS task on connect/disconnect, read by the control loop.
static LINK_UP: AtomicBool = AtomicBool::new(false);

/// Copy a received text frame into the inbox. Runs on the WS task.
fn deliver(text: &str) -> Result<(), TransportError> {
    let mut frame = InboundFrame::new();
    frame
        .push_str(text)
        .map_err(|()| TransportError::FrameTooLarge)?;
    if INBOX.try_send(frame).is_err() {
        warn!("ws: inbox full, frame dropped");
    }
    Ok(())
}

fn drain_inbox() {
    while INBOX.try_receive().is_ok() {}
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod platform {
    use core::sync::atomic::Ordering;
    use core::time::Duration;

    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_svc::io::EspIOError;
    use esp_idf_svc::ws::FrameType;
    use esp_idf_svc::ws::client::{
        EspWebSocketClient, EspWebSocketClientConfig, WebSocketEvent, WebSocketEventType,
    };
    use log::{debug, info, warn};

    use super::{LINK_UP, deliver};
    use crate::error::TransportError;

    /// How often `connect` re-checks the link flag while waiting.
    const CONNECT_POLL_MS: u32 = 10;
    /// Send timeout handed to the client.
    const SEND_TIMEOUT: Duration = Duration::from_secs(2);

    fn on_event(event: &Result<WebSocketEvent<'_>, EspIOError>) {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!("ws: client error {e:?}");
                LINK_UP.store(false, Ordering::Release);
                return;
            }
        };
        match event.event_type {
            WebSocketEventType::Connected => {
                info!("ws: connected");
                LINK_UP.store(true, Ordering::Release);
            }
            WebSocketEventType::Disconnected
            | WebSocketEventType::Close(_)
            | WebSocketEventType::Closed => {
                info!("ws: disconnected");
                LINK_UP.store(false, Ordering::Release);
            }
            WebSocketEventType::Text(text) => {
                if let Err(e) = deliver(text) {
                    warn!("ws: dropping {}-byte frame: {e}", text.len());
                }
            }
            WebSocketEventType::Binary(data) => {
                debug!("ws: ignoring {}-byte binary frame", data.len());
            }
            _ => {}
        }
    }

    pub struct Client {
        inner: Option<EspWebSocketClient<'static>>,
    }

    impl Client {
        pub const fn new() -> Self {
            Self { inner: None }
        }

        pub fn connect(&mut self, url: &str, timeout_ms: u32) -> Result<(), TransportError> {
            let config = EspWebSocketClientConfig {
                disable_auto_reconnect: true,
                ..Default::default()
            };
            let client = EspWebSocketClient::new(url, &config, SEND_TIMEOUT, on_event)
                .map_err(|e| {
                    warn!("ws: client init failed: {e:?}");
                    TransportError::ConnectFailed
                })?;
            // Keep the client alive while waiting; dropping it stops the task.
            self.inner = Some(client);

            let mut waited = 0;
            while !LINK_UP.load(Ordering::Acquire) {
                if waited >= timeout_ms {
                    return Err(TransportError::ConnectFailed);
                }
                FreeRtos::delay_ms(CONNECT_POLL_MS);
                waited += CONNECT_POLL_MS;
            }
            Ok(())
        }

        pub fn send(&mut self, text: &str) -> Result<(), TransportError> {
            let client = self.inner.as_mut().ok_or(TransportError::NotConnected)?;
            client
                .send(FrameType::Text(false), text.as_bytes())
                .map_err(|_| TransportError::SendFailed)
        }

        pub fn is_alive(&self) -> bool {
            LINK_UP.load(Ordering::Acquire)
                && self.inner.as_ref().is_some_and(EspWebSocketClient::is_connected)
        }

        pub fn close(&mut self) {
            self.inner = None;
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod platform {
    use core::sync::atomic::Ordering;

    use log::info;

    use super::LINK_UP;
    use crate::error::TransportError;

    pub struct Client {
        open: bool,
    }

    impl Client {
        pub const fn new() -> Self {
            Self { open: false }
        }

        pub fn connect(&mut self, url: &str, _timeout_ms: u32) -> Result<(), TransportError> {
            info!("ws(sim): connected to {url}");
            self.open = true;
            LINK_UP.store(true, Ordering::Release);
            Ok(())
        }

        pub fn send(&mut self, text: &str) -> Result<(), TransportError> {
            if !self.open {
                return Err(TransportError::NotConnected);
            }
            info!("ws(sim) -> {text}");
            Ok(())
        }

        pub fn is_alive(&self) -> bool {
            self.open && LINK_UP.load(Ordering::Acquire)
        }

        pub fn close(&mut self) {
            self.open = false;
        }
    }
}

/// Inject an inbound frame as if the peer had sent it.
#[cfg(not(target_os = "espidf"))]
pub fn sim_push_inbound(text: &str) -> Result<(), TransportError> {
    deliver(text)
}

/// Simulate the peer dropping the connection.
#[cfg(not(target_os = "espidf"))]
pub fn sim_drop_link() {
    LINK_UP.store(false, Ordering::Release);
}

// ───────────────────────────────────────────────────────────────
// Transport
// ───────────────────────────────────────────────────────────────

/// The device's single link to the peer.
pub struct WsTransport {
    client: platform::Client,
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl WsTransport {
    pub const fn new() -> Self {
        Self { client: platform::Client::new() }
    }
}

impl Transport for WsTransport {
    fn connect(&mut self, url: &str, timeout_ms: u32) -> Result<(), TransportError> {
        self.close();
        // Frames from a previous session are stale.
        drain_inbox();
        let result = self.client.connect(url, timeout_ms);
        if result.is_err() {
            self.close();
        }
        result
    }

    fn send(&mut self, text: &str) -> Result<(), TransportError> {
        if !self.is_alive() {
            return Err(TransportError::NotConnected);
        }
        self.client.send(text)
    }

    fn is_alive(&self) -> bool {
        self.client.is_alive()
    }

    fn poll(&mut self) -> Option<InboundFrame> {
        INBOX.try_receive().ok()
    }

    fn close(&mut self) {
        self.client.close();
        LINK_UP.store(false, Ordering::Release);
    }
}
