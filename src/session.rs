//! Connection supervisor.
//!
//! Owns the session with the peer and gates all traffic through it.
//!
//! ```text
//!   Disconnected ──(retry due)──▶ Connecting ──ok──▶ Connected
//!        ▲                            │                  │
//!        └──── fail: backoff ─────────┘                  │
//!        └──── live loss: retry on next call ────────────┘
//! ```
//!
//! Retries are scheduled, never slept: [`SessionSupervisor::maintain`] is
//! called once per control-loop iteration and returns immediately unless an
//! attempt is due. Every successful connection runs the resync sequence:
//! `register`, then `OHT_FLOAT`, then `UGT_FLOAT`.
//!
//! Outbound events emitted while the link is down are dropped, not queued.

use log::{debug, info, warn};

use crate::app::events::DeviceEvent;
use crate::app::ports::{Clock, EventSink, InboundFrame, Transport};
use crate::app::state::{DeviceState, Tank};
use crate::config::{DeviceConfig, DeviceId, ServerUrl};
use crate::error::Error;
use crate::protocol::encode_outbound;

// ───────────────────────────────────────────────────────────────
// States and reports
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

/// What a [`SessionSupervisor::maintain`] call did, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// A connection attempt succeeded and the resync sequence was sent.
    Established,
    /// A live session was found dead. The next call retries.
    Lost,
    /// A connection attempt failed. The next attempt waits the backoff.
    ConnectFailed,
}

/// Running link counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub attempts: u32,
    pub sessions: u32,
    pub dropped_events: u32,
    /// Most recent connect, encode or send failure.
    pub last_error: Option<Error>,
}

/// `true` once `now` has reached `deadline`, across the `u32` wrap.
fn deadline_reached(now: u32, deadline: u32) -> bool {
    now.wrapping_sub(deadline) < (1 << 31)
}

// ───────────────────────────────────────────────────────────────
// Supervisor
// ───────────────────────────────────────────────────────────────

pub struct SessionSupervisor<T: Transport> {
    transport: T,
    url: ServerUrl,
    device_id: DeviceId,
    connect_timeout_ms: u32,
    backoff_ms: u32,
    state: LinkState,
    /// `None` means attempt on the next call.
    retry_at: Option<u32>,
    stats: LinkStats,
}

impl<T: Transport> SessionSupervisor<T> {
    /// The first [`maintain`](Self::maintain) call attempts a connection.
    pub fn new(transport: T, config: &DeviceConfig) -> Self {
        Self {
            transport,
            url: config.server_url(),
            device_id: config.device_id.clone(),
            connect_timeout_ms: config.connect_timeout_ms,
            backoff_ms: config.reconnect_backoff_ms,
            state: LinkState::Disconnected,
            retry_at: None,
            stats: LinkStats::default(),
        }
    }

    /// Detect loss, run due connection attempts, resync on success.
    pub fn maintain(&mut self, clock: &impl Clock, device: &DeviceState) -> Option<LinkEvent> {
        match self.state {
            LinkState::Connected => {
                if self.transport.is_alive() {
                    return None;
                }
                self.transport.close();
                self.state = LinkState::Disconnected;
                self.retry_at = None;
                warn!("Link lost, reconnecting (stats {:?})", self.stats);
                Some(LinkEvent::Lost)
            }
            LinkState::Disconnected | LinkState::Connecting => {
                if let Some(at) = self.retry_at {
                    if !deadline_reached(clock.now_ms(), at) {
                        return None;
                    }
                }
                Some(self.attempt(clock, device))
            }
        }
    }

    fn attempt(&mut self, clock: &impl Clock, device: &DeviceState) -> LinkEvent {
        self.state = LinkState::Connecting;
        self.stats.attempts = self.stats.attempts.wrapping_add(1);
        info!("Connecting to {} (attempt {})", self.url, self.stats.attempts);

        match self.transport.connect(&self.url, self.connect_timeout_ms) {
            Ok(()) => {
                self.state = LinkState::Connected;
                self.retry_at = None;
                self.stats.sessions = self.stats.sessions.wrapping_add(1);
                info!("Link established (session {})", self.stats.sessions);
                self.resync(device);
                LinkEvent::Established
            }
            Err(e) => {
                self.stats.last_error = Some(e.into());
                self.transport.close();
                self.state = LinkState::Disconnected;
                self.retry_at = Some(clock.now_ms().wrapping_add(self.backoff_ms));
                warn!("Connect failed: {e}, retrying in {} ms", self.backoff_ms);
                LinkEvent::ConnectFailed
            }
        }
    }

    /// Bring the peer's view up to date after a (re)connect.
    fn resync(&mut self, device: &DeviceState) {
        let register = DeviceEvent::Register(self.device_id.clone());
        self.emit(&register);
        for tank in Tank::ALL {
            self.emit(&DeviceEvent::float(tank, device.level(tank)));
        }
    }

    /// Next inbound frame, only while connected.
    pub fn next_inbound(&mut self) -> Option<InboundFrame> {
        if self.state != LinkState::Connected {
            return None;
        }
        self.transport.poll()
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Next scheduled attempt, if one is pending a backoff.
    pub fn retry_at(&self) -> Option<u32> {
        self.retry_at
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn drop_event(&mut self, event: &DeviceEvent) {
        self.stats.dropped_events = self.stats.dropped_events.wrapping_add(1);
        debug!("Offline, dropped {}={}", event.name(), event.value());
    }
}

// ───────────────────────────────────────────────────────────────
// EventSink
// ───────────────────────────────────────────────────────────────

impl<T: Transport> EventSink for SessionSupervisor<T> {
    fn emit(&mut self, event: &DeviceEvent) {
        if self.state != LinkState::Connected {
            self.drop_event(event);
            return;
        }
        let frame = match encode_outbound(event) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Cannot encode {}: {e}", event.name());
                self.stats.last_error = Some(e.into());
                return;
            }
        };
        match self.transport.send(&frame) {
            Ok(()) => debug!("-> {frame}"),
            // Loss is picked up by the next maintain() liveness check.
            Err(e) => {
                warn!("Send {} failed: {e}", event.name());
                self.stats.last_error = Some(e.into());
                self.drop_event(event);
            }
        }
    }
}
