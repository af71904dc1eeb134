//! Port traits, the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PumpController (domain)
//! ```
//!
//! Driven adapters (float inputs, pump relay, the peer link) implement these
//! traits. The [`PumpController`](super::service::PumpController) consumes
//! them via generics, so the domain core never touches hardware directly.
//!
//! Domain ports are infallible: adapters log and absorb their own failures.
//! Only [`Transport`] reports errors, because the session supervisor turns
//! them into reconnection scheduling.

use crate::error::TransportError;

use super::events::DeviceEvent;
use super::state::{FloatLevel, SwitchState, Tank};

// ───────────────────────────────────────────────────────────────
// Level port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain samples a settled float level through this.
pub trait LevelPort {
    fn read_level(&mut self, tank: Tank) -> FloatLevel;
}

// ───────────────────────────────────────────────────────────────
// Pump port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: drive the pump output.
///
/// Polarity is the adapter's concern; the domain speaks only ON/OFF.
pub trait PumpPort {
    fn set_pump(&mut self, state: SwitchState);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → peer)
// ───────────────────────────────────────────────────────────────

/// The domain emits [`DeviceEvent`]s through this port. The session
/// supervisor forwards them to the peer, or drops them while offline.
pub trait EventSink {
    fn emit(&mut self, event: &DeviceEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Milliseconds since boot. Wraps after ~49 days; callers compare with
/// `wrapping_sub`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: session ↔ peer)
// ───────────────────────────────────────────────────────────────

/// Capacity of one inbound text frame.
pub const INBOUND_FRAME_CAP: usize = 256;

/// One inbound text frame, copied out of the transport's receive buffer.
pub type InboundFrame = heapless::String<INBOUND_FRAME_CAP>;

/// A persistent, reconnectable text message channel to the peer.
///
/// Inbound frames are delivered on [`poll`](Transport::poll), never through
/// a callback into the domain.
pub trait Transport {
    /// Open a session. Blocks at most `timeout_ms`.
    fn connect(&mut self, url: &str, timeout_ms: u32) -> Result<(), TransportError>;

    /// Send one text frame.
    fn send(&mut self, text: &str) -> Result<(), TransportError>;

    /// Whether the session is still up. Non-blocking.
    fn is_alive(&self) -> bool;

    /// Next received frame, if any. Non-blocking.
    fn poll(&mut self) -> Option<InboundFrame>;

    /// Tear the session down. Safe to call when already closed.
    fn close(&mut self);
}
