//! Debounced float switch edge capture.
//!
//! A float switch chatters while the water surface settles. The GPIO ISR
//! calls [`EdgeDetector::on_raw_edge`] on every transition; the detector
//! accepts an edge only when more than the debounce window has elapsed since
//! the previously accepted one, and then raises a single-slot pending flag.
//! The main loop consumes that flag with [`EdgeDetector::take_pending`] and
//! re-samples the pin itself after a settle delay.
//!
//! The ISR is the only writer of the timestamp pair and the only setter of
//! the flag; the main loop is the only clearer. Plain atomics suffice and no
//! lock is ever taken in interrupt context.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::app::state::Tank;

/// Debounce window in effect until [`EdgeDetector::set_debounce_ms`] runs.
pub const DEFAULT_DEBOUNCE_MS: u32 = 200;

/// Lock-free, ISR-safe edge debouncer for one channel.
pub struct EdgeDetector {
    pending: AtomicBool,
    has_accepted: AtomicBool,
    last_accepted_ms: AtomicU32,
    debounce_ms: AtomicU32,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            has_accepted: AtomicBool::new(false),
            last_accepted_ms: AtomicU32::new(0),
            debounce_ms: AtomicU32::new(DEFAULT_DEBOUNCE_MS),
        }
    }

    /// Set the debounce window. Call at boot, before interrupts are enabled.
    pub fn set_debounce_ms(&self, ms: u32) {
        self.debounce_ms.store(ms, Ordering::Relaxed);
    }

    /// Record a raw edge at `now_ms` (milliseconds since boot, wrapping).
    ///
    /// Safe to call from interrupt context. Returns `true` if the edge was
    /// accepted.
    pub fn on_raw_edge(&self, now_ms: u32) -> bool {
        if self.has_accepted.load(Ordering::Acquire) {
            let last = self.last_accepted_ms.load(Ordering::Acquire);
            if now_ms.wrapping_sub(last) <= self.debounce_ms.load(Ordering::Relaxed) {
                return false;
            }
        }
        self.last_accepted_ms.store(now_ms, Ordering::Release);
        self.has_accepted.store(true, Ordering::Release);
        self.pending.store(true, Ordering::Release);
        true
    }

    /// Consume the pending flag. At most one event is ever pending.
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// A monitored tank paired with the detector its ISR feeds.
#[derive(Clone, Copy)]
pub struct FloatChannel {
    pub tank: Tank,
    pub detector: &'static EdgeDetector,
}

impl FloatChannel {
    pub const fn new(tank: Tank, detector: &'static EdgeDetector) -> Self {
        Self { tank, detector }
    }
}
