//! Sensor subsystem: the two float switches.
//!
//! Each channel's GPIO ISR feeds a process-wide [`EdgeDetector`]. `static`
//! because ISR callbacks in ESP-IDF cannot capture closures.

pub mod float_switch;

pub use float_switch::{EdgeDetector, FloatChannel};

use crate::app::state::Tank;

/// Overhead tank edge detector, written by its GPIO ISR.
pub static OVERHEAD_EDGES: EdgeDetector = EdgeDetector::new();

/// Underground tank edge detector, written by its GPIO ISR.
pub static UNDERGROUND_EDGES: EdgeDetector = EdgeDetector::new();

/// Both device channels in service order: overhead first.
pub fn device_channels() -> [FloatChannel; 2] {
    [
        FloatChannel::new(Tank::Overhead, &OVERHEAD_EDGES),
        FloatChannel::new(Tank::Underground, &UNDERGROUND_EDGES),
    ]
}

/// Apply the configured debounce window to both detectors.
pub fn configure_debounce(debounce_ms: u32) {
    OVERHEAD_EDGES.set_debounce_ms(debounce_ms);
    UNDERGROUND_EDGES.set_debounce_ms(debounce_ms);
}
