//! Decision engine.
//!
//! Pure function of the device state. Precedence, first match wins:
//!
//! | mode   | timer    | pump command                         |
//! |--------|----------|--------------------------------------|
//! | AUTO   | ENABLED  | timer output ON **and** auto-fill    |
//! | MANUAL | ENABLED  | timer output                         |
//! | AUTO   | DISABLED | auto-fill                            |
//! | MANUAL | DISABLED | none (the peer drives the pump)      |
//!
//! Sending the outcome is the caller's job; calling this twice is harmless.

use super::state::{DeviceState, FloatLevel, OperatingMode, SwitchState, TimerEnable};

/// Auto-fill condition: source tank full and destination tank not full.
pub fn auto_fill(overhead: FloatLevel, underground: FloatLevel) -> bool {
    !overhead.is_full() && underground.is_full()
}

/// Desired pump command, or `None` when the engine does not govern the pump.
pub fn decide(state: &DeviceState) -> Option<SwitchState> {
    let fill = auto_fill(state.overhead, state.underground);

    match (state.mode, state.timer.enabled) {
        (OperatingMode::Auto, TimerEnable::Enabled) => {
            Some(SwitchState::from_bool(state.timer.output.is_on() && fill))
        }
        (OperatingMode::Manual, TimerEnable::Enabled) => Some(state.timer.output),
        (OperatingMode::Auto, TimerEnable::Disabled) => Some(SwitchState::from_bool(fill)),
        (OperatingMode::Manual, TimerEnable::Disabled) => None,
    }
}
