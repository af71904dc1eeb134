//! Pump relay driver.
//!
//! On/off control through a single digital output. The relay module's
//! polarity is fixed at construction; every write goes through
//! [`pin_level`], so the ON/OFF to HIGH/LOW mapping never varies at runtime.
//!
//! ## Dual-target design
//!
//! Generic over [`OutputPin`]: on ESP-IDF the pin is a
//! [`RawOutputPin`](crate::drivers::hw_init::RawOutputPin); in tests any
//! recording pin works.

use embedded_hal::digital::OutputPin;

use crate::app::state::SwitchState;
use crate::error::ActuatorError;

/// Output level (`true` = HIGH) that puts the pump in `state`.
pub const fn pin_level(state: SwitchState, active_low: bool) -> bool {
    let on = matches!(state, SwitchState::On);
    on != active_low
}

pub struct PumpDriver<P: OutputPin> {
    pin: P,
    active_low: bool,
    state: SwitchState,
}

impl<P: OutputPin> PumpDriver<P> {
    /// Wrap an output already latched at the OFF level.
    pub fn new(pin: P, active_low: bool) -> Self {
        Self {
            pin,
            active_low,
            state: SwitchState::Off,
        }
    }

    pub fn set(&mut self, state: SwitchState) -> Result<(), ActuatorError> {
        let result = if pin_level(state, self.active_low) {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.state = state;
        Ok(())
    }

    pub fn state(&self) -> SwitchState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_on()
    }
}
