//! Hardware adapter, bridges the board to domain port traits.
//!
//! Owns the pump driver and reads the float inputs, exposing them through
//! [`LevelPort`] and [`PumpPort`]. On non-espidf targets the GPIO helpers
//! are cfg-gated simulation stubs.

use embedded_hal::digital::OutputPin;
use log::error;

use crate::app::ports::{LevelPort, PumpPort};
use crate::app::state::{FloatLevel, SwitchState, Tank};
use crate::drivers::hw_init::{self, RawOutputPin};
use crate::drivers::pump::PumpDriver;
use crate::error::Result;
use crate::pins;

/// Concrete adapter that combines the board I/O behind port traits.
pub struct HardwareAdapter<P: OutputPin = RawOutputPin> {
    pump: PumpDriver<P>,
}

impl HardwareAdapter<RawOutputPin> {
    /// Adapter over the board's relay pin, driven OFF. Call after
    /// [`hw_init::init_peripherals`].
    pub fn board() -> Result<Self> {
        let mut pump = PumpDriver::new(RawOutputPin(pins::PUMP_RELAY_GPIO), pins::PUMP_ACTIVE_LOW);
        pump.set(SwitchState::Off)?;
        Ok(Self::new(pump))
    }
}

impl<P: OutputPin> HardwareAdapter<P> {
    pub fn new(pump: PumpDriver<P>) -> Self {
        Self { pump }
    }

    pub fn pump(&self) -> &PumpDriver<P> {
        &self.pump
    }
}

fn float_gpio(tank: Tank) -> i32 {
    match tank {
        Tank::Overhead => pins::OVERHEAD_FLOAT_GPIO,
        Tank::Underground => pins::UNDERGROUND_FLOAT_GPIO,
    }
}

// ── LevelPort implementation ──────────────────────────────────

impl<P: OutputPin> LevelPort for HardwareAdapter<P> {
    fn read_level(&mut self, tank: Tank) -> FloatLevel {
        FloatLevel::from_pin(hw_init::gpio_read(float_gpio(tank)))
    }
}

// ── PumpPort implementation ───────────────────────────────────

impl<P: OutputPin> PumpPort for HardwareAdapter<P> {
    fn set_pump(&mut self, state: SwitchState) {
        if let Err(e) = self.pump.set(state) {
            error!("Pump {}: {e}", state.as_wire());
        }
    }
}
