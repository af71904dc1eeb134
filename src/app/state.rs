//! Device state aggregate and its closed enumerations.
//!
//! [`DeviceState`] is the single owned blackboard that the decision engine
//! reads and the controller writes. It lives for the whole device session
//! and is only reset by a restart.
//!
//! Wire literals are case-sensitive; `parse` rejects anything else.

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Binary switch value used for the pump, the timer output and float reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwitchState {
    On,
    Off,
}

impl SwitchState {
    pub fn from_bool(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }

    pub fn is_on(self) -> bool {
        self == Self::On
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CommandError> {
        match value {
            "ON" => Ok(Self::On),
            "OFF" => Ok(Self::Off),
            _ => Err(CommandError::InvalidSwitch),
        }
    }
}

/// Who governs the pump: the float logic or the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperatingMode {
    Manual,
    Auto,
}

impl OperatingMode {
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Manual => "MANUAL",
            Self::Auto => "AUTO",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CommandError> {
        match value {
            "AUTO" => Ok(Self::Auto),
            "MANUAL" => Ok(Self::Manual),
            _ => Err(CommandError::InvalidMode),
        }
    }
}

/// Whether the peer-driven timer gates the pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimerEnable {
    Enabled,
    Disabled,
}

impl TimerEnable {
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Enabled => "ENABLED",
            Self::Disabled => "DISABLED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CommandError> {
        match value {
            "ENABLED" => Ok(Self::Enabled),
            "DISABLED" => Ok(Self::Disabled),
            _ => Err(CommandError::InvalidTimerEnable),
        }
    }
}

/// Settled level of one float switch.
///
/// The switch is pull-up biased: a HIGH pin means the tank is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatLevel {
    Full,
    Empty,
}

impl FloatLevel {
    pub fn from_pin(high: bool) -> Self {
        if high { Self::Full } else { Self::Empty }
    }

    pub fn is_full(self) -> bool {
        self == Self::Full
    }

    /// Reported value for `OHT_FLOAT` / `UGT_FLOAT`: the switch contact,
    /// which is the inverted pin. A full tank reports `OFF`.
    pub fn switch_state(self) -> SwitchState {
        match self {
            Self::Full => SwitchState::Off,
            Self::Empty => SwitchState::On,
        }
    }
}

/// The two monitored reservoirs. Declaration order is the service order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tank {
    /// Destination reservoir (OHT).
    Overhead,
    /// Source reservoir (UGT).
    Underground,
}

impl Tank {
    pub const ALL: [Tank; 2] = [Tank::Overhead, Tank::Underground];
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Peer-owned timer state. The device never computes either field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub enabled: TimerEnable,
    pub output: SwitchState,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            enabled: TimerEnable::Disabled,
            output: SwitchState::Off,
        }
    }
}

/// Everything the controller knows about the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    pub overhead: FloatLevel,
    pub underground: FloatLevel,
    pub mode: OperatingMode,
    pub timer: TimerState,
    /// Last commanded pump state.
    pub pump: SwitchState,
}

impl DeviceState {
    pub fn new(mode: OperatingMode) -> Self {
        Self {
            overhead: FloatLevel::Empty,
            underground: FloatLevel::Empty,
            mode,
            timer: TimerState::default(),
            pump: SwitchState::Off,
        }
    }

    pub fn level(&self, tank: Tank) -> FloatLevel {
        match tank {
            Tank::Overhead => self.overhead,
            Tank::Underground => self.underground,
        }
    }

    pub fn set_level(&mut self, tank: Tank, level: FloatLevel) {
        match tank {
            Tank::Overhead => self.overhead = level,
            Tank::Underground => self.underground = level,
        }
    }

    /// Manual mode with the timer off: the peer drives the pump directly.
    pub fn is_fully_manual(&self) -> bool {
        self.mode == OperatingMode::Manual && self.timer.enabled == TimerEnable::Disabled
    }
}
