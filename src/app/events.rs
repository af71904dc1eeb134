//! Outbound device events.
//!
//! The [`PumpController`](super::service::PumpController) and the session
//! supervisor emit these through the [`EventSink`](super::ports::EventSink)
//! port. Every event has the same wire shape: a name and one string value.

use crate::config::DeviceId;

use super::state::{FloatLevel, SwitchState, Tank};

/// Structured events the device reports to its peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// First message of every session, carries the fixed device identity.
    Register(DeviceId),

    /// Overhead tank float switch state.
    OverheadFloat(SwitchState),

    /// Underground tank float switch state.
    UndergroundFloat(SwitchState),

    /// Outcome of a pump command, sent even when unchanged.
    PumpState(SwitchState),
}

impl DeviceEvent {
    /// Float report for `tank` at the given settled level.
    pub fn float(tank: Tank, level: FloatLevel) -> Self {
        match tank {
            Tank::Overhead => Self::OverheadFloat(level.switch_state()),
            Tank::Underground => Self::UndergroundFloat(level.switch_state()),
        }
    }

    /// Wire event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Register(_) => "register",
            Self::OverheadFloat(_) => "OHT_FLOAT",
            Self::UndergroundFloat(_) => "UGT_FLOAT",
            Self::PumpState(_) => "PumpState",
        }
    }

    /// Wire event value.
    pub fn value(&self) -> &str {
        match self {
            Self::Register(id) => id.as_str(),
            Self::OverheadFloat(s) | Self::UndergroundFloat(s) | Self::PumpState(s) => {
                s.as_wire()
            }
        }
    }
}
