//! Inbound commands from the peer.
//!
//! These are the decoded form of the peer's `{event, value}` messages. The
//! [`PumpController`](super::service::PumpController) interprets and acts
//! upon them.

use crate::error::CommandError;

use super::state::{OperatingMode, SwitchState, TimerEnable};

/// Commands the peer can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerCommand {
    /// Acknowledgement after the peer accepted the session.
    Welcome,

    /// Switch between float-driven and peer-driven operation.
    SetMode(OperatingMode),

    /// Enable or disable the timer gate.
    SetTimer(TimerEnable),

    /// Timer output computed by the peer.
    SetTimerOutput(SwitchState),

    /// Direct pump command. Only honoured in fully manual operation.
    SetPump(SwitchState),
}

impl PeerCommand {
    /// Every event name the peer may send that this device acts on.
    pub const EVENTS: [&'static str; 5] = ["welcome", "Mode", "Timer", "TimerOut", "Pump_State"];

    pub fn is_known(event: &str) -> bool {
        Self::EVENTS.contains(&event)
    }

    /// Map a wire event name and value to a command.
    ///
    /// Unknown event names yield `Ok(None)`. A known event with a value
    /// outside its closed set is an error.
    pub fn parse(event: &str, value: &str) -> Result<Option<Self>, CommandError> {
        let cmd = match event {
            "welcome" => Self::Welcome,
            "Mode" => Self::SetMode(OperatingMode::parse(value)?),
            "Timer" => Self::SetTimer(TimerEnable::parse(value)?),
            "TimerOut" => Self::SetTimerOutput(SwitchState::parse(value)?),
            "Pump_State" => Self::SetPump(SwitchState::parse(value)?),
            _ => return Ok(None),
        };
        Ok(Some(cmd))
    }
}
