//! Pump controller, the hexagonal core.
//!
//! [`PumpController`] owns the [`DeviceState`] aggregate. It exposes a
//! hardware-agnostic API; all I/O flows through port traits injected at call
//! sites, making the whole controller testable with mock adapters.
//!
//! ```text
//!  LevelPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                │     PumpController     │
//!   PumpPort ◀── │  DeviceState · decide  │
//!                └────────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::config::DeviceConfig;
use crate::sensors::FloatChannel;

use super::commands::PeerCommand;
use super::decision::decide;
use super::events::DeviceEvent;
use super::ports::{EventSink, LevelPort, PumpPort};
use super::state::{DeviceState, OperatingMode, SwitchState, Tank};

// ───────────────────────────────────────────────────────────────
// PumpController
// ───────────────────────────────────────────────────────────────

pub struct PumpController {
    state: DeviceState,
    /// Service order is array order.
    channels: [FloatChannel; 2],
    settle_ms: u32,
}

impl PumpController {
    /// Construct the controller. Does not touch hardware; call
    /// [`start`](Self::start) next.
    pub fn new(config: &DeviceConfig, channels: [FloatChannel; 2]) -> Self {
        Self {
            state: DeviceState::new(config.initial_mode),
            channels,
            settle_ms: config.settle_ms,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Seed both settled levels from the pins and run one decision pass.
    pub fn start(&mut self, hw: &mut (impl LevelPort + PumpPort), sink: &mut impl EventSink) {
        for tank in Tank::ALL {
            let level = hw.read_level(tank);
            self.state.set_level(tank, level);
        }
        info!(
            "PumpController started: mode={:?} OHT={:?} UGT={:?}",
            self.state.mode, self.state.overhead, self.state.underground
        );
        self.evaluate(hw, sink);
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Service at most one pending edge per float channel, in channel order.
    ///
    /// For each pending channel: wait the settle delay, re-sample the level,
    /// report it, and in AUTO mode re-run the decision. Returns the number of
    /// channels serviced.
    ///
    /// The `hw` parameter satisfies **both** [`LevelPort`] and [`PumpPort`],
    /// which avoids a double mutable borrow.
    pub fn service_sensors(
        &mut self,
        hw: &mut (impl LevelPort + PumpPort),
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut serviced = 0;
        for channel in self.channels {
            if !channel.detector.take_pending() {
                continue;
            }
            serviced += 1;

            delay.delay_ms(self.settle_ms);
            let level = hw.read_level(channel.tank);
            self.state.set_level(channel.tank, level);
            info!("{:?} float settled: {:?}", channel.tank, level);
            sink.emit(&DeviceEvent::float(channel.tank, level));

            if self.state.mode == OperatingMode::Auto {
                self.evaluate(hw, sink);
            }
        }
        serviced
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a decoded peer command.
    pub fn handle_command(
        &mut self,
        cmd: PeerCommand,
        pump: &mut impl PumpPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            PeerCommand::Welcome => {
                info!("Peer acknowledged session");
            }
            PeerCommand::SetMode(mode) => {
                self.state.mode = mode;
                info!("Mode -> {}", mode.as_wire());
                self.evaluate(pump, sink);
            }
            PeerCommand::SetTimer(enabled) => {
                self.state.timer.enabled = enabled;
                info!("Timer -> {}", enabled.as_wire());
                self.evaluate(pump, sink);
            }
            PeerCommand::SetTimerOutput(output) => {
                self.state.timer.output = output;
                debug!("Timer output -> {}", output.as_wire());
                self.evaluate(pump, sink);
            }
            PeerCommand::SetPump(state) => {
                if self.state.is_fully_manual() {
                    self.set_pump(state, pump, sink);
                } else {
                    debug!(
                        "Pump_State {} ignored: mode={} timer={}",
                        state.as_wire(),
                        self.state.mode.as_wire(),
                        self.state.timer.enabled.as_wire()
                    );
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    // ── Internal ──────────────────────────────────────────────

    /// Run the decision engine and apply its outcome, if any.
    fn evaluate(&mut self, pump: &mut impl PumpPort, sink: &mut impl EventSink) {
        if let Some(cmd) = decide(&self.state) {
            self.set_pump(cmd, pump, sink);
        }
    }

    /// Drive the pump and report it, unconditionally.
    fn set_pump(&mut self, state: SwitchState, pump: &mut impl PumpPort, sink: &mut impl EventSink) {
        if state != self.state.pump {
            info!("Pump {} -> {}", self.state.pump.as_wire(), state.as_wire());
        }
        pump.set_pump(state);
        self.state.pump = state;
        sink.emit(&DeviceEvent::PumpState(state));
    }
}
