//! PumpController against mock hardware: float servicing, peer commands,
//! and the always-report pump semantics.

use tankpump::app::commands::PeerCommand;
use tankpump::app::events::DeviceEvent;
use tankpump::app::service::PumpController;
use tankpump::app::state::{FloatLevel, OperatingMode, SwitchState, Tank, TimerEnable};
use tankpump::config::DeviceConfig;

use crate::mock_hw::{MockDelay, MockHardware, RecordingSink, channels};

fn started(hw: &mut MockHardware, sink: &mut RecordingSink) -> PumpController {
    let (_, _, chans) = channels();
    let mut ctl = PumpController::new(&DeviceConfig::default(), chans);
    ctl.start(hw, sink);
    ctl
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn auto_fill_runs_pump_when_source_full_and_destination_empty() {
    let mut hw = MockHardware::with_levels(false, true);
    let mut sink = RecordingSink::default();
    let ctl = started(&mut hw, &mut sink);

    assert_eq!(ctl.state().mode, OperatingMode::Auto);
    assert_eq!(ctl.state().pump, SwitchState::On);
    assert!(hw.pump_on());
}

#[test]
fn timer_gate_overrides_auto_fill() {
    let mut hw = MockHardware::with_levels(false, true);
    let mut sink = RecordingSink::default();
    let mut ctl = started(&mut hw, &mut sink);

    ctl.handle_command(PeerCommand::SetTimer(TimerEnable::Enabled), &mut hw, &mut sink);
    ctl.handle_command(PeerCommand::SetTimerOutput(SwitchState::Off), &mut hw, &mut sink);

    assert_eq!(ctl.state().pump, SwitchState::Off);
    assert!(!hw.pump_on());
}

#[test]
fn manual_timer_ignores_levels() {
    // Destination full, source empty: auto-fill would never run.
    let mut hw = MockHardware::with_levels(true, false);
    let mut sink = RecordingSink::default();
    let mut ctl = started(&mut hw, &mut sink);

    ctl.handle_command(PeerCommand::SetMode(OperatingMode::Manual), &mut hw, &mut sink);
    ctl.handle_command(PeerCommand::SetTimer(TimerEnable::Enabled), &mut hw, &mut sink);
    ctl.handle_command(PeerCommand::SetTimerOutput(SwitchState::On), &mut hw, &mut sink);

    assert!(hw.pump_on());
}

// ── Idempotent reporting ──────────────────────────────────────

#[test]
fn unchanged_decision_is_reported_every_time() {
    let mut hw = MockHardware::with_levels(false, true);
    let mut sink = RecordingSink::default();
    let mut ctl = started(&mut hw, &mut sink);
    sink.events.clear();
    hw.pump_writes.clear();

    ctl.handle_command(PeerCommand::SetMode(OperatingMode::Auto), &mut hw, &mut sink);
    ctl.handle_command(PeerCommand::SetMode(OperatingMode::Auto), &mut hw, &mut sink);

    assert_eq!(sink.pump_events(), vec![SwitchState::On, SwitchState::On]);
    assert_eq!(hw.pump_writes, vec![SwitchState::On, SwitchState::On]);
}

// ── Manual Pump_State gating ──────────────────────────────────

#[test]
fn direct_pump_command_only_in_fully_manual() {
    let mut hw = MockHardware::with_levels(true, false);
    let mut sink = RecordingSink::default();
    let mut ctl = started(&mut hw, &mut sink);
    sink.events.clear();
    hw.pump_writes.clear();

    // AUTO: ignored.
    ctl.handle_command(PeerCommand::SetPump(SwitchState::On), &mut hw, &mut sink);
    assert!(hw.pump_writes.is_empty());

    // MANUAL + ENABLED: the timer governs, ignored.
    ctl.handle_command(PeerCommand::SetMode(OperatingMode::Manual), &mut hw, &mut sink);
    ctl.handle_command(PeerCommand::SetTimer(TimerEnable::Enabled), &mut hw, &mut sink);
    let writes = hw.pump_writes.len();
    ctl.handle_command(PeerCommand::SetPump(SwitchState::On), &mut hw, &mut sink);
    assert_eq!(hw.pump_writes.len(), writes);

    // MANUAL + DISABLED: honoured and reported.
    ctl.handle_command(PeerCommand::SetTimer(TimerEnable::Disabled), &mut hw, &mut sink);
    sink.events.clear();
    ctl.handle_command(PeerCommand::SetPump(SwitchState::On), &mut hw, &mut sink);
    assert!(hw.pump_on());
    assert_eq!(sink.events, vec![DeviceEvent::PumpState(SwitchState::On)]);
}

#[test]
fn entering_fully_manual_leaves_pump_alone() {
    let mut hw = MockHardware::with_levels(false, true);
    let mut sink = RecordingSink::default();
    let mut ctl = started(&mut hw, &mut sink);
    hw.pump_writes.clear();
    sink.events.clear();

    ctl.handle_command(PeerCommand::SetMode(OperatingMode::Manual), &mut hw, &mut sink);

    assert!(hw.pump_writes.is_empty());
    assert!(sink.events.is_empty());
    assert_eq!(ctl.state().pump, SwitchState::On);
}

// ── Float servicing ───────────────────────────────────────────

#[test]
fn accepted_edge_settles_then_reports_then_decides() {
    let (oht, _ugt, chans) = channels();
    let config = DeviceConfig::default();
    let mut ctl = PumpController::new(&config, chans);
    let mut hw = MockHardware::with_levels(false, false);
    let mut sink = RecordingSink::default();
    let mut delay = MockDelay::default();
    ctl.start(&mut hw, &mut sink);
    sink.events.clear();

    // Source fills while destination stays empty.
    hw.underground_full = true;
    assert!(chans[1].detector.on_raw_edge(1_000));
    assert_eq!(ctl.service_sensors(&mut hw, &mut delay, &mut sink), 1);

    assert_eq!(delay.total_ms, u64::from(config.settle_ms));
    assert_eq!(
        sink.events,
        vec![
            DeviceEvent::UndergroundFloat(FloatLevel::Full.switch_state()),
            DeviceEvent::PumpState(SwitchState::On),
        ]
    );
    assert!(!oht.is_pending());
}

#[test]
fn both_pending_channels_are_serviced_overhead_first() {
    let (oht, ugt, chans) = channels();
    let mut ctl = PumpController::new(&DeviceConfig::default(), chans);
    let mut hw = MockHardware::default();
    let mut sink = RecordingSink::default();
    let mut delay = MockDelay::default();
    ctl.handle_command(PeerCommand::SetMode(OperatingMode::Manual), &mut hw, &mut sink);
    hw.reads.clear();

    // Underground fires first; service order is still fixed.
    ugt.on_raw_edge(10);
    oht.on_raw_edge(20);
    assert_eq!(ctl.service_sensors(&mut hw, &mut delay, &mut sink), 2);

    assert_eq!(hw.reads, vec![Tank::Overhead, Tank::Underground]);
    assert_eq!(sink.names(), vec!["OHT_FLOAT", "UGT_FLOAT"]);
    assert_eq!(ctl.service_sensors(&mut hw, &mut delay, &mut sink), 0);
}

#[test]
fn chatter_inside_window_yields_one_report() {
    let (oht, _ugt, chans) = channels();
    let mut ctl = PumpController::new(&DeviceConfig::default(), chans);
    let mut hw = MockHardware::default();
    let mut sink = RecordingSink::default();
    let mut delay = MockDelay::default();
    ctl.handle_command(PeerCommand::SetMode(OperatingMode::Manual), &mut hw, &mut sink);

    for (t, full) in [(100, true), (130, false), (170, true), (250, false), (290, true)] {
        hw.overhead_full = full;
        oht.on_raw_edge(t);
    }
    ctl.service_sensors(&mut hw, &mut delay, &mut sink);

    // Sampled after settling: the last raw level wins.
    assert_eq!(sink.events, vec![DeviceEvent::OverheadFloat(SwitchState::Off)]);
    assert_eq!(ctl.state().overhead, FloatLevel::Full);
}

#[test]
fn settle_delay_follows_config() {
    let (oht, _ugt, chans) = channels();
    let config = DeviceConfig {
        settle_ms: 750,
        ..DeviceConfig::default()
    };
    let mut ctl = PumpController::new(&config, chans);
    let mut hw = MockHardware::default();
    let mut sink = RecordingSink::default();
    let mut delay = MockDelay::default();

    oht.on_raw_edge(0);
    ctl.service_sensors(&mut hw, &mut delay, &mut sink);

    assert_eq!(delay.total_ms, 750);
}

#[test]
fn manual_initial_mode_skips_boot_decision() {
    let (_, _, chans) = channels();
    let config = DeviceConfig {
        initial_mode: OperatingMode::Manual,
        ..DeviceConfig::default()
    };
    let mut ctl = PumpController::new(&config, chans);
    let mut hw = MockHardware::with_levels(false, true);
    let mut sink = RecordingSink::default();

    ctl.start(&mut hw, &mut sink);

    assert!(hw.pump_writes.is_empty());
    assert_eq!(ctl.state().underground, FloatLevel::Full);
}
