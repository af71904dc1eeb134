//! SessionSupervisor against a mock transport: connect, backoff, loss
//! detection, resync and offline drop.

use tankpump::app::commands::PeerCommand;
use tankpump::app::events::DeviceEvent;
use tankpump::app::ports::EventSink;
use tankpump::app::service::PumpController;
use tankpump::app::state::{DeviceState, FloatLevel, OperatingMode, SwitchState};
use tankpump::config::DeviceConfig;
use tankpump::error::{Error, TransportError};
use tankpump::protocol::decode_inbound;
use tankpump::session::{LinkEvent, LinkState, SessionSupervisor};

use crate::mock_hw::{MockClock, MockDelay, MockHardware, MockTransport, channels};

fn pair(event: &str, value: &str) -> (String, String) {
    (event.to_string(), value.to_string())
}

fn levels(overhead: FloatLevel, underground: FloatLevel) -> DeviceState {
    let mut s = DeviceState::new(OperatingMode::Auto);
    s.overhead = overhead;
    s.underground = underground;
    s
}

// ── Connect + resync ──────────────────────────────────────────

#[test]
fn first_maintain_connects_with_client_id() {
    let clock = MockClock::at(0);
    let mut link = SessionSupervisor::new(MockTransport::default(), &DeviceConfig::default());
    assert_eq!(link.state(), LinkState::Disconnected);

    let ev = link.maintain(&clock, &DeviceState::new(OperatingMode::Auto));

    assert_eq!(ev, Some(LinkEvent::Established));
    assert!(link.is_connected());
    assert_eq!(
        link.transport().connect_urls,
        vec!["ws://192.168.4.1:81/?clientId=device2".to_string()]
    );
}

#[test]
fn resync_is_exactly_register_then_floats() {
    let clock = MockClock::at(0);
    let mut link = SessionSupervisor::new(MockTransport::default(), &DeviceConfig::default());

    link.maintain(&clock, &levels(FloatLevel::Empty, FloatLevel::Full));

    assert_eq!(
        link.transport().sent_pairs(),
        vec![
            pair("register", "device2"),
            pair("OHT_FLOAT", "ON"),
            pair("UGT_FLOAT", "OFF"),
        ]
    );
}

#[test]
fn healthy_link_is_left_alone() {
    let clock = MockClock::at(0);
    let mut link = SessionSupervisor::new(MockTransport::default(), &DeviceConfig::default());
    let state = DeviceState::new(OperatingMode::Auto);
    link.maintain(&clock, &state);

    for _ in 0..10 {
        clock.advance(10);
        assert_eq!(link.maintain(&clock, &state), None);
    }
    assert_eq!(link.transport().connect_urls.len(), 1);
    assert_eq!(link.transport().sent.len(), 3);
}

// ── Backoff ───────────────────────────────────────────────────

#[test]
fn failed_connect_waits_fixed_backoff() {
    let clock = MockClock::at(1_000);
    let mut link = SessionSupervisor::new(MockTransport::refusing(), &DeviceConfig::default());
    let state = DeviceState::new(OperatingMode::Auto);

    assert_eq!(link.maintain(&clock, &state), Some(LinkEvent::ConnectFailed));
    assert_eq!(link.retry_at(), Some(6_000));
    assert_eq!(
        link.stats().last_error,
        Some(Error::Transport(TransportError::ConnectFailed))
    );

    clock.set(5_999);
    assert_eq!(link.maintain(&clock, &state), None);
    assert_eq!(link.transport().connect_urls.len(), 1);

    clock.set(6_000);
    assert_eq!(link.maintain(&clock, &state), Some(LinkEvent::ConnectFailed));
    assert_eq!(link.transport().connect_urls.len(), 2);
    assert_eq!(link.retry_at(), Some(11_000));
}

#[test]
fn retries_forever_without_growing_backoff() {
    let clock = MockClock::at(0);
    let mut link = SessionSupervisor::new(MockTransport::refusing(), &DeviceConfig::default());
    let state = DeviceState::new(OperatingMode::Auto);

    for attempt in 0..50u32 {
        clock.set(attempt * 5_000);
        assert_eq!(link.maintain(&clock, &state), Some(LinkEvent::ConnectFailed));
    }
    assert_eq!(link.stats().attempts, 50);

    link.transport_mut().refuse = false;
    clock.set(50 * 5_000);
    assert_eq!(link.maintain(&clock, &state), Some(LinkEvent::Established));
    assert_eq!(link.stats().sessions, 1);
}

#[test]
fn backoff_survives_uptime_wrap() {
    let clock = MockClock::at(u32::MAX - 1_000);
    let mut link = SessionSupervisor::new(MockTransport::refusing(), &DeviceConfig::default());
    let state = DeviceState::new(OperatingMode::Auto);

    link.maintain(&clock, &state);
    clock.advance(2_000);
    assert_eq!(link.maintain(&clock, &state), None);
    clock.advance(3_000);
    assert_eq!(link.maintain(&clock, &state), Some(LinkEvent::ConnectFailed));
}

// ── Loss ──────────────────────────────────────────────────────

#[test]
fn live_loss_retries_without_backoff() {
    let clock = MockClock::at(0);
    let mut link = SessionSupervisor::new(MockTransport::default(), &DeviceConfig::default());
    let state = DeviceState::new(OperatingMode::Auto);
    link.maintain(&clock, &state);

    link.transport_mut().alive = false;
    clock.advance(10);
    assert_eq!(link.maintain(&clock, &state), Some(LinkEvent::Lost));
    assert_eq!(link.state(), LinkState::Disconnected);
    assert_eq!(link.transport().closes, 1);

    // Same instant: no backoff after a live-detected loss.
    assert_eq!(link.maintain(&clock, &state), Some(LinkEvent::Established));
    assert_eq!(link.transport().connect_urls.len(), 2);
    assert_eq!(link.stats().sessions, 2);
}

#[test]
fn events_while_offline_are_dropped_not_queued() {
    let clock = MockClock::at(0);
    let mut link = SessionSupervisor::new(MockTransport::refusing(), &DeviceConfig::default());
    let state = DeviceState::new(OperatingMode::Auto);
    link.maintain(&clock, &state);

    link.emit(&DeviceEvent::PumpState(SwitchState::On));
    link.emit(&DeviceEvent::PumpState(SwitchState::Off));

    assert!(link.transport().sent.is_empty());
    assert_eq!(link.stats().dropped_events, 2);

    link.transport_mut().refuse = false;
    clock.advance(5_000);
    link.maintain(&clock, &state);
    assert_eq!(link.transport().sent.len(), 3);
}

#[test]
fn failed_send_counts_as_dropped() {
    let clock = MockClock::at(0);
    let mut link = SessionSupervisor::new(MockTransport::default(), &DeviceConfig::default());
    link.maintain(&clock, &DeviceState::new(OperatingMode::Auto));
    link.transport_mut().fail_sends = true;

    link.emit(&DeviceEvent::PumpState(SwitchState::On));

    assert_eq!(link.stats().dropped_events, 1);
    assert_eq!(link.stats().last_error, Some(Error::Transport(TransportError::SendFailed)));
    assert!(link.is_connected());
}

// ── Inbound ───────────────────────────────────────────────────

#[test]
fn inbound_only_delivered_while_connected() {
    let clock = MockClock::at(0);
    let mut link = SessionSupervisor::new(MockTransport::refusing(), &DeviceConfig::default());
    link.transport_mut().push_inbound(r#"{"event":"welcome","value":"x"}"#);

    assert!(link.next_inbound().is_none());

    link.transport_mut().refuse = false;
    link.maintain(&clock, &DeviceState::new(OperatingMode::Auto));
    let frame = link.next_inbound().unwrap();
    assert_eq!(decode_inbound(&frame), Some(PeerCommand::Welcome));
}

#[test]
fn peer_commands_flow_through_link_to_pump() {
    let (_, _, chans) = channels();
    let config = DeviceConfig::default();
    let clock = MockClock::at(0);
    let mut ctl = PumpController::new(&config, chans);
    let mut link = SessionSupervisor::new(MockTransport::default(), &config);
    let mut hw = MockHardware::with_levels(true, true);
    ctl.start(&mut hw, &mut link);
    link.maintain(&clock, ctl.state());
    link.transport_mut().sent.clear();

    for text in [
        r#"{"event":"Mode","value":"MANUAL"}"#,
        r#"{"event":"Pump_State","value":"ON"}"#,
        r#"{"event":"Pump_State","value":"on"}"#,
        "not json",
    ] {
        link.transport_mut().push_inbound(text);
    }
    while let Some(frame) = link.next_inbound() {
        if let Some(cmd) = decode_inbound(&frame) {
            ctl.handle_command(cmd, &mut hw, &mut link);
        }
    }

    assert!(hw.pump_on());
    assert_eq!(link.transport().sent_pairs(), vec![pair("PumpState", "ON")]);
}

#[test]
fn inbound_frames_route_by_event_name_not_size() {
    let clock = MockClock::at(0);
    let mut link = SessionSupervisor::new(MockTransport::default(), &DeviceConfig::default());
    link.maintain(&clock, &DeviceState::new(OperatingMode::Auto));

    let padded = format!(r#"{{"event":"Mode","value":"MANUAL","from":"{}"}}"#, "d".repeat(100));
    let long_unknown = format!(r#"{{"event":"{}","value":"x"}}"#, "Q".repeat(30));
    link.transport_mut().push_inbound(&padded);
    link.transport_mut().push_inbound(&long_unknown);
    link.transport_mut().push_inbound(r#"["Mode","AUTO"]"#);

    let decoded: Vec<_> = std::iter::from_fn(|| link.next_inbound())
        .map(|frame| decode_inbound(&frame))
        .collect();
    assert_eq!(
        decoded,
        vec![Some(PeerCommand::SetMode(OperatingMode::Manual)), None, None]
    );
}

// ── Offline edges collapse into resync ────────────────────────

#[test]
fn five_offline_edges_yield_only_resync_on_reconnect() {
    let (oht, ugt, chans) = channels();
    let config = DeviceConfig::default();
    let clock = MockClock::at(0);
    let mut ctl = PumpController::new(&config, chans);
    let mut link = SessionSupervisor::new(MockTransport::default(), &config);
    let mut hw = MockHardware::with_levels(false, false);
    let mut delay = MockDelay::default();
    ctl.start(&mut hw, &mut link);
    link.maintain(&clock, ctl.state());

    // Drop and keep the link down.
    link.transport_mut().alive = false;
    link.transport_mut().refuse = true;
    assert_eq!(link.maintain(&clock, ctl.state()), Some(LinkEvent::Lost));
    assert_eq!(link.maintain(&clock, ctl.state()), Some(LinkEvent::ConnectFailed));
    link.transport_mut().sent.clear();

    let edges = [
        (oht, true, false),
        (ugt, true, true),
        (oht, false, true),
        (ugt, false, false),
        (oht, true, false),
    ];
    for (i, (detector, overhead_full, underground_full)) in edges.into_iter().enumerate() {
        hw.overhead_full = overhead_full;
        hw.underground_full = underground_full;
        assert!(detector.on_raw_edge(1_000 * (i as u32 + 1)));
        assert_eq!(ctl.service_sensors(&mut hw, &mut delay, &mut link), 1);
        assert_eq!(link.maintain(&clock, ctl.state()), None);
    }
    assert!(link.transport().sent.is_empty());

    link.transport_mut().refuse = false;
    clock.advance(config.reconnect_backoff_ms);
    assert_eq!(link.maintain(&clock, ctl.state()), Some(LinkEvent::Established));

    // Final state: overhead full, underground empty.
    assert_eq!(
        link.transport().sent_pairs(),
        vec![
            pair("register", "device2"),
            pair("OHT_FLOAT", "OFF"),
            pair("UGT_FLOAT", "ON"),
        ]
    );
}
