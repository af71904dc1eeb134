//! TankPump Firmware: Main Entry Point
//!
//! Hexagonal architecture around a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        WsTransport         UptimeClock        │
//! │  (Level + Pump)         (Transport)         (Clock)            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   PumpController (DeviceState · decide)                │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  SessionSupervisor (EventSink) · float ISRs → EdgeDetector     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};

use tankpump::adapters::hardware::HardwareAdapter;
use tankpump::adapters::time::UptimeClock;
use tankpump::adapters::wifi;
use tankpump::adapters::ws_transport::WsTransport;
use tankpump::app::ports::Clock;
use tankpump::app::service::PumpController;
use tankpump::config::DeviceConfig;
use tankpump::drivers::hw_init;
use tankpump::protocol::decode_inbound;
use tankpump::sensors;
use tankpump::session::{LinkEvent, SessionSupervisor};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  TankPump v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Compiled-in configuration ──────────────────────────
    let config = DeviceConfig::default();
    config.validate()?;
    info!("Device '{}' -> {}", config.device_id, config.server_url());

    // ── 3. Hardware peripherals + float ISRs ──────────────────
    sensors::configure_debounce(config.debounce_ms);
    hw_init::init_peripherals()?;
    hw_init::init_isr_service()?;
    let mut hw = HardwareAdapter::board()?;

    // ── 4. WiFi (blocks until associated) ─────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let _wifi = wifi::join(peripherals.modem, sysloop, Some(nvs), &config)?;

    // ── 5. Domain core + link ─────────────────────────────────
    let clock = UptimeClock::new();
    let mut controller = PumpController::new(&config, sensors::device_channels());
    let mut link = SessionSupervisor::new(WsTransport::new(), &config);
    let mut delay = FreeRtos;

    // Link is still down: the initial decision is applied but not reported.
    controller.start(&mut hw, &mut link);

    // ── 6. Control loop ───────────────────────────────────────
    info!("Entering control loop ({} ms)", config.loop_interval_ms);
    loop {
        // Inbound peer commands
        while let Some(frame) = link.next_inbound() {
            if let Some(cmd) = decode_inbound(&frame) {
                controller.handle_command(cmd, &mut hw, &mut link);
            }
        }

        // Debounced float edges (overhead first)
        controller.service_sensors(&mut hw, &mut delay, &mut link);

        // Liveness, reconnect, resync
        match link.maintain(&clock, controller.state()) {
            Some(LinkEvent::Established) => {
                info!("Peer resynchronised at {} ms", clock.now_ms());
            }
            Some(LinkEvent::Lost) => {
                warn!("Peer link lost: {:?}", link.stats());
            }
            Some(LinkEvent::ConnectFailed) | None => {}
        }

        FreeRtos::delay_ms(config.loop_interval_ms);
    }
}
