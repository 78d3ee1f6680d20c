//! Mainsmon Firmware — Main Entry Point
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter      LogEventSink     WifiAdapter           │
//! │  (Meter+Relay)        (EventSink)      (Connectivity)        │
//! │  HttpClient                                                  │
//! │  (CommandPort + telemetry EventSink)                         │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ────────────────        │
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │            CommandArbiter (pure logic)               │    │
//! │  │  IR toggle · remote diff · fixed application order   │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! │                                                              │
//! │  MeterHub (calibration · RMS windows · smoothing)            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod error;
mod events;
mod pins;

pub mod app;
mod adapters;
mod drivers;
mod sensors;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use adapters::hardware::HardwareAdapter;
use adapters::http::HttpClient;
use adapters::log_sink::LogEventSink;
use adapters::wifi::{ConnectivityPort, WifiAdapter};
use app::arbiter::CommandArbiter;
use app::events::{AppEvent, TelemetryData};
use app::ports::{CommandPort, EventSink, MeterPort};
use config::SystemConfig;
use drivers::display::Lcd1602;
use drivers::ir::IrReceiver;
use drivers::relay::RelayBank;
use events::Event;
use sensors::{MeterHub, PowerSnapshot};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Mainsmon v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let mut log_sink = LogEventSink::new();

    // ── 3. Relay outputs to safe OFF ──────────────────────────
    let mut relays = RelayBank::new();
    relays.init();

    // ── 4. Blocking calibration phase ─────────────────────────
    //
    // Runs once, synchronously, before the control loop starts; every
    // reading downstream assumes the zero offsets are in place.
    let mut hub = MeterHub::new(&config);
    info!(
        "Calibrating ({} samples per channel, mains disconnected)...",
        config.calibration_samples
    );
    let mut delay = boot_delay();
    let (v_off, ct1_off, ct2_off) = hub.calibrate_all(&config, &mut delay);
    for (channel, offset_mv) in [("voltage", v_off), ("ct1", ct1_off), ("ct2", ct2_off)] {
        log_sink.emit(&AppEvent::ChannelCalibrated { channel, offset_mv });
    }

    let mut hw = HardwareAdapter::new(hub, relays);

    // ── 5. IR receiver + display ──────────────────────────────
    let mut ir = IrReceiver::new();
    ir.init();

    let mut lcd = Lcd1602::new();
    if let Err(e) = lcd.init() {
        warn!("LCD init failed ({}), running headless", e);
    }

    // ── 6. Network adapters ───────────────────────────────────
    let mut wifi = WifiAdapter::new(config.wifi_retry_secs);
    #[cfg(target_os = "espidf")]
    {
        let peripherals = esp_idf_hal::peripherals::Peripherals::take()
            .map_err(|e| anyhow::anyhow!("peripherals: {e}"))?;
        let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
        if let Err(e) = wifi.attach(peripherals.modem, sysloop) {
            warn!("WiFi driver attach failed ({}), running offline", e);
        }
    }
    match wifi.set_credentials(config.wifi_ssid.as_str(), config.wifi_password.as_str()) {
        Ok(()) => {
            if let Err(e) = wifi.connect() {
                warn!("WiFi connect failed ({}), retrying every {}s", e, config.wifi_retry_secs);
            }
        }
        Err(e) => warn!("No usable WiFi credentials ({}), running offline", e),
    }

    let mut http = HttpClient::new(config.server_url.as_str(), config.http_timeout_secs);

    // ── 7. Arbiter + timers ───────────────────────────────────
    let mut arbiter = CommandArbiter::new();
    drivers::hw_timer::start_timers(config.sample_interval_us, config.control_interval_ms);

    log_sink.emit(&AppEvent::Started);
    info!("System ready. Entering control loop.");

    // ── 8. Control loop ───────────────────────────────────────
    let sample_dt = config.sample_interval_us as f32 / 1_000_000.0;
    let mut uptime_secs: u32 = 0;
    let mut last_poll_secs: u32 = 0;
    let mut telemetry_counter: u32 = 0;
    let mut last_snapshot: Option<PowerSnapshot> = None;

    loop {
        // Simulate timer interrupts via sleep on non-espidf targets.
        // On real hardware the esp_timer callbacks feed the queue and the
        // CPU idles between ticks.
        #[cfg(not(target_os = "espidf"))]
        {
            std::thread::sleep(std::time::Duration::from_millis(
                config.control_interval_ms as u64,
            ));
            events::push_event(Event::SampleTick);
            events::push_event(Event::ControlTick);
        }

        events::drain_events(|event| match event {
            Event::SampleTick => {
                hw.update(sample_dt);
            }

            Event::ControlTick => {
                uptime_secs += config.control_interval_ms / 1000;

                // Connectivity maintenance (fixed-interval reconnect).
                wifi.poll(uptime_secs);
                http.set_online(wifi.is_connected());

                // Remote poll, rate-limited here, not in the arbiter.
                let remote = if uptime_secs.saturating_sub(last_poll_secs)
                    >= config.poll_interval_secs
                {
                    last_poll_secs = uptime_secs;
                    http.poll_desired()
                } else {
                    None
                };

                // One arbitration pass: IR first, then remote.
                arbiter.run_cycle(&mut ir, remote, &mut hw, &mut log_sink);

                // Derive and display the cycle's readings.
                let snapshot = hw.read_all();
                lcd.show(&snapshot);
                last_snapshot = Some(snapshot);

                telemetry_counter += config.control_interval_ms / 1000;
                if telemetry_counter >= config.telemetry_interval_secs {
                    telemetry_counter = 0;
                    events::push_event(Event::TelemetryTick);
                }
            }

            Event::TelemetryTick => {
                if let Some(snapshot) = &last_snapshot {
                    let t = TelemetryData::from_snapshot(snapshot, hw.relay_states());
                    let event = AppEvent::Telemetry(t);
                    log_sink.emit(&event);
                    http.emit(&event);
                }
            }
        });
    }
}

// ── Calibration pacing ────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn boot_delay() -> esp_idf_hal::delay::FreeRtos {
    esp_idf_hal::delay::FreeRtos
}

#[cfg(not(target_os = "espidf"))]
fn boot_delay() -> StdDelay {
    StdDelay
}

/// Host-side stand-in for the FreeRTOS delay used on device.
#[cfg(not(target_os = "espidf"))]
struct StdDelay;

#[cfg(not(target_os = "espidf"))]
impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}
