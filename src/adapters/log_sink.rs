//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).  The HTTP adapter
//! implements the same trait for the telemetry push.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | V={:.1} | I1={:.3}A I2={:.3}A sum={:.3}A | \
                     P1={:.1}W P2={:.1}W sum={:.1}W | R1={} R2={}",
                    t.voltage,
                    t.current1,
                    t.current2,
                    t.total_current,
                    t.power1,
                    t.power2,
                    t.total_power,
                    if t.relay1_state { "ON" } else { "OFF" },
                    if t.relay2_state { "ON" } else { "OFF" },
                );
            }
            AppEvent::RelayChanged { relay, on, source } => {
                info!(
                    "RELAY | {:?} -> {} (via {:?})",
                    relay,
                    if *on { "ON" } else { "OFF" },
                    source
                );
            }
            AppEvent::ChannelCalibrated { channel, offset_mv } => {
                info!("CAL   | {} zero offset {:.2} mV", channel, offset_mv);
            }
            AppEvent::Started => {
                info!("START | control loop running");
            }
        }
    }
}
