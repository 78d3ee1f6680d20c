//! Outbound application events.
//!
//! The arbiter and control loop emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — log to serial, push to the server,
//! collect in a test.

use serde::Serialize;

use super::commands::{CommandSource, RelayId};
use crate::sensors::PowerSnapshot;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// A relay changed state (carries who asked for it).
    RelayChanged {
        relay: RelayId,
        on: bool,
        source: CommandSource,
    },

    /// A channel finished zero-offset calibration.
    ChannelCalibrated {
        channel: &'static str,
        offset_mv: f32,
    },

    /// The control loop is up.
    Started,
}

/// A point-in-time telemetry report.  Field names are the wire format the
/// server expects on `/api/data`.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryData {
    pub voltage: f32,
    pub current1: f32,
    pub current2: f32,
    pub total_current: f32,
    pub power1: f32,
    pub power2: f32,
    pub total_power: f32,
    pub relay1_state: bool,
    pub relay2_state: bool,
}

impl TelemetryData {
    pub fn from_snapshot(s: &PowerSnapshot, relays: (bool, bool)) -> Self {
        Self {
            voltage: s.voltage_v,
            current1: s.current1_a,
            current2: s.current2_a,
            total_current: s.total_current_a,
            power1: s.power1_w,
            power2: s.power2_w,
            total_power: s.total_power_w,
            relay1_state: relays.0,
            relay2_state: relays.1,
        }
    }
}
