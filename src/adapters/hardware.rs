//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`MeterHub`] and the [`RelayBank`], exposing them through
//! [`MeterPort`] and [`RelayPort`].  On non-espidf targets the underlying
//! drivers use cfg-gated simulation stubs.

use crate::app::commands::RelayId;
use crate::app::ports::{MeterPort, RelayPort};
use crate::drivers::relay::RelayBank;
use crate::sensors::{MeterHub, PowerSnapshot};

/// Concrete adapter that combines the analog front end and the relay
/// outputs behind port traits.
pub struct HardwareAdapter {
    hub: MeterHub,
    relays: RelayBank,
}

impl HardwareAdapter {
    /// The hub and bank are built (and the hub calibrated) in main, where
    /// the blocking startup phase lives.
    pub fn new(hub: MeterHub, relays: RelayBank) -> Self {
        Self { hub, relays }
    }

    /// Both relay states, for telemetry.
    pub fn relay_states(&self) -> (bool, bool) {
        self.relays.both()
    }

    /// Retune the RMS windows for a different line frequency.
    pub fn set_mains_frequency(&mut self, hz: f32) {
        self.hub.set_mains_frequency(hz);
    }
}

// ── MeterPort implementation ──────────────────────────────────

impl MeterPort for HardwareAdapter {
    fn update(&mut self, dt_secs: f32) {
        self.hub.update(dt_secs);
    }

    fn read_all(&mut self) -> PowerSnapshot {
        self.hub.read_all()
    }
}

// ── RelayPort implementation ──────────────────────────────────

impl RelayPort for HardwareAdapter {
    fn apply(&mut self, relay: RelayId, on: bool) {
        self.relays.apply(relay, on);
    }

    fn toggle(&mut self, relay: RelayId) {
        self.relays.toggle(relay);
    }

    fn state(&self, relay: RelayId) -> bool {
        self.relays.state(relay)
    }
}
