//! Port traits — the hexagonal boundary between domain logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ CommandArbiter / control loop
//! ```
//!
//! Driven adapters (the analog front end, the relay bank, the IR receiver,
//! the HTTP client, event sinks) implement these traits.  The arbiter and
//! the control loop consume them via generics, so the domain core never
//! touches hardware directly and every test runs against mocks.

use super::commands::{IrFrame, RelayCommand, RelayId};
use super::events::AppEvent;
use crate::sensors::PowerSnapshot;

// ───────────────────────────────────────────────────────────────
// Meter port (driven adapter: analog front end → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the sensing pipeline.
pub trait MeterPort {
    /// Feed one sampling tick into the RMS windows.
    fn update(&mut self, dt_secs: f32);

    /// Derive the cycle's smoothed readings.  Advances the smoothing
    /// buffers — call once per control cycle.
    fn read_all(&mut self) -> PowerSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Relay port (domain → outputs)
// ───────────────────────────────────────────────────────────────

/// Write-side port over the authoritative relay state.
///
/// Implementations must keep the logical state and the physical output
/// consistent within every call — no operation may return having updated
/// one but not the other.
pub trait RelayPort {
    fn apply(&mut self, relay: RelayId, on: bool);
    fn toggle(&mut self, relay: RelayId);
    /// Last-applied logical state; never touches hardware.
    fn state(&self, relay: RelayId) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Command sources
// ───────────────────────────────────────────────────────────────

/// Non-blocking source of decoded IR frames; at most one per poll.
pub trait IrPort {
    fn poll(&mut self) -> Option<IrFrame>;
}

/// Source of the server's desired relay states.
///
/// Rate limiting is the caller's job: the arbiter consumes whatever the
/// control loop hands it.  `None` covers "poll not due", transport
/// failures, and malformed responses alike — all mean "no change this
/// cycle".
pub trait CommandPort {
    fn poll_desired(&mut self) -> Option<RelayCommand>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.  Adapters
/// decide where they go (serial log, telemetry push, a test vector).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
