//! Relay command vocabulary.
//!
//! Commands arrive from two places — the IR remote and the server poll —
//! and are normalised into [`PendingCommand`]s that the arbiter applies
//! within the same control cycle they were produced.  Nothing here is ever
//! queued across cycles.

use serde::{Deserialize, Serialize};

/// The two controllable outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayId {
    Relay1,
    Relay2,
}

/// What to do with a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOp {
    /// Flip the current state (IR remote buttons are stateless toggles).
    Toggle,
    /// Drive to an explicit state (the server reports absolute desires).
    Set(bool),
}

/// Where a command came from.  Within a cycle, IR commands are applied
/// before remote ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    Ir,
    Remote,
}

/// A command in flight during one arbiter cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCommand {
    pub relay: RelayId,
    pub op: RelayOp,
    pub source: CommandSource,
}

/// One decoded frame from the IR receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrFrame {
    /// A full NEC frame carrying a 32-bit code.
    Code(u32),
    /// A repeat burst: the remote key is held down.
    Repeat,
}

/// NEC code bound to relay 1 (remote button "1").
pub const IR_CODE_RELAY1: u32 = 0xA758_FF00;
/// NEC code bound to relay 2 (remote button "2").
pub const IR_CODE_RELAY2: u32 = 0xBB44_FF00;

/// Desired relay states as reported by the server's command endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayCommand {
    pub relay1: bool,
    pub relay2: bool,
}
