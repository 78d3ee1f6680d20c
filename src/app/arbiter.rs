//! Per-cycle relay command arbitration.
//!
//! Each control cycle runs the same fixed sequence:
//!
//! 1. Poll the IR source for at most one frame.  A repeat burst re-issues
//!    the last accepted command; unrecognized codes are ignored and do not
//!    disturb the last-accepted memory.
//! 2. A recognized code becomes a `Toggle` on its bound relay and is
//!    applied immediately.
//! 3. The remote desired states (if the caller polled this cycle) are
//!    diffed against the now-current relay states; each difference becomes
//!    a `Set` and is applied.
//!
//! Applying IR before the remote diff means a same-cycle conflict on one
//! relay resolves to the remote value — it is simply the last writer in
//! the cycle.  Reordering these steps changes observable behavior under
//! simultaneous input, so the sequence is load-bearing.

use log::{debug, info};

use super::commands::{
    CommandSource, IrFrame, PendingCommand, RelayCommand, RelayId, RelayOp, IR_CODE_RELAY1,
    IR_CODE_RELAY2,
};
use super::events::AppEvent;
use super::ports::{EventSink, IrPort, RelayPort};

pub struct CommandArbiter {
    /// Raw code of the last IR command that actually mapped to a relay;
    /// replayed when the remote key is held down (NEC repeat bursts).
    last_accepted: Option<u32>,
}

impl CommandArbiter {
    pub fn new() -> Self {
        Self { last_accepted: None }
    }

    /// Run one arbitration cycle.  `remote_desired` is `None` when the
    /// remote poll was not due or yielded nothing usable.  Returns the
    /// number of relay operations applied.
    pub fn run_cycle(
        &mut self,
        ir: &mut impl IrPort,
        remote_desired: Option<RelayCommand>,
        relays: &mut impl RelayPort,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut applied = 0;

        // ── 1+2. IR remote ────────────────────────────────────
        if let Some(cmd) = self.translate_ir(ir.poll()) {
            self.apply(cmd, relays, sink);
            applied += 1;
        }

        // ── 3. Remote poll ────────────────────────────────────
        // Diffed against post-IR state, so the remote's absolute desire is
        // what sticks when both sources touched the same relay this cycle.
        if let Some(desired) = remote_desired {
            for (relay, want) in [
                (RelayId::Relay1, desired.relay1),
                (RelayId::Relay2, desired.relay2),
            ] {
                if relays.state(relay) != want {
                    self.apply(
                        PendingCommand {
                            relay,
                            op: RelayOp::Set(want),
                            source: CommandSource::Remote,
                        },
                        relays,
                        sink,
                    );
                    applied += 1;
                }
            }
        }

        applied
    }

    fn translate_ir(&mut self, frame: Option<IrFrame>) -> Option<PendingCommand> {
        let code = match frame? {
            IrFrame::Code(code) => code,
            // Held key: replay the last accepted code, if there ever was one.
            IrFrame::Repeat => self.last_accepted?,
        };

        let relay = match code {
            IR_CODE_RELAY1 => RelayId::Relay1,
            IR_CODE_RELAY2 => RelayId::Relay2,
            other => {
                debug!("IR: ignoring unrecognized code {:#010x}", other);
                return None;
            }
        };

        self.last_accepted = Some(code);
        Some(PendingCommand {
            relay,
            op: RelayOp::Toggle,
            source: CommandSource::Ir,
        })
    }

    fn apply(
        &mut self,
        cmd: PendingCommand,
        relays: &mut impl RelayPort,
        sink: &mut impl EventSink,
    ) {
        match cmd.op {
            RelayOp::Toggle => relays.toggle(cmd.relay),
            RelayOp::Set(on) => relays.apply(cmd.relay, on),
        }
        let on = relays.state(cmd.relay);
        info!("{:?} -> {} ({:?})", cmd.relay, if on { "ON" } else { "OFF" }, cmd.source);
        sink.emit(&AppEvent::RelayChanged {
            relay: cmd.relay,
            on,
            source: cmd.source,
        });
    }
}
