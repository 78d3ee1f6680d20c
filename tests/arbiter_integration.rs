//! Integration tests: CommandArbiter → relay port, across both command
//! sources (IR remote and server poll).

use mainsmon::app::arbiter::CommandArbiter;
use mainsmon::app::commands::{
    CommandSource, IrFrame, RelayCommand, RelayId, IR_CODE_RELAY1, IR_CODE_RELAY2,
};
use mainsmon::app::events::AppEvent;
use mainsmon::app::ports::{EventSink, IrPort, RelayPort};

// ── Mock implementations ──────────────────────────────────────

/// IR source fed from a pre-seeded frame list, one per poll.
struct MockIr {
    frames: Vec<IrFrame>,
}

impl MockIr {
    fn new(frames: &[IrFrame]) -> Self {
        Self {
            frames: frames.to_vec(),
        }
    }

    fn silent() -> Self {
        Self { frames: Vec::new() }
    }
}

impl IrPort for MockIr {
    fn poll(&mut self) -> Option<IrFrame> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.frames.remove(0))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelayCall {
    Apply(RelayId, bool),
    Toggle(RelayId),
}

/// Relay store that records every physical-write-equivalent call.
struct MockRelays {
    relay1: bool,
    relay2: bool,
    calls: Vec<RelayCall>,
}

impl MockRelays {
    fn new() -> Self {
        Self {
            relay1: false,
            relay2: false,
            calls: Vec::new(),
        }
    }

    fn writes_for(&self, relay: RelayId) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RelayCall::Apply(r, _) | RelayCall::Toggle(r) if *r == relay))
            .count()
    }
}

impl RelayPort for MockRelays {
    fn apply(&mut self, relay: RelayId, on: bool) {
        match relay {
            RelayId::Relay1 => self.relay1 = on,
            RelayId::Relay2 => self.relay2 = on,
        }
        self.calls.push(RelayCall::Apply(relay, on));
    }

    fn toggle(&mut self, relay: RelayId) {
        let next = !self.state(relay);
        match relay {
            RelayId::Relay1 => self.relay1 = next,
            RelayId::Relay2 => self.relay2 = next,
        }
        self.calls.push(RelayCall::Toggle(relay));
    }

    fn state(&self, relay: RelayId) -> bool {
        match relay {
            RelayId::Relay1 => self.relay1,
            RelayId::Relay2 => self.relay2,
        }
    }
}

/// Sink that keeps every emitted event for inspection.
struct VecSink {
    events: Vec<AppEvent>,
}

impl VecSink {
    fn new() -> Self {
        Self { events: Vec::new() }
    }

    fn relay_changes(&self) -> Vec<(RelayId, bool, CommandSource)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::RelayChanged { relay, on, source } => Some((*relay, *on, *source)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for VecSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── IR source ─────────────────────────────────────────────────

#[test]
fn ir_code_toggles_its_relay() {
    let mut arbiter = CommandArbiter::new();
    let mut relays = MockRelays::new();
    let mut sink = VecSink::new();

    let mut ir = MockIr::new(&[IrFrame::Code(IR_CODE_RELAY1)]);
    let applied = arbiter.run_cycle(&mut ir, None, &mut relays, &mut sink);

    assert_eq!(applied, 1);
    assert!(relays.state(RelayId::Relay1));
    assert!(!relays.state(RelayId::Relay2));
    assert_eq!(
        sink.relay_changes(),
        vec![(RelayId::Relay1, true, CommandSource::Ir)]
    );
}

#[test]
fn unrecognized_code_changes_nothing() {
    let mut arbiter = CommandArbiter::new();
    let mut relays = MockRelays::new();
    let mut sink = VecSink::new();

    let mut ir = MockIr::new(&[IrFrame::Code(0xDEAD_BEEF)]);
    let applied = arbiter.run_cycle(&mut ir, None, &mut relays, &mut sink);

    assert_eq!(applied, 0);
    assert!(relays.calls.is_empty());
    assert!(sink.events.is_empty());
}

#[test]
fn repeat_reissues_last_accepted_command() {
    let mut arbiter = CommandArbiter::new();
    let mut relays = MockRelays::new();
    let mut sink = VecSink::new();

    // Cycle 1: button 2. Cycle 2: key held (repeat burst).
    let mut ir = MockIr::new(&[IrFrame::Code(IR_CODE_RELAY2)]);
    arbiter.run_cycle(&mut ir, None, &mut relays, &mut sink);
    assert!(relays.state(RelayId::Relay2));

    let mut ir = MockIr::new(&[IrFrame::Repeat]);
    arbiter.run_cycle(&mut ir, None, &mut relays, &mut sink);
    assert!(!relays.state(RelayId::Relay2), "repeat toggles again");
}

#[test]
fn repeat_with_no_prior_command_is_ignored() {
    let mut arbiter = CommandArbiter::new();
    let mut relays = MockRelays::new();
    let mut sink = VecSink::new();

    let mut ir = MockIr::new(&[IrFrame::Repeat]);
    let applied = arbiter.run_cycle(&mut ir, None, &mut relays, &mut sink);

    assert_eq!(applied, 0);
    assert!(relays.calls.is_empty());
}

#[test]
fn unrecognized_code_does_not_disturb_repeat_memory() {
    let mut arbiter = CommandArbiter::new();
    let mut relays = MockRelays::new();
    let mut sink = VecSink::new();

    let mut ir = MockIr::new(&[IrFrame::Code(IR_CODE_RELAY1)]);
    arbiter.run_cycle(&mut ir, None, &mut relays, &mut sink);

    let mut ir = MockIr::new(&[IrFrame::Code(0x1234_5678)]);
    arbiter.run_cycle(&mut ir, None, &mut relays, &mut sink);

    // The garbage code must not have overwritten the last-accepted slot:
    // a repeat still replays relay 1.
    let mut ir = MockIr::new(&[IrFrame::Repeat]);
    arbiter.run_cycle(&mut ir, None, &mut relays, &mut sink);
    assert!(!relays.state(RelayId::Relay1), "toggled on then off again");
    assert_eq!(relays.writes_for(RelayId::Relay1), 2);
}

// ── Remote source ─────────────────────────────────────────────

#[test]
fn remote_sets_only_differing_relays() {
    let mut arbiter = CommandArbiter::new();
    let mut relays = MockRelays::new();
    let mut sink = VecSink::new();

    let desired = RelayCommand {
        relay1: true,
        relay2: false,
    };
    let applied =
        arbiter.run_cycle(&mut MockIr::silent(), Some(desired), &mut relays, &mut sink);

    // Relay 2 already matches; only relay 1 gets an operation.
    assert_eq!(applied, 1);
    assert_eq!(relays.calls, vec![RelayCall::Apply(RelayId::Relay1, true)]);
}

#[test]
fn repeated_identical_remote_responses_are_idempotent() {
    let mut arbiter = CommandArbiter::new();
    let mut relays = MockRelays::new();
    let mut sink = VecSink::new();

    let desired = RelayCommand {
        relay1: true,
        relay2: true,
    };
    let first =
        arbiter.run_cycle(&mut MockIr::silent(), Some(desired), &mut relays, &mut sink);
    assert_eq!(first, 2);

    // Same response again and again: no further operations.
    for _ in 0..5 {
        let applied =
            arbiter.run_cycle(&mut MockIr::silent(), Some(desired), &mut relays, &mut sink);
        assert_eq!(applied, 0);
    }
    assert_eq!(relays.calls.len(), 2);
}

#[test]
fn absent_remote_poll_means_no_change() {
    let mut arbiter = CommandArbiter::new();
    let mut relays = MockRelays::new();
    let mut sink = VecSink::new();

    let applied = arbiter.run_cycle(&mut MockIr::silent(), None, &mut relays, &mut sink);
    assert_eq!(applied, 0);
    assert!(relays.calls.is_empty());
}

// ── Same-cycle conflict ───────────────────────────────────────

#[test]
fn remote_wins_same_cycle_conflict() {
    let mut arbiter = CommandArbiter::new();
    let mut relays = MockRelays::new();
    let mut sink = VecSink::new();

    // IR wants relay 1 toggled ON; the server wants it OFF, same cycle.
    let mut ir = MockIr::new(&[IrFrame::Code(IR_CODE_RELAY1)]);
    let desired = RelayCommand {
        relay1: false,
        relay2: false,
    };
    arbiter.run_cycle(&mut ir, Some(desired), &mut relays, &mut sink);

    // Remote is applied after IR, so OFF is the final state.
    assert!(!relays.state(RelayId::Relay1));
    assert_eq!(
        relays.calls,
        vec![
            RelayCall::Toggle(RelayId::Relay1),
            RelayCall::Apply(RelayId::Relay1, false),
        ]
    );

    // Both applications were announced, IR first.
    assert_eq!(
        sink.relay_changes(),
        vec![
            (RelayId::Relay1, true, CommandSource::Ir),
            (RelayId::Relay1, false, CommandSource::Remote),
        ]
    );
}

#[test]
fn remote_agreeing_with_ir_issues_no_second_write() {
    let mut arbiter = CommandArbiter::new();
    let mut relays = MockRelays::new();
    let mut sink = VecSink::new();

    // IR toggles relay 1 ON; the server also wants it ON.  The remote diff
    // runs against the post-IR state, so no redundant write happens.
    let mut ir = MockIr::new(&[IrFrame::Code(IR_CODE_RELAY1)]);
    let desired = RelayCommand {
        relay1: true,
        relay2: false,
    };
    let applied = arbiter.run_cycle(&mut ir, Some(desired), &mut relays, &mut sink);

    assert_eq!(applied, 1);
    assert!(relays.state(RelayId::Relay1));
    assert_eq!(relays.writes_for(RelayId::Relay1), 1);
}

#[test]
fn conflict_on_one_relay_leaves_the_other_independent() {
    let mut arbiter = CommandArbiter::new();
    let mut relays = MockRelays::new();
    let mut sink = VecSink::new();

    // IR toggles relay 1; remote turns relay 2 on and contradicts relay 1.
    let mut ir = MockIr::new(&[IrFrame::Code(IR_CODE_RELAY1)]);
    let desired = RelayCommand {
        relay1: false,
        relay2: true,
    };
    let applied = arbiter.run_cycle(&mut ir, Some(desired), &mut relays, &mut sink);

    assert_eq!(applied, 3);
    assert!(!relays.state(RelayId::Relay1));
    assert!(relays.state(RelayId::Relay2));
}
