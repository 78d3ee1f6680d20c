//! Application core — pure domain logic, zero I/O.
//!
//! This module holds the relay command vocabulary and the per-cycle
//! arbitration rules.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod arbiter;
pub mod commands;
pub mod events;
pub mod ports;
