//! Unified error types for the mainsmon firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform.  All variants are `Copy`
//! so they can be passed around without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A communication subsystem failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

/// Failures while talking to the telemetry/command server.
///
/// All of these are transient by design: the control loop logs them and
/// carries on with the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// No network connectivity at the time of the request.
    NotConnected,
    /// The HTTP request could not be issued or timed out.
    RequestFailed,
    /// The server answered with a non-success status code.
    BadStatus(u16),
    /// The response body was not valid JSON of the expected shape.
    MalformedResponse,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::RequestFailed => write!(f, "request failed or timed out"),
            Self::BadStatus(code) => write!(f, "unexpected HTTP status {code}"),
            Self::MalformedResponse => write!(f, "malformed response body"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
