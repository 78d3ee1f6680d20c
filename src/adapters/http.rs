//! HTTP client adapter for the telemetry/command server.
//!
//! Two port implementations in one adapter:
//!
//! - [`CommandPort`]: GET `/api/relay/commands` and parse the desired
//!   relay states.  Anything that goes wrong — transport, status, JSON —
//!   is logged and collapses to `None` ("no change this cycle").
//! - [`EventSink`]: POST telemetry events to `/api/data`.  Other events
//!   are not the server's business and are ignored.
//!
//! Every request carries the configured timeout; a stalled server costs
//! one timeout, never a hung loop.  The `online` flag is refreshed each
//! cycle from the WiFi adapter so requests are not even attempted while
//! the link is down.

use log::{debug, info, warn};

use crate::app::commands::RelayCommand;
use crate::app::events::{AppEvent, TelemetryData};
use crate::app::ports::{CommandPort, EventSink};
use crate::error::CommsError;

pub struct HttpClient {
    server_url: heapless::String<128>,
    timeout_secs: u32,
    online: bool,
}

impl HttpClient {
    pub fn new(server_url: &str, timeout_secs: u32) -> Self {
        let server_url = heapless::String::try_from(server_url).unwrap_or_else(|_| {
            warn!("HTTP: server URL too long, client disabled");
            heapless::String::new()
        });
        Self {
            server_url,
            timeout_secs,
            online: false,
        }
    }

    /// Refresh the connectivity gate (call once per cycle).
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    fn fetch_commands(&mut self) -> Result<RelayCommand, CommsError> {
        if !self.online || self.server_url.is_empty() {
            return Err(CommsError::NotConnected);
        }
        let body = self.get_raw("/api/relay/commands")?;
        parse_commands(&body)
    }

    fn push_telemetry(&mut self, t: &TelemetryData) -> Result<(), CommsError> {
        if !self.online || self.server_url.is_empty() {
            return Err(CommsError::NotConnected);
        }
        let payload =
            serde_json::to_string(t).map_err(|_| CommsError::MalformedResponse)?;
        self.post_raw("/api/data", payload.as_bytes())
    }

    // ── Platform transport (ESP-IDF) ──────────────────────────

    #[cfg(target_os = "espidf")]
    fn connection(&self) -> Result<esp_idf_svc::http::client::EspHttpConnection, CommsError> {
        esp_idf_svc::http::client::EspHttpConnection::new(
            &esp_idf_svc::http::client::Configuration {
                timeout: Some(core::time::Duration::from_secs(u64::from(self.timeout_secs))),
                ..Default::default()
            },
        )
        .map_err(|_| CommsError::RequestFailed)
    }

    #[cfg(target_os = "espidf")]
    fn get_raw(&mut self, path: &str) -> Result<Vec<u8>, CommsError> {
        use embedded_svc::http::client::Client;

        let url = format!("{}{}", self.server_url, path);
        let mut client = Client::wrap(self.connection()?);
        let request = client.get(&url).map_err(|_| CommsError::RequestFailed)?;
        let mut response = request.submit().map_err(|_| CommsError::RequestFailed)?;

        let status = response.status();
        if status != 200 {
            return Err(CommsError::BadStatus(status));
        }

        let mut buf = [0u8; 512];
        let n = embedded_svc::utils::io::try_read_full(&mut response, &mut buf)
            .map_err(|_| CommsError::RequestFailed)?;
        Ok(buf[..n].to_vec())
    }

    #[cfg(target_os = "espidf")]
    fn post_raw(&mut self, path: &str, body: &[u8]) -> Result<(), CommsError> {
        use embedded_svc::http::client::Client;
        use embedded_svc::io::Write;

        let url = format!("{}{}", self.server_url, path);
        let mut client = Client::wrap(self.connection()?);
        let mut request = client
            .post(&url, &[("Content-Type", "application/json")])
            .map_err(|_| CommsError::RequestFailed)?;
        request
            .write_all(body)
            .map_err(|_| CommsError::RequestFailed)?;
        let response = request.submit().map_err(|_| CommsError::RequestFailed)?;

        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(CommsError::BadStatus(status));
        }
        Ok(())
    }

    // ── Platform transport (host sim) ─────────────────────────

    #[cfg(not(target_os = "espidf"))]
    fn get_raw(&mut self, _path: &str) -> Result<Vec<u8>, CommsError> {
        sim::COMMAND_RESPONSE
            .lock()
            .unwrap()
            .clone()
            .map(String::into_bytes)
            .ok_or(CommsError::RequestFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn post_raw(&mut self, _path: &str, body: &[u8]) -> Result<(), CommsError> {
        sim::TELEMETRY_LOG
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(body).into_owned());
        Ok(())
    }
}

/// Parse the command endpoint's body.  Shared between targets so the
/// malformed-response path is host-testable.
fn parse_commands(body: &[u8]) -> Result<RelayCommand, CommsError> {
    serde_json::from_slice(body).map_err(|_| CommsError::MalformedResponse)
}

// ── CommandPort ───────────────────────────────────────────────

impl CommandPort for HttpClient {
    fn poll_desired(&mut self) -> Option<RelayCommand> {
        match self.fetch_commands() {
            Ok(cmd) => Some(cmd),
            Err(CommsError::NotConnected) => None,
            Err(e) => {
                // Transient by design: same as "no command this cycle".
                warn!("HTTP: command poll failed ({})", e);
                None
            }
        }
    }
}

// ── EventSink ─────────────────────────────────────────────────

impl EventSink for HttpClient {
    fn emit(&mut self, event: &AppEvent) {
        let AppEvent::Telemetry(t) = event else {
            return;
        };
        match self.push_telemetry(t) {
            Ok(()) => debug!("HTTP: telemetry sent"),
            Err(CommsError::NotConnected) => {}
            Err(e) => info!("HTTP: telemetry push failed ({})", e),
        }
    }
}

// ── Sim hooks (host tests) ────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::sync::Mutex;

    pub static COMMAND_RESPONSE: Mutex<Option<String>> = Mutex::new(None);
    pub static TELEMETRY_LOG: Mutex<Vec<String>> = Mutex::new(Vec::new());
}

/// Stage the body the next command polls will "receive"; `None` simulates
/// a transport failure.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_command_response(body: Option<&str>) {
    *sim::COMMAND_RESPONSE.lock().unwrap() = body.map(str::to_owned);
}

/// Drain the telemetry payloads "sent" so far.
#[cfg(not(target_os = "espidf"))]
pub fn sim_take_telemetry() -> Vec<String> {
    core::mem::take(&mut sim::TELEMETRY_LOG.lock().unwrap())
}
