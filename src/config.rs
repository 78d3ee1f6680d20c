//! System configuration parameters
//!
//! All tunable parameters for the mainsmon node.  Everything here is
//! volatile: there is deliberately no persistence layer, so each boot starts
//! from these defaults (relays OFF, channels uncalibrated).

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Calibration ---
    /// Number of raw samples averaged into the zero offset.
    pub calibration_samples: u16,
    /// Delay between calibration samples (milliseconds).
    pub calibration_delay_ms: u32,

    // --- Signal conditioning ---
    /// Mains line frequency (Hz); sets the RMS window to 40 / f seconds.
    pub mains_freq_hz: f32,
    /// Linear calibration for CT channel 1: amps = intercept + slope * mV.
    pub ct1_slope: f32,
    pub ct1_intercept: f32,
    /// Linear calibration for CT channel 2.
    pub ct2_slope: f32,
    pub ct2_intercept: f32,
    /// Voltage transducer sensitivity (scale factor, mV -> V).
    pub voltage_sensitivity: f32,

    // --- Timing ---
    /// ADC sampling tick interval (microseconds).
    pub sample_interval_us: u32,
    /// Control loop interval (milliseconds).
    pub control_interval_ms: u32,
    /// Remote command poll interval (seconds).
    pub poll_interval_secs: u32,
    /// Telemetry report interval (seconds).
    pub telemetry_interval_secs: u32,

    // --- Network ---
    /// Per-request HTTP timeout (seconds).
    pub http_timeout_secs: u32,
    /// Fixed WiFi reconnect interval (seconds).  Deliberately much longer
    /// than the request timeout so a flaky AP does not cause a retry storm.
    pub wifi_retry_secs: u32,
    /// Base URL of the telemetry/command server.
    pub server_url: heapless::String<128>,
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Calibration
            calibration_samples: 1250,
            calibration_delay_ms: 1,

            // Signal conditioning
            mains_freq_hz: 50.0,
            ct1_slope: 0.02,
            ct1_intercept: -0.01,
            ct2_slope: 0.02,
            ct2_intercept: -0.01,
            voltage_sensitivity: 890.0,

            // Timing
            sample_interval_us: 1_000,  // 1 kHz
            control_interval_ms: 1_000, // 1 Hz
            poll_interval_secs: 2,
            telemetry_interval_secs: 5,

            // Network
            http_timeout_secs: 5,
            wifi_retry_secs: 30,
            server_url: heapless::String::try_from("http://192.168.1.10:5000")
                .unwrap_or_default(),
            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),
        }
    }
}

impl SystemConfig {
    /// Trailing RMS window length in seconds for the configured mains
    /// frequency (40 cycles of the line waveform).
    pub fn rms_window_secs(&self) -> f32 {
        40.0 / self.mains_freq_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.calibration_samples > 0);
        assert!(c.mains_freq_hz > 0.0);
        assert!(c.sample_interval_us > 0);
        assert!(c.control_interval_ms > 0);
        assert!(c.http_timeout_secs > 0);
    }

    #[test]
    fn rms_window_matches_line_frequency() {
        let mut c = SystemConfig::default();
        assert!((c.rms_window_secs() - 0.8).abs() < 1e-6);
        c.mains_freq_hz = 60.0;
        assert!((c.rms_window_secs() - 40.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn reconnect_interval_exceeds_request_timeout() {
        let c = SystemConfig::default();
        assert!(
            c.wifi_retry_secs > c.http_timeout_secs,
            "reconnect pacing must be slower than a single request timeout"
        );
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.calibration_samples, c2.calibration_samples);
        assert!((c.ct1_slope - c2.ct1_slope).abs() < 1e-9);
        assert_eq!(c.server_url, c2.server_url);
    }
}
