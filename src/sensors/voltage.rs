//! ZMPT101B AC voltage transducer.
//!
//! A single owned instance with an explicit init lifecycle: construct,
//! `init()` once (idempotent), read.  Reads before init or calibration
//! return 0.0 rather than junk.
//!
//! The transducer shares the conditioning path of the current channels
//! (mid-rail bias removed by zero-offset calibration, trailing-window RMS),
//! scaled to volts through a sensitivity factor.

use embedded_hal::delay::DelayNs;
use log::info;

use super::channel::CalibratedChannel;
use super::rms::WindowedRms;

pub struct VoltageSensor {
    channel: CalibratedChannel,
    rms: WindowedRms,
    sensitivity: f32,
    initialized: bool,
}

impl VoltageSensor {
    pub fn new(adc_channel: u32, sensitivity: f32, mains_freq_hz: f32) -> Self {
        Self {
            channel: CalibratedChannel::new(adc_channel),
            rms: WindowedRms::new(40.0 / mains_freq_hz),
            sensitivity,
            initialized: false,
        }
    }

    /// Bring the transducer into service.  Idempotent.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        info!("Voltage sensor initialised (sensitivity {})", self.sensitivity);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Blocking zero-offset calibration (mains disconnected).
    pub fn calibrate(&mut self, samples: u16, delay_ms: u32, delay: &mut impl DelayNs) -> f32 {
        self.channel.calibrate(samples, delay_ms, delay)
    }

    /// Feed one sample into the RMS window.
    pub fn update(&mut self, dt_secs: f32) {
        if !self.initialized {
            return;
        }
        if let Some(corrected_mv) = self.channel.sample() {
            self.rms.feed(corrected_mv, dt_secs);
        }
    }

    /// RMS line voltage in volts.  0.0 before init or calibration.
    pub fn rms_voltage(&self) -> f32 {
        if !self.initialized || !self.channel.is_calibrated() {
            return 0.0;
        }
        self.rms.rms() * self.sensitivity / 1000.0
    }

    /// Retune the RMS window for a different line frequency.
    pub fn set_mains_frequency(&mut self, hz: f32) {
        self.rms.set_window_secs(40.0 / hz);
    }

    pub fn set_sensitivity(&mut self, factor: f32) {
        self.sensitivity = factor;
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }
}
