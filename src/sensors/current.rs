//! Current-transformer channel: calibrated acquisition, windowed RMS, and
//! smoothing composed into one sensor.
//!
//! The split between [`update`](CurrentSensor::update) and
//! [`read_amps`](CurrentSensor::read_amps) mirrors the duty cycle of the
//! control loop: `update` runs on every sampling tick to keep the RMS
//! window fed, `read_amps` runs once per control cycle to produce the
//! smoothed figure used for display and telemetry.

use embedded_hal::delay::DelayNs;
use log::debug;

use super::channel::CalibratedChannel;
use super::rms::WindowedRms;
use super::smoothing::{linearize, MovingAverage};

pub struct CurrentSensor {
    channel: CalibratedChannel,
    rms: WindowedRms,
    avg: MovingAverage,
    slope: f32,
    intercept: f32,
}

impl CurrentSensor {
    /// `adc_channel` is the ADC1 channel the CT burden resistor feeds;
    /// `slope`/`intercept` are the channel's linear calibration;
    /// `mains_freq_hz` sets the RMS window to 40 line cycles.
    pub fn new(adc_channel: u32, slope: f32, intercept: f32, mains_freq_hz: f32) -> Self {
        Self {
            channel: CalibratedChannel::new(adc_channel),
            rms: WindowedRms::new(40.0 / mains_freq_hz),
            avg: MovingAverage::new(),
            slope,
            intercept,
        }
    }

    /// Blocking zero-offset calibration.  Run with no load connected,
    /// before the control loop starts.
    pub fn calibrate(&mut self, samples: u16, delay_ms: u32, delay: &mut impl DelayNs) -> f32 {
        self.channel.calibrate(samples, delay_ms, delay)
    }

    /// Feed one corrected sample into the RMS window.  Does nothing until
    /// the channel has been calibrated.
    pub fn update(&mut self, dt_secs: f32) {
        if let Some(corrected_mv) = self.channel.sample() {
            self.rms.feed(corrected_mv, dt_secs);
        }
    }

    /// Smoothed RMS current in amps.  Zero before calibration.
    ///
    /// Advances the moving-average buffer, so call this once per control
    /// cycle, not per sample.
    pub fn read_amps(&mut self) -> f32 {
        if !self.channel.is_calibrated() {
            return 0.0;
        }
        let rms_mv = self.rms.rms();
        let amps = self.avg.smooth(linearize(rms_mv, self.slope, self.intercept));
        debug!("CT rms {:.3} mV -> {:.3} A", rms_mv, amps);
        amps
    }

    /// Retune the RMS window for a different line frequency.
    pub fn set_mains_frequency(&mut self, hz: f32) {
        self.rms.set_window_secs(40.0 / hz);
    }

    pub fn is_calibrated(&self) -> bool {
        self.channel.is_calibrated()
    }

    pub fn offset_mv(&self) -> f32 {
        self.channel.offset_mv()
    }
}
