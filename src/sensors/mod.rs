//! Sensor subsystem — individual channels and the aggregating [`MeterHub`].
//!
//! The hub owns the voltage transducer and both current-transformer
//! channels, and produces a [`PowerSnapshot`] each control cycle.

pub mod channel;
pub mod current;
pub mod rms;
pub mod smoothing;
pub mod voltage;

use embedded_hal::delay::DelayNs;

use crate::config::SystemConfig;
use crate::pins;
use current::CurrentSensor;
use voltage::VoltageSensor;

/// One control cycle's worth of derived readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSnapshot {
    pub voltage_v: f32,
    pub current1_a: f32,
    pub current2_a: f32,
    pub total_current_a: f32,
    pub power1_w: f32,
    pub power2_w: f32,
    pub total_power_w: f32,
}

/// Aggregates the analog front end and derives power figures.
pub struct MeterHub {
    pub voltage: VoltageSensor,
    pub ct1: CurrentSensor,
    pub ct2: CurrentSensor,
}

impl MeterHub {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            voltage: VoltageSensor::new(
                pins::VOLTAGE_ADC_CH,
                config.voltage_sensitivity,
                config.mains_freq_hz,
            ),
            ct1: CurrentSensor::new(
                pins::CT1_ADC_CH,
                config.ct1_slope,
                config.ct1_intercept,
                config.mains_freq_hz,
            ),
            ct2: CurrentSensor::new(
                pins::CT2_ADC_CH,
                config.ct2_slope,
                config.ct2_intercept,
                config.mains_freq_hz,
            ),
        }
    }

    /// Blocking zero-offset calibration of all three channels, run once
    /// before the control loop starts.  Returns the measured offsets
    /// (voltage, ct1, ct2) in millivolts.
    pub fn calibrate_all(
        &mut self,
        config: &SystemConfig,
        delay: &mut impl DelayNs,
    ) -> (f32, f32, f32) {
        self.voltage.init();
        let n = config.calibration_samples;
        let pace = config.calibration_delay_ms;
        (
            self.voltage.calibrate(n, pace, delay),
            self.ct1.calibrate(n, pace, delay),
            self.ct2.calibrate(n, pace, delay),
        )
    }

    /// Feed one sampling tick into every RMS window.
    pub fn update(&mut self, dt_secs: f32) {
        self.voltage.update(dt_secs);
        self.ct1.update(dt_secs);
        self.ct2.update(dt_secs);
    }

    /// Derive the cycle's readings.  Advances the smoothing buffers, so
    /// call once per control cycle.
    pub fn read_all(&mut self) -> PowerSnapshot {
        let voltage_v = self.voltage.rms_voltage();
        let current1_a = self.ct1.read_amps();
        let current2_a = self.ct2.read_amps();

        PowerSnapshot {
            voltage_v,
            current1_a,
            current2_a,
            total_current_a: current1_a + current2_a,
            power1_w: voltage_v * current1_a,
            power2_w: voltage_v * current2_a,
            total_power_w: voltage_v * (current1_a + current2_a),
        }
    }

    /// Retune every RMS window for a different line frequency.
    pub fn set_mains_frequency(&mut self, hz: f32) {
        self.voltage.set_mains_frequency(hz);
        self.ct1.set_mains_frequency(hz);
        self.ct2.set_mains_frequency(hz);
    }
}
