//! Zero-offset calibrated ADC channel.
//!
//! Raw 12-bit readings are scaled to millivolts against the 3.3 V reference,
//! then corrected by a zero offset measured at calibration time (the DC bias
//! introduced by the sensor's mid-rail divider).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the assigned ADC1 channel via the oneshot API
//! (initialised by hw_init).  On host/test: reads the per-channel sim value
//! injected through [`hw_init::sim_set_adc_raw`](crate::drivers::hw_init).

use embedded_hal::delay::DelayNs;
use log::info;

use crate::drivers::hw_init;

/// ADC reference voltage in millivolts.
pub const ADC_REF_MV: f32 = 3300.0;
/// Full-scale raw reading at 12-bit resolution.
pub const ADC_MAX: f32 = 4095.0;

/// One analog input with zero-offset correction.
///
/// Until [`calibrate`](Self::calibrate) has run, [`sample`](Self::sample)
/// yields `None` so callers cannot mistake an uncorrected reading for a
/// real one.
pub struct CalibratedChannel {
    adc_channel: u32,
    offset_mv: f32,
    calibrated: bool,
}

impl CalibratedChannel {
    pub fn new(adc_channel: u32) -> Self {
        Self {
            adc_channel,
            offset_mv: 0.0,
            calibrated: false,
        }
    }

    /// Measure the zero offset: average `samples` raw readings taken
    /// `delay_ms` apart (with no load connected) and store the mean.
    ///
    /// Blocking by design — calibration halts the node until it finishes,
    /// and everything downstream assumes it completed before the first
    /// real read.  Recalibration simply overwrites the offset.
    ///
    /// Returns the measured offset in millivolts.
    pub fn calibrate(&mut self, samples: u16, delay_ms: u32, delay: &mut impl DelayNs) -> f32 {
        let samples = samples.max(1);
        info!("Calibrating ADC1 channel {}...", self.adc_channel);

        let mut sum = 0.0;
        for _ in 0..samples {
            sum += self.read_millivolts();
            delay.delay_ms(delay_ms);
        }

        self.offset_mv = sum / f32::from(samples);
        self.calibrated = true;

        info!(
            "ADC1 channel {}: zero offset {:.2} mV",
            self.adc_channel, self.offset_mv
        );
        self.offset_mv
    }

    /// One corrected instantaneous reading in millivolts, or `None` before
    /// calibration (the neutral case — callers skip the estimator update).
    pub fn sample(&mut self) -> Option<f32> {
        if !self.calibrated {
            return None;
        }
        Some(self.read_millivolts() - self.offset_mv)
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn offset_mv(&self) -> f32 {
        self.offset_mv
    }

    fn read_millivolts(&self) -> f32 {
        f32::from(hw_init::adc1_read(self.adc_channel)) * ADC_REF_MV / ADC_MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoDelay;
    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn to_mv(raw: u16) -> f32 {
        f32::from(raw) * ADC_REF_MV / ADC_MAX
    }

    #[test]
    fn uncalibrated_sample_is_neutral() {
        let mut ch = CalibratedChannel::new(0);
        assert_eq!(ch.sample(), None);
        assert!(!ch.is_calibrated());
    }

    #[test]
    fn calibrate_stores_mean_of_constant_input() {
        hw_init::sim_set_adc_raw(1, 2048);
        let mut ch = CalibratedChannel::new(1);
        let offset = ch.calibrate(10, 0, &mut NoDelay);
        assert!((offset - to_mv(2048)).abs() < 1e-3);
        assert!(ch.is_calibrated());
    }

    #[test]
    fn sample_subtracts_offset() {
        hw_init::sim_set_adc_raw(2, 1000);
        let mut ch = CalibratedChannel::new(2);
        ch.calibrate(5, 0, &mut NoDelay);

        hw_init::sim_set_adc_raw(2, 1500);
        let corrected = ch.sample().unwrap();
        assert!((corrected - (to_mv(1500) - to_mv(1000))).abs() < 1e-3);
    }

    #[test]
    fn recalibration_overwrites_offset() {
        hw_init::sim_set_adc_raw(3, 800);
        let mut ch = CalibratedChannel::new(3);
        ch.calibrate(4, 0, &mut NoDelay);
        let first = ch.offset_mv();

        hw_init::sim_set_adc_raw(3, 1600);
        ch.calibrate(4, 0, &mut NoDelay);
        assert!(ch.offset_mv() > first);
    }

    #[test]
    fn zero_sample_count_is_clamped_to_one() {
        hw_init::sim_set_adc_raw(4, 1234);
        let mut ch = CalibratedChannel::new(4);
        let offset = ch.calibrate(0, 0, &mut NoDelay);
        assert!((offset - to_mv(1234)).abs() < 1e-3);
    }
}
