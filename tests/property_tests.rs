//! Property tests for the signal-conditioning pipeline.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32
//! targets.  On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use embedded_hal::delay::DelayNs;
use proptest::prelude::*;

use mainsmon::drivers::hw_init;
use mainsmon::sensors::channel::CalibratedChannel;
use mainsmon::sensors::rms::WindowedRms;
use mainsmon::sensors::smoothing::{linearize, MovingAverage, NOISE_FLOOR_AMPS, SMOOTHING_DEPTH};

const MV_PER_COUNT: f32 = 3300.0 / 4095.0;

// ── Calibration: offset == mean of the sampled readings ───────

/// Delay impl that stages the next raw reading between calibration
/// samples, so one calibrate() call sees an arbitrary sequence.
struct StagedReadings<'a> {
    channel: u32,
    values: &'a [u16],
    next: usize,
}

impl DelayNs for StagedReadings<'_> {
    fn delay_ns(&mut self, _ns: u32) {
        if let Some(v) = self.values.get(self.next) {
            hw_init::sim_set_adc_raw(self.channel, *v);
            self.next += 1;
        }
    }
}

proptest! {
    /// For any N >= 1 raw readings, the stored offset is the arithmetic
    /// mean of the converted millivolt values.
    #[test]
    fn calibrate_stores_the_mean(
        values in proptest::collection::vec(0u16..=4095, 1..=32),
    ) {
        // Channel 8 is reserved for this test; the sequential proptest
        // cases cannot race each other.
        let channel = 8;
        hw_init::sim_set_adc_raw(channel, values[0]);
        let mut staged = StagedReadings { channel, values: &values, next: 1 };

        let mut ch = CalibratedChannel::new(channel);
        let offset = ch.calibrate(values.len() as u16, 1, &mut staged);

        let mut sum = 0.0f32;
        for v in &values {
            sum += f32::from(*v) * MV_PER_COUNT;
        }
        let mean = sum / values.len() as f32;

        prop_assert!(
            (offset - mean).abs() < 1e-2,
            "offset {} vs mean {}", offset, mean
        );
        prop_assert!(ch.is_calibrated());
    }
}

// ── RMS: non-negative for every input sequence ────────────────

proptest! {
    #[test]
    fn rms_is_never_negative(
        samples in proptest::collection::vec(-5000.0f32..5000.0, 0..500),
        window in 0.05f32..2.0,
    ) {
        let mut rms = WindowedRms::new(window);
        prop_assert!(rms.rms() >= 0.0);
        for s in samples {
            rms.feed(s, 0.001);
            prop_assert!(rms.rms() >= 0.0);
        }
    }

    /// Retuning the window never disturbs the current estimate.
    #[test]
    fn window_retune_preserves_the_estimate(
        samples in proptest::collection::vec(-500.0f32..500.0, 1..200),
        new_window in 0.05f32..2.0,
    ) {
        let mut rms = WindowedRms::new(0.8);
        for s in samples {
            rms.feed(s, 0.001);
        }
        let before = rms.rms();
        rms.set_window_secs(new_window);
        prop_assert_eq!(rms.rms(), before);
    }
}

// ── Linearization ─────────────────────────────────────────────

proptest! {
    /// linearize is the affine map and nothing else — no hidden state.
    #[test]
    fn linearize_is_the_affine_map(
        rms_mv in 0.0f32..4000.0,
        slope in -1.0f32..1.0,
        intercept in -10.0f32..10.0,
    ) {
        prop_assert_eq!(linearize(rms_mv, slope, intercept), intercept + slope * rms_mv);
    }
}

#[test]
fn linearize_matches_the_channel_calibration_point() {
    assert!((linearize(5.0, 0.02, -0.01) - 0.09).abs() < 1e-7);
}

// ── Smoothing: noise floor and warm-up arithmetic ─────────────

proptest! {
    /// The smoother returns exactly 0.0 whenever the buffer mean is below
    /// the noise floor (regardless of sign), and the plain mean otherwise.
    #[test]
    fn smooth_clamps_below_the_noise_floor(
        values in proptest::collection::vec(-1.0f32..1.0, 1..=20),
    ) {
        let mut avg = MovingAverage::new();

        // Shadow the ring with the same running-total arithmetic so the
        // expected mean is bit-identical to the implementation's.
        let mut slots = [0.0f32; SMOOTHING_DEPTH];
        let mut total = 0.0f32;
        let mut index = 0;

        for v in values {
            total -= slots[index];
            slots[index] = v;
            total += v;
            index = (index + 1) % SMOOTHING_DEPTH;
            let mean = total / SMOOTHING_DEPTH as f32;

            let out = avg.smooth(v);
            if mean < NOISE_FLOOR_AMPS {
                prop_assert_eq!(out, 0.0);
            } else {
                prop_assert_eq!(out, mean);
            }
        }
    }

    /// Before the buffer has seen SMOOTHING_DEPTH values, the mean still
    /// divides by the full depth — early readings are biased low.
    #[test]
    fn warm_up_divides_by_full_depth(
        value in 0.05f32..100.0,
        inserts in 1usize..SMOOTHING_DEPTH,
    ) {
        let mut avg = MovingAverage::new();
        let mut out = 0.0;
        for _ in 0..inserts {
            out = avg.smooth(value);
        }
        let expected = value * inserts as f32 / SMOOTHING_DEPTH as f32;
        prop_assert!(
            (out - expected).abs() < 1e-4,
            "got {}, expected {}", out, expected
        );
    }
}
