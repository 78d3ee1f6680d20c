//! Reading linearization and moving-average smoothing.
//!
//! The RMS millivolt figure from the estimator maps to amps through a
//! per-channel linear calibration, then passes through a short moving
//! average to settle display/telemetry flicker.  Readings below the noise
//! floor clamp to exactly zero so an idle circuit reports 0.000 A instead
//! of picking up coupling noise.

/// Depth of the smoothing buffer.
pub const SMOOTHING_DEPTH: usize = 5;

/// Smoothed means below this (amps) are reported as exactly zero.
pub const NOISE_FLOOR_AMPS: f32 = 0.002;

/// Map an RMS millivolt value to a physical current via the channel's
/// linear calibration.
pub fn linearize(rms_mv: f32, slope: f32, intercept: f32) -> f32 {
    intercept + slope * rms_mv
}

/// Fixed-depth circular smoothing of successive converted readings.
///
/// The slots start at zero and the mean always divides by the full depth,
/// so the first few outputs after boot read low until the buffer has seen
/// `SMOOTHING_DEPTH` real values.  That warm-up bias is intentional device
/// behavior and is pinned by the tests below.
pub struct MovingAverage {
    readings: [f32; SMOOTHING_DEPTH],
    index: usize,
    total: f32,
}

impl MovingAverage {
    pub fn new() -> Self {
        Self {
            readings: [0.0; SMOOTHING_DEPTH],
            index: 0,
            total: 0.0,
        }
    }

    /// Insert `value`, evict the oldest slot, and return the mean of the
    /// buffer (clamped to zero below the noise floor).
    pub fn smooth(&mut self, value: f32) -> f32 {
        self.total -= self.readings[self.index];
        self.readings[self.index] = value;
        self.total += value;
        self.index = (self.index + 1) % SMOOTHING_DEPTH;

        let mean = self.total / SMOOTHING_DEPTH as f32;
        if mean < NOISE_FLOOR_AMPS { 0.0 } else { mean }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linearize_is_exact() {
        let amps = linearize(5.0, 0.02, -0.01);
        assert!((amps - 0.09).abs() < 1e-7);
    }

    #[test]
    fn warmed_buffer_returns_plain_mean() {
        let mut avg = MovingAverage::new();
        let mut last = 0.0;
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            last = avg.smooth(v);
        }
        assert!((last - 3.0).abs() < 1e-6);
    }

    #[test]
    fn warm_up_reads_low() {
        let mut avg = MovingAverage::new();
        // One reading of 10 A over four zero-filled slots: 10 / 5 = 2.
        assert!((avg.smooth(10.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn eviction_drops_oldest() {
        let mut avg = MovingAverage::new();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            avg.smooth(v);
        }
        // Sixth insert evicts the 1.0: mean of [2,3,4,5,6] = 4.
        assert!((avg.smooth(6.0) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn noise_floor_clamps_to_exact_zero() {
        let mut avg = MovingAverage::new();
        for _ in 0..SMOOTHING_DEPTH {
            assert_eq!(avg.smooth(0.0015), 0.0);
        }
    }

    #[test]
    fn negative_mean_clamps_to_exact_zero() {
        let mut avg = MovingAverage::new();
        for _ in 0..SMOOTHING_DEPTH {
            assert_eq!(avg.smooth(-0.5), 0.0);
        }
    }

    #[test]
    fn reading_above_floor_passes_through() {
        let mut avg = MovingAverage::new();
        let mut last = 0.0;
        for _ in 0..SMOOTHING_DEPTH {
            last = avg.smooth(0.5);
        }
        assert!((last - 0.5).abs() < 1e-6);
    }
}
