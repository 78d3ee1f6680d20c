//! Trailing-window RMS estimator.
//!
//! Tracks a running mean and mean-square of the input with a single-pole
//! response whose time constant is the configured window length, then
//! reports the RMS magnitude about the running mean.  For the zero-centred
//! AC signal a calibrated channel produces, that magnitude is the effective
//! (RMS) amplitude; the residual-mean subtraction makes the estimate robust
//! against small leftover DC after calibration.
//!
//! The window is wall-clock based, not sample-count based: each `feed`
//! carries the elapsed time since the previous one, so the averaging span
//! stays correct even if the sampling cadence jitters.

/// Lower bound on the window so a misconfigured line frequency cannot
/// collapse the estimator into tracking the instantaneous signal.
const MIN_WINDOW_SECS: f32 = 0.01;

pub struct WindowedRms {
    window_secs: f32,
    mean: f32,
    mean_sq: f32,
    primed: bool,
}

impl WindowedRms {
    pub fn new(window_secs: f32) -> Self {
        Self {
            window_secs: window_secs.max(MIN_WINDOW_SECS),
            mean: 0.0,
            mean_sq: 0.0,
            primed: false,
        }
    }

    /// Fold one corrected sample into the estimate.  `dt_secs` is the time
    /// since the previous sample, supplied by the caller (the sampling tick
    /// knows its own cadence).
    pub fn feed(&mut self, sample: f32, dt_secs: f32) {
        if dt_secs <= 0.0 {
            return;
        }
        if !self.primed {
            self.mean = sample;
            self.mean_sq = sample * sample;
            self.primed = true;
            return;
        }
        let alpha = 1.0 - (-dt_secs / self.window_secs).exp();
        self.mean += alpha * (sample - self.mean);
        self.mean_sq += alpha * (sample * sample - self.mean_sq);
    }

    /// Current RMS magnitude of the windowed signal.  Always >= 0.
    pub fn rms(&self) -> f32 {
        (self.mean_sq - self.mean * self.mean).max(0.0).sqrt()
    }

    /// Retune the trailing window (e.g. for a different mains frequency).
    /// Affects how subsequent samples are weighted; the current estimate is
    /// left untouched.
    pub fn set_window_secs(&mut self, secs: f32) {
        self.window_secs = secs.max(MIN_WINDOW_SECS);
    }

    pub fn window_secs(&self) -> f32 {
        self.window_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let rms = WindowedRms::new(0.8);
        assert_eq!(rms.rms(), 0.0);
    }

    #[test]
    fn constant_input_has_zero_magnitude() {
        let mut rms = WindowedRms::new(0.8);
        for _ in 0..1000 {
            rms.feed(512.0, 0.001);
        }
        // DC input: mean ~= input, variance ~= 0.
        assert!(rms.rms() < 1.0);
    }

    #[test]
    fn square_wave_converges_to_amplitude() {
        let mut rms = WindowedRms::new(0.1);
        // +/-100 mV square wave at 1 kHz sampling: RMS = 100.
        for i in 0..5000 {
            let s = if i % 20 < 10 { 100.0 } else { -100.0 };
            rms.feed(s, 0.001);
        }
        let value = rms.rms();
        assert!((value - 100.0).abs() < 5.0, "rms was {value}");
    }

    #[test]
    fn never_negative() {
        let mut rms = WindowedRms::new(0.8);
        for i in 0..200 {
            rms.feed(-50.0 * (i as f32), 0.001);
            assert!(rms.rms() >= 0.0);
        }
    }

    #[test]
    fn window_change_keeps_last_value() {
        let mut rms = WindowedRms::new(0.8);
        for i in 0..2000 {
            let s = if i % 2 == 0 { 80.0 } else { -80.0 };
            rms.feed(s, 0.001);
        }
        let before = rms.rms();
        rms.set_window_secs(40.0 / 60.0);
        assert_eq!(rms.rms(), before);
        assert!((rms.window_secs() - 40.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn zero_dt_is_ignored() {
        let mut rms = WindowedRms::new(0.8);
        rms.feed(100.0, 0.001);
        let before = rms.rms();
        rms.feed(-5000.0, 0.0);
        assert_eq!(rms.rms(), before);
    }
}
