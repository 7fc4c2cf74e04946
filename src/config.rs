//! Tunables of the acquisition pipeline.

use crate::{
    calibration::{CalibrationMap, ExtrapolationPolicy},
    error::ConfigError,
};

/// Acquisition parameters
///
/// The defaults match the reference hardware: a 10 kHz excitation sampled in
/// millivolts, a 2 µs conversion time and a 100 ms refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Level separating the high and low half of the reference signal
    pub reference_threshold: f32,
    /// A run must exceed this many samples to count as stable
    pub confirm_count: u16,
    /// Upper bound on reference samples per synchronization pass
    pub iteration_budget: u32,
    /// Minimum window mean for a channel to count as present
    pub phase_threshold: f32,
    /// Magnitude used when a channel never clears `phase_threshold`
    pub magnitude_floor: f32,
    /// Upper end of the near-zero cosine band `[0, singular_band]`
    pub singular_band: f32,
    /// Per-quadrant angle correction
    pub calibration: CalibrationMap,
    /// Idle time between acquisition cycles
    pub tick_ms: u32,
}

impl Config {
    pub const DEFAULT_THRESHOLD: f32 = 50.0;
    pub const DEFAULT_CONFIRM_COUNT: u16 = 2;
    pub const DEFAULT_ITERATION_BUDGET: u32 = 10_000;
    pub const DEFAULT_MAGNITUDE_FLOOR: f32 = 0.001;
    pub const DEFAULT_SINGULAR_BAND: f32 = 0.01;
    pub const DEFAULT_TICK_MS: u32 = 100;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            reference_threshold: Self::DEFAULT_THRESHOLD,
            confirm_count: Self::DEFAULT_CONFIRM_COUNT,
            iteration_budget: Self::DEFAULT_ITERATION_BUDGET,
            phase_threshold: Self::DEFAULT_THRESHOLD,
            magnitude_floor: Self::DEFAULT_MAGNITUDE_FLOOR,
            singular_band: Self::DEFAULT_SINGULAR_BAND,
            calibration: CalibrationMap::new(
                CalibrationMap::DEFAULT_RANGES,
                ExtrapolationPolicy::Extrapolate,
            ),
            tick_ms: Self::DEFAULT_TICK_MS,
        }
    }

    #[must_use]
    pub const fn with_iteration_budget(mut self, budget: u32) -> Self {
        self.iteration_budget = budget;
        self
    }

    #[must_use]
    pub const fn with_confirm_count(mut self, count: u16) -> Self {
        self.confirm_count = count;
        self
    }

    #[must_use]
    pub const fn with_calibration(mut self, calibration: CalibrationMap) -> Self {
        self.calibration = calibration;
        self
    }

    #[must_use]
    pub const fn with_tick_ms(mut self, tick_ms: u32) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    /// Check that every computation stays well defined with these values
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iteration_budget == 0 {
            return Err(ConfigError::ZeroIterationBudget);
        }
        // A non-positive threshold would let a zero mean through as magnitude
        if !(self.phase_threshold > 0.0 && self.phase_threshold.is_finite()) {
            return Err(ConfigError::NonPositiveThreshold);
        }
        if !(self.magnitude_floor > 0.0 && self.magnitude_floor.is_finite()) {
            return Err(ConfigError::NonPositiveFloor);
        }
        if self.singular_band.is_nan() || self.singular_band < 0.0 {
            return Err(ConfigError::NegativeSingularBand);
        }
        if let Some(quadrant) = self.calibration.degenerate_quadrant() {
            return Err(ConfigError::DegenerateCalibration(quadrant));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
