//! Per-quadrant linear correction of the measured angle.

use crate::phase::Quadrant;

/// Linearly map `x` from `[in_min, in_max]` onto `[out_min, out_max]`
///
/// Inputs outside the input range extrapolate along the same line. The caller
/// guarantees `in_min != in_max`.
#[must_use]
pub fn map_float(x: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// What to do with angles outside a quadrant's measured input range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExtrapolationPolicy {
    /// Continue the calibration line past the measured range
    #[default]
    Extrapolate,
    /// Pin the input to the measured range before mapping
    Clamp,
}

/// Measured input span of one quadrant and the true span it maps to
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationRange {
    pub in_min: f32,
    pub in_max: f32,
    pub out_min: f32,
    pub out_max: f32,
}

impl CalibrationRange {
    #[must_use]
    pub const fn new(in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> Self {
        Self {
            in_min,
            in_max,
            out_min,
            out_max,
        }
    }

    /// A range that cannot be inverted (`in_min == in_max`)
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        #[allow(clippy::float_cmp)]
        let degenerate = self.in_min == self.in_max;
        degenerate || !(self.in_min.is_finite() && self.in_max.is_finite())
    }

    #[must_use]
    pub fn apply(&self, angle_deg: f32, policy: ExtrapolationPolicy) -> f32 {
        let x = match policy {
            ExtrapolationPolicy::Extrapolate => angle_deg,
            ExtrapolationPolicy::Clamp => {
                let (lo, hi) = if self.in_min <= self.in_max {
                    (self.in_min, self.in_max)
                } else {
                    (self.in_max, self.in_min)
                };
                angle_deg.clamp(lo, hi)
            }
        };
        map_float(x, self.in_min, self.in_max, self.out_min, self.out_max)
    }
}

/// Empirical correction table for the four quadrants
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationMap {
    ranges: [CalibrationRange; 4],
    policy: ExtrapolationPolicy,
}

impl CalibrationMap {
    /// Table measured on the reference resolver
    pub const DEFAULT_RANGES: [CalibrationRange; 4] = [
        CalibrationRange::new(10.0, 82.0, 10.0, 80.0),
        CalibrationRange::new(95.0, 147.0, 90.0, 179.0),
        CalibrationRange::new(212.0, 255.0, 181.0, 269.0),
        CalibrationRange::new(280.0, 330.0, 270.0, 360.0),
    ];

    /// Build a map from ranges ordered quadrant 1 to 4
    #[must_use]
    pub const fn new(ranges: [CalibrationRange; 4], policy: ExtrapolationPolicy) -> Self {
        Self { ranges, policy }
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: ExtrapolationPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn policy(&self) -> ExtrapolationPolicy {
        self.policy
    }

    #[must_use]
    pub const fn range(&self, quadrant: Quadrant) -> &CalibrationRange {
        &self.ranges[quadrant.index()]
    }

    /// Replace the range used for `quadrant`
    #[must_use]
    pub const fn with_range(mut self, quadrant: Quadrant, range: CalibrationRange) -> Self {
        self.ranges[quadrant.index()] = range;
        self
    }

    /// Map a quadrant-corrected angle to the calibrated output
    #[must_use]
    pub fn apply(&self, angle_deg: f32, quadrant: Quadrant) -> f32 {
        self.range(quadrant).apply(angle_deg, self.policy)
    }

    /// First quadrant whose range cannot be mapped, if any
    pub(crate) fn degenerate_quadrant(&self) -> Option<Quadrant> {
        Quadrant::ALL
            .into_iter()
            .find(|quadrant| self.range(*quadrant).is_degenerate())
    }
}

impl Default for CalibrationMap {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RANGES, ExtrapolationPolicy::Extrapolate)
    }
}
