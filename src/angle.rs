//! Raw shaft angle from the signed sine and cosine magnitudes.

use core::f32::consts::PI;

use crate::phase::Quadrant;

/// Radians to degrees
pub const RAD_TO_DEG: f32 = 180.0 / PI;

/// Denominator substituted for a cosine that sits in the near-zero band
pub const SINGULAR_DIVISOR: f32 = 0.001;

/// Quadrant-corrected angle before calibration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawAngle {
    /// Angle in degrees
    pub degrees: f32,
    /// The cosine fell in `[0, singular_band]` and the ratio was clamped
    pub singular: bool,
}

/// Compute the angle of `(sine, cosine)` in degrees and fold it into `quadrant`
///
/// A cosine in `[0, singular_band]` takes the protected path
/// `|atan(sine / 0.001)|`, which drives the result towards the 90° boundary
/// instead of dividing by (almost) zero.
#[must_use]
pub fn raw_angle(sine: f32, cosine: f32, quadrant: Quadrant, singular_band: f32) -> RawAngle {
    let singular = (0.0..=singular_band).contains(&cosine);

    let radians = if singular {
        libm::fabsf(libm::atanf(sine / SINGULAR_DIVISOR))
    } else {
        libm::atanf(sine / cosine)
    };
    let degrees = radians * RAD_TO_DEG;

    let degrees = match quadrant {
        Quadrant::First => degrees,
        Quadrant::Second if singular => 180.0 - degrees,
        Quadrant::Second => 180.0 + degrees,
        Quadrant::Third => 180.0 - degrees,
        Quadrant::Fourth => 360.0 - degrees,
    };

    RawAngle { degrees, singular }
}
