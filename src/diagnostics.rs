//! Result of one acquisition cycle

use crate::phase::{PhaseReading, Quadrant};

/// Everything one pass through the pipeline computed
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Acquisition {
    sine: PhaseReading,
    cosine: PhaseReading,
    quadrant: Quadrant,
    raw_degrees: f32,
    singular: bool,
    degrees: f32,
    sync_timeouts: u8,
}

impl Acquisition {
    #[must_use]
    pub(crate) const fn new(
        sine: PhaseReading,
        cosine: PhaseReading,
        quadrant: Quadrant,
        raw_degrees: f32,
        singular: bool,
        degrees: f32,
        sync_timeouts: u8,
    ) -> Self {
        Self {
            sine,
            cosine,
            quadrant,
            raw_degrees,
            singular,
            degrees,
            sync_timeouts,
        }
    }

    /// Calibrated angle in degrees, the value that gets published
    #[must_use]
    pub const fn degrees(&self) -> f32 {
        self.degrees
    }

    /// Quadrant-corrected angle before calibration
    #[must_use]
    pub const fn raw_degrees(&self) -> f32 {
        self.raw_degrees
    }

    #[must_use]
    pub const fn quadrant(&self) -> Quadrant {
        self.quadrant
    }

    #[must_use]
    pub const fn sine(&self) -> &PhaseReading {
        &self.sine
    }

    #[must_use]
    pub const fn cosine(&self) -> &PhaseReading {
        &self.cosine
    }

    /// The cosine sat in the near-zero band and the ratio was clamped
    #[must_use]
    pub const fn singular(&self) -> bool {
        self.singular
    }

    /// Number of reference synchronizations in this cycle that ran out of
    /// budget
    ///
    /// A non-zero count on every cycle usually means the reference channel is
    /// disconnected.
    #[must_use]
    pub const fn sync_timeouts(&self) -> u8 {
        self.sync_timeouts
    }
}
