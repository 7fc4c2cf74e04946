//! Latest-value handoff of the published angle.

use core::sync::atomic::{AtomicU32, Ordering};

/// Single-writer, single-reader cell holding the last published angle
///
/// The acquisition loop publishes once per cycle; the presentation side reads
/// whenever it redraws. Only the latest value is kept. The cell is `Sync` and
/// `const`-constructible so it can live in a `static`.
#[derive(Debug)]
pub struct AngleCell {
    bits: AtomicU32,
}

impl AngleCell {
    /// A cell reading `0.0°` until the first publish
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bits: AtomicU32::new(0),
        }
    }

    pub fn publish(&self, angle_deg: f32) {
        self.bits.store(angle_deg.to_bits(), Ordering::Release);
    }

    #[must_use]
    pub fn latest(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }
}

impl Default for AngleCell {
    fn default() -> Self {
        Self::new()
    }
}
