//! Fixed sample window and its average.

use crate::{channel::Channel, error::Error, source::SampleSource};

/// Number of consecutive readings taken per window
pub const WINDOW_LEN: usize = 23;

/// One window of voltage readings for a single channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleBuffer {
    samples: [f32; WINDOW_LEN],
}

impl SampleBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            samples: [0.0; WINDOW_LEN],
        }
    }

    #[must_use]
    pub const fn from_samples(samples: [f32; WINDOW_LEN]) -> Self {
        Self { samples }
    }

    #[must_use]
    pub const fn samples(&self) -> &[f32; WINDOW_LEN] {
        &self.samples
    }

    /// Overwrite the window with consecutive readings of `channel`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sampling`] if the source fails and
    /// [`Error::InvalidReading`] if it returns a non-finite voltage. The
    /// window contents are unspecified after an error.
    pub fn fill<S: SampleSource>(
        &mut self,
        source: &mut S,
        channel: Channel,
    ) -> Result<&Self, Error<S::Error>> {
        for slot in &mut self.samples {
            let voltage = source.read(channel).map_err(Error::Sampling)?;
            if !voltage.is_finite() {
                #[cfg(feature = "defmt")]
                defmt::warn!("Non-finite reading on {}", channel);
                return Err(Error::InvalidReading(channel));
            }
            *slot = voltage;
        }
        Ok(self)
    }

    /// Arithmetic mean over all [`WINDOW_LEN`] samples
    #[must_use]
    pub fn mean(&self) -> f32 {
        let sum: f32 = self.samples.iter().sum();
        #[allow(clippy::cast_precision_loss)]
        let len = WINDOW_LEN as f32;
        sum / len
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}
