use crate::{channel::Channel, phase::Quadrant};

/// Error type for resolver acquisition
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The sample source failed to deliver a reading
    Sampling(E),
    /// The sample source returned a non-finite voltage for this channel
    InvalidReading(Channel),
}

/// Rejected [`Config`](crate::Config) values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The synchronizer needs at least one sample per pass
    ZeroIterationBudget,
    /// The phase threshold must be a positive, finite value
    NonPositiveThreshold,
    /// The magnitude floor must be a positive, finite value
    NonPositiveFloor,
    /// The near-zero cosine band must start at zero and grow upwards
    NegativeSingularBand,
    /// The calibration range of this quadrant has `in_min == in_max`
    DegenerateCalibration(Quadrant),
}
