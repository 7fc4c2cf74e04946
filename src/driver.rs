//! Resolver angle decoder

use embedded_hal::digital::OutputPin;

use crate::{
    angle,
    channel::Channel,
    config::Config,
    diagnostics::Acquisition,
    error::{ConfigError, Error},
    phase::{PhaseReading, Quadrant},
    source::{NoDebugPin, SampleSource},
    sync::{ReferenceSynchronizer, SyncOutcome},
    window::SampleBuffer,
};

/// Resolver decoder instance
///
/// Owns the sample source, the optional debug line toggled around every
/// reference synchronization, and the window buffer reused by every cycle.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resolver<S, P = NoDebugPin> {
    source: S,
    debug_pin: P,
    config: Config,
    synchronizer: ReferenceSynchronizer,
    window: SampleBuffer,
    sync_timeouts: u8,
}

impl<S: SampleSource> Resolver<S> {
    /// Create a decoder with the default [`Config`] and no debug line
    pub fn new(source: S) -> Self {
        Self::build(source, NoDebugPin, Config::new())
    }
}

impl<S, P> Resolver<S, P>
where
    S: SampleSource,
    P: OutputPin,
{
    /// Create a decoder with a custom configuration and a debug line
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] reported by [`Config::validate`]
    pub fn with_config(source: S, debug_pin: P, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(source, debug_pin, config))
    }

    fn build(source: S, debug_pin: P, config: Config) -> Self {
        Self {
            source,
            debug_pin,
            synchronizer: ReferenceSynchronizer::from_config(&config),
            config,
            window: SampleBuffer::new(),
            sync_timeouts: 0,
        }
    }

    /// Release the sample source and debug line, consuming the decoder
    pub fn release(self) -> (S, P) {
        (self.source, self.debug_pin)
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Align to the reference signal, driving the debug line high meanwhile
    ///
    /// # Errors
    ///
    /// Returns an error if a reference reading fails
    pub fn synchronize(&mut self) -> Result<SyncOutcome, Error<S::Error>> {
        if self.debug_pin.set_high().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to raise debug line");
        }

        let outcome = self.synchronizer.synchronize(&mut self.source);

        if self.debug_pin.set_low().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to lower debug line");
        }

        let outcome = outcome?;
        if outcome == SyncOutcome::BudgetExhausted {
            self.sync_timeouts = self.sync_timeouts.saturating_add(1);
        }
        Ok(outcome)
    }

    /// Fill the window with `channel` and return its mean
    ///
    /// # Errors
    ///
    /// Returns an error if a reading fails or is not finite
    pub fn sample_mean(&mut self, channel: Channel) -> Result<f32, Error<S::Error>> {
        Ok(self.window.fill(&mut self.source, channel)?.mean())
    }

    /// Last window taken by [`Self::sample_mean`]
    #[must_use]
    pub const fn window(&self) -> &SampleBuffer {
        &self.window
    }

    /// Synchronize, average one window of `channel` and infer its polarity
    ///
    /// A mean below the phase threshold gets a second synchronized window. If
    /// that one clears the threshold the channel is negative, otherwise its
    /// magnitude is floored.
    ///
    /// # Errors
    ///
    /// Returns an error if a reading fails or is not finite
    pub fn read_phase(&mut self, channel: Channel) -> Result<PhaseReading, Error<S::Error>> {
        self.synchronize()?;
        let mean = self.sample_mean(channel)?;
        if let Some(reading) = PhaseReading::from_first(mean, self.config.phase_threshold) {
            return Ok(reading);
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("{} mean {} below threshold, retrying", channel, mean);

        self.synchronize()?;
        let mean = self.sample_mean(channel)?;
        let reading = PhaseReading::from_retry(
            mean,
            self.config.phase_threshold,
            self.config.magnitude_floor,
        );

        #[cfg(feature = "defmt")]
        if reading.is_floored() {
            defmt::debug!("{} absent on both windows, magnitude floored", channel);
        }

        Ok(reading)
    }

    /// Run one full acquisition cycle: sine, then cosine, then angle and
    /// calibration
    ///
    /// # Errors
    ///
    /// Returns an error if a reading fails or is not finite
    pub fn acquire(&mut self) -> Result<Acquisition, Error<S::Error>> {
        self.sync_timeouts = 0;

        let sine = self.read_phase(Channel::Sine)?;
        let cosine = self.read_phase(Channel::Cosine)?;
        let quadrant = Quadrant::from_phases(sine.is_positive(), cosine.is_positive());

        let raw = angle::raw_angle(
            sine.magnitude(),
            cosine.magnitude(),
            quadrant,
            self.config.singular_band,
        );
        let degrees = self.config.calibration.apply(raw.degrees, quadrant);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Q{} raw {}° calibrated {}° (sin {}, cos {})",
            quadrant.number(),
            raw.degrees,
            degrees,
            sine.magnitude(),
            cosine.magnitude()
        );

        Ok(Acquisition::new(
            sine,
            cosine,
            quadrant,
            raw.degrees,
            raw.singular,
            degrees,
            self.sync_timeouts,
        ))
    }
}
