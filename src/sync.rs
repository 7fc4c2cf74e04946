//! Debounced alignment to the excitation reference.
//!
//! The synchronizer busy-polls the reference channel until it sees a stable
//! low phase (or the end of a high phase followed by a stable dip and rise),
//! so that the window taken right after starts at a repeatable point of the
//! excitation cycle. Every pass is bounded by [`Config::iteration_budget`].
//! Running out of budget is not an error: acquisition proceeds with whatever
//! alignment it got.

use crate::{channel::Channel, config::Config, error::Error, source::SampleSource};

/// How a synchronization attempt ended
///
/// Informational only, the pipeline samples regardless of the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncOutcome {
    /// The reference settled below threshold and was confirmed a second time
    Settled,
    /// The reference was high, dipped below threshold and came back up
    RisingEdge,
    /// A pass ran out of samples before its run was confirmed
    BudgetExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Above,
    Below,
}

/// Reference edge qualifier
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReferenceSynchronizer {
    threshold: f32,
    confirm_count: u16,
    iteration_budget: u32,
}

impl ReferenceSynchronizer {
    #[must_use]
    pub const fn new(threshold: f32, confirm_count: u16, iteration_budget: u32) -> Self {
        Self {
            threshold,
            confirm_count,
            iteration_budget,
        }
    }

    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self::new(
            config.reference_threshold,
            config.confirm_count,
            config.iteration_budget,
        )
    }

    /// Wait (bounded) for a consistent point of the reference cycle
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sampling`] or [`Error::InvalidReading`] if a reference
    /// reading fails. Timeouts are reported through
    /// [`SyncOutcome::BudgetExhausted`], never as an error.
    pub fn synchronize<S: SampleSource>(
        &self,
        source: &mut S,
    ) -> Result<SyncOutcome, Error<S::Error>> {
        let Some(dominant) = self.dominant_level(source)? else {
            #[cfg(feature = "defmt")]
            defmt::debug!("Reference never held a level, skipping alignment");
            return Ok(SyncOutcome::BudgetExhausted);
        };

        let mut budget = self.iteration_budget;
        let outcome = match dominant {
            Level::Below => {
                if self.confirm_run(source, Level::Below, &mut budget)? {
                    SyncOutcome::Settled
                } else {
                    SyncOutcome::BudgetExhausted
                }
            }
            Level::Above => {
                if self.confirm_run(source, Level::Below, &mut budget)?
                    && self.confirm_run(source, Level::Above, &mut budget)?
                {
                    SyncOutcome::RisingEdge
                } else {
                    SyncOutcome::BudgetExhausted
                }
            }
        };

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "Reference sync {} after {} samples",
            outcome,
            self.iteration_budget - budget
        );

        Ok(outcome)
    }

    /// First phase: track both run lengths until one of them exceeds the
    /// confirmation count
    fn dominant_level<S: SampleSource>(
        &self,
        source: &mut S,
    ) -> Result<Option<Level>, Error<S::Error>> {
        let mut above = 0u16;
        let mut below = 0u16;

        for _ in 0..self.iteration_budget {
            match self.level(source)? {
                Level::Above => {
                    above = above.saturating_add(1);
                    below = 0;
                }
                Level::Below => {
                    below = below.saturating_add(1);
                    above = 0;
                }
            }
            if above > self.confirm_count {
                return Ok(Some(Level::Above));
            }
            if below > self.confirm_count {
                return Ok(Some(Level::Below));
            }
        }

        Ok(None)
    }

    /// Sample until `level` has been seen more than `confirm_count` times in a
    /// row, drawing from `budget`. Returns `false` if the budget ran out.
    fn confirm_run<S: SampleSource>(
        &self,
        source: &mut S,
        level: Level,
        budget: &mut u32,
    ) -> Result<bool, Error<S::Error>> {
        let mut run = 0u16;
        while run <= self.confirm_count {
            if *budget == 0 {
                return Ok(false);
            }
            *budget -= 1;
            if self.level(source)? == level {
                run = run.saturating_add(1);
            } else {
                run = 0;
            }
        }
        Ok(true)
    }

    fn level<S: SampleSource>(&self, source: &mut S) -> Result<Level, Error<S::Error>> {
        let voltage = source.read(Channel::Reference).map_err(Error::Sampling)?;
        if !voltage.is_finite() {
            return Err(Error::InvalidReading(Channel::Reference));
        }
        Ok(if voltage >= self.threshold {
            Level::Above
        } else {
            Level::Below
        })
    }
}

impl Default for ReferenceSynchronizer {
    fn default() -> Self {
        Self::from_config(&Config::new())
    }
}
