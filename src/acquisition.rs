//! Periodic acquisition loop.
//!
//! The loop idles for [`Config::tick_ms`](crate::Config::tick_ms), runs one
//! pipeline cycle, publishes the angle into an [`AngleCell`] and asks the
//! presentation layer to redraw. Cancellation is polled once per iteration and
//! never interrupts a cycle already in flight.

use embedded_hal::digital::OutputPin;

use crate::{
    diagnostics::Acquisition, driver::Resolver, error::Error, source::SampleSource,
    state::AngleCell,
};

/// Receives the angle after every completed cycle
pub trait Presenter {
    /// Repaint with the angle that was just published
    fn redraw(&mut self, angle_deg: f32);
}

impl<F: FnMut(f32)> Presenter for F {
    fn redraw(&mut self, angle_deg: f32) {
        self(angle_deg);
    }
}

/// Cooperative stop request
pub trait CancelSignal {
    /// `true` once the loop should terminate
    fn is_cancelled(&mut self) -> bool;
}

impl<F: FnMut() -> bool> CancelSignal for F {
    fn is_cancelled(&mut self) -> bool {
        self()
    }
}

/// State of the acquisition loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopState {
    /// Waiting for the next tick
    Idle,
    /// Running the pipeline
    Acquiring,
    /// Stopped for good
    Terminated,
}

/// Input to [`AcquisitionLoop::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopEvent {
    /// The idle wait elapsed without a cancel request
    Tick,
    /// A cancel request arrived
    Cancel,
}

/// Drives a [`Resolver`] once per tick and publishes the result
#[derive(Debug)]
pub struct AcquisitionLoop<'a, S, P> {
    resolver: Resolver<S, P>,
    angle: &'a AngleCell,
    state: LoopState,
    last: Option<Acquisition>,
}

impl<'a, S, P> AcquisitionLoop<'a, S, P>
where
    S: SampleSource,
    P: OutputPin,
{
    pub fn new(resolver: Resolver<S, P>, angle: &'a AngleCell) -> Self {
        Self {
            resolver,
            angle,
            state: LoopState::Idle,
            last: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Diagnostics of the most recent completed cycle
    #[must_use]
    pub const fn last_acquisition(&self) -> Option<&Acquisition> {
        self.last.as_ref()
    }

    /// Hand back the decoder, and with it the hardware
    pub fn release(self) -> Resolver<S, P> {
        self.resolver
    }

    /// Advance the state machine by one event
    ///
    /// A tick in [`LoopState::Idle`] runs one cycle, publishes the angle,
    /// triggers a redraw and returns to idle. A cancel terminates the loop.
    /// Once terminated, every event is ignored.
    ///
    /// # Errors
    ///
    /// A failed cycle terminates the loop and returns the error
    pub fn step<V: Presenter>(
        &mut self,
        event: LoopEvent,
        presenter: &mut V,
    ) -> Result<LoopState, Error<S::Error>> {
        match (self.state, event) {
            (LoopState::Terminated, _) => {}
            (_, LoopEvent::Cancel) => {
                #[cfg(feature = "defmt")]
                defmt::info!("Acquisition cancelled");
                self.state = LoopState::Terminated;
            }
            (LoopState::Idle | LoopState::Acquiring, LoopEvent::Tick) => {
                self.state = LoopState::Acquiring;
                let acquisition = match self.resolver.acquire() {
                    Ok(acquisition) => acquisition,
                    Err(error) => {
                        self.state = LoopState::Terminated;
                        return Err(error);
                    }
                };
                self.angle.publish(acquisition.degrees());
                presenter.redraw(acquisition.degrees());
                self.last = Some(acquisition);
                self.state = LoopState::Idle;
            }
        }
        Ok(self.state)
    }

    /// Run until cancelled, idling on an async delay between cycles
    ///
    /// # Errors
    ///
    /// Returns the error of the first failed cycle
    pub async fn run<D, C, V>(
        &mut self,
        mut delay: D,
        mut cancel: C,
        presenter: &mut V,
    ) -> Result<(), Error<S::Error>>
    where
        D: embedded_hal_async::delay::DelayNs,
        C: CancelSignal,
        V: Presenter,
    {
        let tick_ms = self.resolver.config().tick_ms;
        while self.state != LoopState::Terminated {
            delay.delay_ms(tick_ms).await;
            self.step(Self::poll(&mut cancel), presenter)?;
        }
        Ok(())
    }

    /// Blocking counterpart of [`Self::run`]
    ///
    /// # Errors
    ///
    /// Returns the error of the first failed cycle
    pub fn run_blocking<D, C, V>(
        &mut self,
        mut delay: D,
        mut cancel: C,
        presenter: &mut V,
    ) -> Result<(), Error<S::Error>>
    where
        D: embedded_hal::delay::DelayNs,
        C: CancelSignal,
        V: Presenter,
    {
        let tick_ms = self.resolver.config().tick_ms;
        while self.state != LoopState::Terminated {
            delay.delay_ms(tick_ms);
            self.step(Self::poll(&mut cancel), presenter)?;
        }
        Ok(())
    }

    fn poll<C: CancelSignal>(cancel: &mut C) -> LoopEvent {
        if cancel.is_cancelled() {
            LoopEvent::Cancel
        } else {
            LoopEvent::Tick
        }
    }
}
