//! Sampling seam towards the ADC driver.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::channel::Channel;

/// A converter able to return one voltage reading for a channel
///
/// Implementations are expected to perform a single conversion and return
/// quickly (a few microseconds on the reference hardware). The voltage unit is
/// the driver's, every threshold in [`Config`](crate::Config) uses the same
/// unit.
pub trait SampleSource {
    /// Driver error
    type Error;

    /// Convert one sample of `channel` and return it as a voltage
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the conversion fails
    fn read(&mut self, channel: Channel) -> Result<f32, Self::Error>;
}

impl<T: SampleSource + ?Sized> SampleSource for &mut T {
    type Error = T::Error;

    fn read(&mut self, channel: Channel) -> Result<f32, Self::Error> {
        T::read(self, channel)
    }
}

/// Adapts a closure into a [`SampleSource`]
#[derive(Debug, Clone)]
pub struct FnSource<F>(pub F);

impl<F, E> SampleSource for FnSource<F>
where
    F: FnMut(Channel) -> Result<f32, E>,
{
    type Error = E;

    fn read(&mut self, channel: Channel) -> Result<f32, E> {
        (self.0)(channel)
    }
}

/// Debug output used when no pin is wired for synchronization timing
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoDebugPin;

impl ErrorType for NoDebugPin {
    type Error = Infallible;
}

impl OutputPin for NoDebugPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
