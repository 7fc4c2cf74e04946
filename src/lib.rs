#![no_std]
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

mod acquisition;
mod angle;
mod calibration;
mod channel;
mod config;
mod diagnostics;
mod driver;
mod error;
mod phase;
mod source;
mod state;
mod sync;
mod window;

pub use acquisition::{AcquisitionLoop, CancelSignal, LoopEvent, LoopState, Presenter};
pub use angle::{RAD_TO_DEG, RawAngle, SINGULAR_DIVISOR, raw_angle};
pub use calibration::{CalibrationMap, CalibrationRange, ExtrapolationPolicy, map_float};
pub use channel::Channel;
pub use config::Config;
pub use diagnostics::Acquisition;
pub use driver::Resolver;
pub use error::{ConfigError, Error};
pub use phase::{PhaseReading, Quadrant};
pub use source::{FnSource, NoDebugPin, SampleSource};
pub use state::AngleCell;
pub use sync::{ReferenceSynchronizer, SyncOutcome};
pub use window::{SampleBuffer, WINDOW_LEN};
