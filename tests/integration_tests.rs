//! Integration tests for the resolver decoder using a scripted sample source.

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::{
    Mock as PinMock, State as PinState, Transaction as PinTransaction,
};
use resolver_angle::{
    AcquisitionLoop, AngleCell, CalibrationMap, Channel, Config, Error, ExtrapolationPolicy,
    FnSource, LoopEvent, LoopState, NoDebugPin, Quadrant, RAD_TO_DEG, ReferenceSynchronizer,
    Resolver, SampleSource, SyncOutcome, WINDOW_LEN, map_float,
};

const HIGH: f32 = 3000.0;
const LOW: f32 = 0.0;

/// Reference waveform played back by the bench
#[derive(Debug, Clone, Copy)]
enum Reference {
    Constant(f32),
    /// Square wave starting high, `half` samples per half-period
    Square { half: usize },
    /// Level flips on every sample
    Chatter,
}

impl Reference {
    fn at(self, n: usize) -> f32 {
        match self {
            Reference::Constant(v) => v,
            Reference::Square { half } => {
                if (n / half) % 2 == 0 {
                    HIGH
                } else {
                    LOW
                }
            }
            Reference::Chatter => {
                if n % 2 == 0 {
                    HIGH
                } else {
                    LOW
                }
            }
        }
    }
}

/// Scripted resolver: one level per window for sine and cosine, the last level
/// repeats once the script runs out
#[derive(Debug)]
struct Bench {
    reference: Reference,
    sine: Vec<f32>,
    cosine: Vec<f32>,
    reads: [usize; 3],
}

impl Bench {
    fn new(reference: Reference, sine: &[f32], cosine: &[f32]) -> Self {
        Self {
            reference,
            sine: sine.to_vec(),
            cosine: cosine.to_vec(),
            reads: [0; 3],
        }
    }

    fn reads(&self, channel: Channel) -> usize {
        self.reads[usize::from(u8::from(channel))]
    }
}

fn window_level(levels: &[f32], n: usize) -> f32 {
    let window = n / WINDOW_LEN;
    levels[window.min(levels.len() - 1)]
}

impl SampleSource for Bench {
    type Error = Infallible;

    fn read(&mut self, channel: Channel) -> Result<f32, Infallible> {
        let slot = &mut self.reads[usize::from(u8::from(channel))];
        let n = *slot;
        *slot += 1;
        Ok(match channel {
            Channel::Reference => self.reference.at(n),
            Channel::Sine => window_level(&self.sine, n),
            Channel::Cosine => window_level(&self.cosine, n),
        })
    }
}

fn assert_close(actual: f32, expected: f32, tolerance: f32) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

fn degrees_of(ratio: f32) -> f32 {
    ratio.atan() * RAD_TO_DEG
}

#[test]
fn settles_on_low_reference() {
    let mut bench = Bench::new(Reference::Constant(LOW), &[0.0], &[0.0]);
    let sync = ReferenceSynchronizer::default();

    assert_eq!(sync.synchronize(&mut bench), Ok(SyncOutcome::Settled));
    // Three samples to dominate, three more to confirm
    assert_eq!(bench.reads(Channel::Reference), 6);
}

#[test]
fn waits_for_dip_and_rise_on_high_reference() {
    let mut bench = Bench::new(Reference::Square { half: 5 }, &[0.0], &[0.0]);
    let sync = ReferenceSynchronizer::default();

    assert_eq!(sync.synchronize(&mut bench), Ok(SyncOutcome::RisingEdge));
    // 3 high, 2 high + 3 low, 2 low + 3 high
    assert_eq!(bench.reads(Channel::Reference), 13);
}

#[test]
fn gives_up_when_reference_never_dips() {
    let mut bench = Bench::new(Reference::Constant(HIGH), &[0.0], &[0.0]);
    let sync = ReferenceSynchronizer::new(50.0, 2, 40);

    assert_eq!(sync.synchronize(&mut bench), Ok(SyncOutcome::BudgetExhausted));
    assert_eq!(bench.reads(Channel::Reference), 3 + 40);
}

#[test]
fn gives_up_when_reference_never_holds_a_level() {
    let mut bench = Bench::new(Reference::Chatter, &[0.0], &[0.0]);
    let sync = ReferenceSynchronizer::new(50.0, 2, 10_000);

    assert_eq!(sync.synchronize(&mut bench), Ok(SyncOutcome::BudgetExhausted));
    assert_eq!(bench.reads(Channel::Reference), 10_000);
}

#[test]
fn threshold_level_counts_as_high() {
    let mut bench = Bench::new(Reference::Constant(50.0), &[0.0], &[0.0]);
    let sync = ReferenceSynchronizer::new(50.0, 2, 10);

    assert_eq!(sync.synchronize(&mut bench), Ok(SyncOutcome::BudgetExhausted));
}

#[test]
fn raises_debug_line_around_each_synchronization() {
    let expectations = [
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ];
    let pin = PinMock::new(&expectations);
    let bench = Bench::new(Reference::Constant(LOW), &[60.0], &[60.0]);
    let mut resolver = Resolver::with_config(bench, pin, Config::new()).unwrap();

    let reading = resolver.read_phase(Channel::Sine).unwrap();
    assert!(reading.is_positive());

    let (bench, mut pin) = resolver.release();
    assert_eq!(bench.reads(Channel::Sine), WINDOW_LEN);
    pin.done();
}

#[test]
fn retry_resynchronizes_before_second_window() {
    let expectations = [
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ];
    let pin = PinMock::new(&expectations);
    let bench = Bench::new(Reference::Constant(LOW), &[10.0, 80.0], &[60.0]);
    let mut resolver = Resolver::with_config(bench, pin, Config::new()).unwrap();

    let reading = resolver.read_phase(Channel::Sine).unwrap();
    assert!(reading.retried());
    assert!(!reading.is_positive());
    assert_eq!(reading.magnitude(), -80.0);

    let (bench, mut pin) = resolver.release();
    assert_eq!(bench.reads(Channel::Sine), 2 * WINDOW_LEN);
    assert_eq!(bench.reads(Channel::Reference), 12);
    pin.done();
}

#[test]
fn window_keeps_last_samples() {
    let bench = Bench::new(Reference::Constant(LOW), &[75.0], &[0.0]);
    let mut resolver = Resolver::new(bench);

    assert_eq!(resolver.sample_mean(Channel::Sine), Ok(75.0));
    assert!(resolver.window().samples().iter().all(|v| *v == 75.0));
}

#[test]
fn first_quadrant_end_to_end() {
    let bench = Bench::new(Reference::Constant(LOW), &[60.0], &[60.0]);
    let mut resolver = Resolver::new(bench);

    let acquisition = resolver.acquire().unwrap();
    assert_eq!(acquisition.quadrant(), Quadrant::First);
    assert!(!acquisition.singular());
    assert_close(acquisition.raw_degrees(), 45.0, 1e-4);
    assert_close(
        acquisition.degrees(),
        map_float(45.0, 10.0, 82.0, 10.0, 80.0),
        1e-3,
    );
    assert_close(acquisition.degrees(), 44.0278, 1e-3);
    assert_eq!(acquisition.sync_timeouts(), 0);
}

#[test]
fn absent_sine_floors_magnitude() {
    let bench = Bench::new(Reference::Constant(LOW), &[10.0, 20.0], &[60.0]);
    let mut resolver = Resolver::new(bench);

    let acquisition = resolver.acquire().unwrap();
    let sine = acquisition.sine();
    assert!(sine.is_floored());
    assert!(!sine.is_positive());
    assert_eq!(sine.magnitude(), 0.001);
    assert_eq!(sine.mean(), 20.0);

    // sine false, cosine true
    assert_eq!(acquisition.quadrant(), Quadrant::Third);
    let raw = 180.0 - degrees_of(0.001 / 60.0);
    assert_close(acquisition.raw_degrees(), raw, 1e-4);
    assert_close(
        acquisition.degrees(),
        map_float(raw, 212.0, 255.0, 181.0, 269.0),
        1e-3,
    );
}

#[test]
fn negative_sine_lands_in_third_quadrant() {
    let bench = Bench::new(Reference::Constant(LOW), &[10.0, 80.0], &[60.0]);
    let mut resolver = Resolver::new(bench);

    let acquisition = resolver.acquire().unwrap();
    assert_eq!(acquisition.quadrant(), Quadrant::Third);
    let raw = 180.0 - degrees_of(-80.0 / 60.0);
    assert_close(acquisition.raw_degrees(), raw, 1e-3);
    assert_close(acquisition.raw_degrees(), 233.1301, 1e-3);
}

#[test]
fn negative_cosine_lands_in_second_quadrant() {
    let bench = Bench::new(Reference::Constant(LOW), &[60.0], &[10.0, 80.0]);
    let mut resolver = Resolver::new(bench);

    let acquisition = resolver.acquire().unwrap();
    assert_eq!(acquisition.quadrant(), Quadrant::Second);
    assert!(!acquisition.singular());
    assert_close(acquisition.raw_degrees(), 143.1301, 1e-3);
    assert_close(
        acquisition.degrees(),
        map_float(acquisition.raw_degrees(), 95.0, 147.0, 90.0, 179.0),
        1e-3,
    );
}

#[test]
fn absent_cosine_takes_singular_branch() {
    let bench = Bench::new(Reference::Constant(LOW), &[60.0], &[10.0, 10.0]);
    let mut resolver = Resolver::new(bench);

    let acquisition = resolver.acquire().unwrap();
    assert_eq!(acquisition.quadrant(), Quadrant::Second);
    assert!(acquisition.singular());
    let raw = 180.0 - degrees_of(60.0 / 0.001);
    assert_close(acquisition.raw_degrees(), raw, 1e-3);
    assert!(acquisition.degrees().is_finite());
}

#[test]
fn both_channels_absent_lands_in_fourth_quadrant() {
    let bench = Bench::new(Reference::Constant(LOW), &[0.0], &[0.0]);
    let mut resolver = Resolver::new(bench);

    let acquisition = resolver.acquire().unwrap();
    assert_eq!(acquisition.quadrant(), Quadrant::Fourth);
    assert!(acquisition.singular());
    assert_close(acquisition.raw_degrees(), 315.0, 1e-3);
    assert_close(acquisition.degrees(), 333.0, 1e-3);
}

#[test]
fn fourth_quadrant_extrapolates_past_table() {
    let bench = Bench::new(Reference::Constant(LOW), &[0.0], &[10.0, 60.0]);
    let mut resolver = Resolver::new(bench);

    let acquisition = resolver.acquire().unwrap();
    assert_eq!(acquisition.quadrant(), Quadrant::Fourth);
    let raw = 360.0 - degrees_of(0.001 / -60.0);
    assert_close(acquisition.raw_degrees(), raw, 1e-3);
    assert!(acquisition.degrees() > 360.0);
    assert_close(
        acquisition.degrees(),
        map_float(raw, 280.0, 330.0, 270.0, 360.0),
        1e-3,
    );
}

#[test]
fn fourth_quadrant_clamps_when_configured() {
    let config = Config::new().with_calibration(
        CalibrationMap::default().with_policy(ExtrapolationPolicy::Clamp),
    );
    let bench = Bench::new(Reference::Constant(LOW), &[0.0], &[10.0, 60.0]);
    let mut resolver = Resolver::with_config(bench, NoDebugPin, config).unwrap();

    let acquisition = resolver.acquire().unwrap();
    assert_eq!(acquisition.quadrant(), Quadrant::Fourth);
    assert_close(acquisition.degrees(), 360.0, 1e-4);
}

#[test]
fn counts_exhausted_synchronizations() {
    let config = Config::new().with_iteration_budget(20);
    let bench = Bench::new(Reference::Constant(HIGH), &[60.0], &[60.0]);
    let mut resolver = Resolver::with_config(bench, NoDebugPin, config).unwrap();

    let acquisition = resolver.acquire().unwrap();
    assert_eq!(acquisition.sync_timeouts(), 2);
    assert_eq!(acquisition.quadrant(), Quadrant::First);

    // The counter restarts every cycle
    let acquisition = resolver.acquire().unwrap();
    assert_eq!(acquisition.sync_timeouts(), 2);
}

#[test]
fn propagates_source_errors() {
    let source = FnSource(|_: Channel| Err::<f32, &str>("adc busy"));
    let mut resolver = Resolver::new(source);

    assert_eq!(resolver.acquire(), Err(Error::Sampling("adc busy")));
}

#[test]
fn rejects_non_finite_readings() {
    let source = FnSource(|channel: Channel| {
        Ok::<f32, Infallible>(match channel {
            Channel::Reference => LOW,
            Channel::Sine => f32::NAN,
            Channel::Cosine => 60.0,
        })
    });
    let mut resolver = Resolver::new(source);

    assert_eq!(
        resolver.acquire(),
        Err(Error::InvalidReading(Channel::Sine))
    );
}

#[test]
fn step_publishes_and_redraws_on_tick() {
    let angle = AngleCell::new();
    let bench = Bench::new(Reference::Constant(LOW), &[60.0], &[60.0]);
    let mut acquisition_loop = AcquisitionLoop::new(Resolver::new(bench), &angle);
    let mut redraws = Vec::new();
    let mut presenter = |deg: f32| redraws.push(deg);

    assert_eq!(acquisition_loop.state(), LoopState::Idle);
    assert_eq!(
        acquisition_loop.step(LoopEvent::Tick, &mut presenter),
        Ok(LoopState::Idle)
    );
    let published = angle.latest();
    assert_close(published, 44.0278, 1e-3);
    assert_eq!(
        acquisition_loop.last_acquisition().map(|a| a.degrees()),
        Some(published)
    );

    assert_eq!(
        acquisition_loop.step(LoopEvent::Cancel, &mut presenter),
        Ok(LoopState::Terminated)
    );
    // Terminated is final
    assert_eq!(
        acquisition_loop.step(LoopEvent::Tick, &mut presenter),
        Ok(LoopState::Terminated)
    );

    assert_eq!(redraws, vec![published]);
}

#[test]
fn cancel_before_first_tick_skips_acquisition() {
    let angle = AngleCell::new();
    let bench = Bench::new(Reference::Constant(LOW), &[60.0], &[60.0]);
    let mut acquisition_loop = AcquisitionLoop::new(Resolver::new(bench), &angle);
    let mut redraws = 0;
    let mut presenter = |_: f32| redraws += 1;

    assert_eq!(
        acquisition_loop.step(LoopEvent::Cancel, &mut presenter),
        Ok(LoopState::Terminated)
    );
    assert_eq!(redraws, 0);
    let bench = acquisition_loop.release().release().0;
    assert_eq!(bench.reads(Channel::Reference), 0);
    assert_eq!(angle.latest(), 0.0);
}

#[test]
fn failed_cycle_terminates_loop() {
    let angle = AngleCell::new();
    let source = FnSource(|_: Channel| Err::<f32, &str>("adc busy"));
    let mut acquisition_loop = AcquisitionLoop::new(Resolver::new(source), &angle);
    let mut presenter = |_: f32| {};

    assert_eq!(
        acquisition_loop.run_blocking(NoopDelay::new(), || false, &mut presenter),
        Err(Error::Sampling("adc busy"))
    );
    assert_eq!(acquisition_loop.state(), LoopState::Terminated);
}

#[test]
fn blocking_loop_runs_until_cancelled() {
    let angle = AngleCell::new();
    let bench = Bench::new(Reference::Constant(LOW), &[60.0], &[60.0]);
    let mut acquisition_loop = AcquisitionLoop::new(Resolver::new(bench), &angle);
    let mut redraws = 0;
    let mut presenter = |_: f32| redraws += 1;
    let mut polls = 0;
    let cancel = || {
        polls += 1;
        polls > 3
    };

    acquisition_loop
        .run_blocking(NoopDelay::new(), cancel, &mut presenter)
        .unwrap();

    assert_eq!(acquisition_loop.state(), LoopState::Terminated);
    assert_eq!(redraws, 3);
}

#[tokio::test]
async fn async_loop_runs_until_cancelled() {
    static ANGLE: AngleCell = AngleCell::new();
    static CANCEL: AtomicBool = AtomicBool::new(false);

    let bench = Bench::new(
        Reference::Square { half: 5 },
        &[60.0],
        &[10.0, 80.0, 10.0, 80.0],
    );
    let mut acquisition_loop = AcquisitionLoop::new(Resolver::new(bench), &ANGLE);
    let mut redraws = Vec::new();
    let mut presenter = |deg: f32| {
        redraws.push(deg);
        if redraws.len() == 2 {
            CANCEL.store(true, Ordering::Release);
        }
    };

    acquisition_loop
        .run(
            NoopDelay::new(),
            || CANCEL.load(Ordering::Acquire),
            &mut presenter,
        )
        .await
        .unwrap();

    assert_eq!(acquisition_loop.state(), LoopState::Terminated);
    assert_eq!(redraws.len(), 2);
    assert_eq!(ANGLE.latest(), redraws[1]);
    assert_eq!(
        acquisition_loop.last_acquisition().map(|a| a.quadrant()),
        Some(Quadrant::Second)
    );
}
