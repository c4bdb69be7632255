//! Fixed-timestep frame driver.
//!
//! The [`LoopController`] turns irregular wall-clock frame callbacks into a
//! whole number of fixed simulation steps. Each frame:
//!
//! 1. The elapsed wall-clock time since the last frame is clamped to
//!    `[0, max_frame_delta_ms]` and added to an accumulator.
//! 2. While the accumulator holds at least one timestep, the simulation
//!    advances by exactly one timestep and the accumulator shrinks by it.
//! 3. The leftover fraction `alpha = accumulator / timestep` is handed to the
//!    render pass so it can blend the last two simulation states.
//!
//! Because every step has the same length, the same sequence of frame
//! timestamps always produces the same sequence of steps. The clamp bounds
//! the catch-up work after a stall (a backgrounded tab, a debugger pause) so
//! the loop cannot spiral.
//!
//! # Example
//!
//! ```
//! use groot_engine::tick::{LoopController, Simulation};
//! use groot_engine::EngineError;
//!
//! #[derive(Default)]
//! struct Counter {
//!     steps: u32,
//! }
//!
//! impl Simulation for Counter {
//!     fn step(&mut self, _dt_ms: f64) -> Result<(), EngineError> {
//!         self.steps += 1;
//!         Ok(())
//!     }
//!
//!     fn render(&mut self, _alpha: f64) -> Result<(), EngineError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut sim = Counter::default();
//! let mut controller = LoopController::new(1000.0 / 60.0, 250.0);
//! controller.start(0.0, &mut sim).unwrap();
//!
//! let report = controller.frame(40.0, &mut sim).unwrap().unwrap();
//! assert_eq!(report.steps, 2);
//! assert_eq!(sim.steps, 2);
//! assert!((report.alpha - 0.4).abs() < 1e-9);
//! ```

use std::cell::Cell;
use std::rc::Rc;

use crate::config::EngineConfig;
use crate::EngineError;

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// What the controller drives each frame.
pub trait Simulation {
    /// Advance the simulation by one fixed step of `dt_ms` milliseconds.
    fn step(&mut self, dt_ms: f64) -> Result<(), EngineError>;

    /// Draw the current state, blended by `alpha` in `[0, 1)`.
    fn render(&mut self, alpha: f64) -> Result<(), EngineError>;
}

// ---------------------------------------------------------------------------
// StopHandle
// ---------------------------------------------------------------------------

/// Cloneable switch that ends the loop at the next scheduling boundary.
///
/// Safe to use from inside a step or render callback: the frame in flight
/// completes and then reports that it should not be rescheduled.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Rc<Cell<bool>>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }
}

// ---------------------------------------------------------------------------
// FrameReport
// ---------------------------------------------------------------------------

/// Outcome of one frame callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Fixed steps run during this frame.
    pub steps: u32,
    /// `steps * timestep`, in milliseconds.
    pub simulated_ms: f64,
    /// Interpolation fraction passed to the render pass.
    pub alpha: f64,
    /// Whether the embedder should request another frame.
    pub reschedule: bool,
}

// ---------------------------------------------------------------------------
// LoopController
// ---------------------------------------------------------------------------

/// The fixed-timestep accumulator loop.
#[derive(Debug)]
pub struct LoopController {
    fixed_timestep_ms: f64,
    max_frame_delta_ms: f64,
    accumulator: f64,
    /// Timestamp of the previous frame; `None` before the first start.
    last_time: Option<f64>,
    running: Rc<Cell<bool>>,
    step_counter: u64,
}

impl LoopController {
    /// Create a stopped controller.
    ///
    /// # Panics
    ///
    /// Panics if `fixed_timestep_ms` is not positive and finite, or if
    /// `max_frame_delta_ms` is negative or NaN.
    pub fn new(fixed_timestep_ms: f64, max_frame_delta_ms: f64) -> Self {
        assert!(
            fixed_timestep_ms > 0.0 && fixed_timestep_ms.is_finite(),
            "fixed timestep must be positive and finite, got {fixed_timestep_ms}"
        );
        assert!(
            max_frame_delta_ms >= 0.0,
            "max frame delta must be non-negative, got {max_frame_delta_ms}"
        );
        Self {
            fixed_timestep_ms,
            max_frame_delta_ms,
            accumulator: 0.0,
            last_time: None,
            running: Rc::new(Cell::new(false)),
            step_counter: 0,
        }
    }

    /// Controller using the timing fields of a validated config.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.fixed_timestep_ms, config.max_frame_delta_ms)
    }

    /// Begin running at timestamp `now` and run the first frame at once
    /// (with a zero delta, so it only renders).
    ///
    /// Returns `Ok(None)` without doing anything if already running.
    pub fn start(
        &mut self,
        now: f64,
        sim: &mut dyn Simulation,
    ) -> Result<Option<FrameReport>, EngineError> {
        if self.running.get() {
            return Ok(None);
        }
        tracing::debug!(now, "loop started");
        self.running.set(true);
        self.last_time = Some(now);
        self.frame(now, sim)
    }

    /// Request the loop to end. The frame in flight, if any, completes.
    pub fn stop(&self) {
        if self.running.replace(false) {
            tracing::debug!("loop stop requested");
        }
    }

    /// A handle that can stop this controller from anywhere on this thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Rc::clone(&self.running),
        }
    }

    /// Handle one frame callback at timestamp `now` (milliseconds).
    ///
    /// Returns `Ok(None)` when the controller is stopped. A step or render
    /// error aborts the frame and is returned; steps already taken stay
    /// applied.
    pub fn frame(
        &mut self,
        now: f64,
        sim: &mut dyn Simulation,
    ) -> Result<Option<FrameReport>, EngineError> {
        if !self.running.get() {
            return Ok(None);
        }

        let raw = self.last_time.map_or(0.0, |last| now - last);
        if now.is_finite() {
            self.last_time = Some(now);
        }
        // NaN and negative deltas (non-monotonic clocks) count as zero.
        let delta = if raw > 0.0 {
            raw.min(self.max_frame_delta_ms)
        } else {
            0.0
        };
        if raw > self.max_frame_delta_ms {
            tracing::debug!(
                raw_ms = raw,
                clamped_ms = delta,
                "frame delta clamped"
            );
        }
        self.accumulator += delta;

        let mut steps = 0u32;
        while self.accumulator >= self.fixed_timestep_ms {
            sim.step(self.fixed_timestep_ms)?;
            self.accumulator -= self.fixed_timestep_ms;
            self.step_counter += 1;
            steps += 1;
        }

        let alpha = self.accumulator / self.fixed_timestep_ms;
        sim.render(alpha)?;

        let report = FrameReport {
            steps,
            simulated_ms: f64::from(steps) * self.fixed_timestep_ms,
            alpha,
            reschedule: self.running.get(),
        };
        tracing::trace!(
            now,
            steps,
            alpha,
            accumulator_ms = self.accumulator,
            reschedule = report.reschedule,
            "frame"
        );
        Ok(Some(report))
    }

    // -- accessors ----------------------------------------------------------

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Unsimulated time carried into the next frame, in `[0, timestep)`.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Total fixed steps run since construction.
    pub fn step_count(&self) -> u64 {
        self.step_counter
    }

    /// Simulated time in milliseconds.
    ///
    /// Computed as `step_count * timestep` rather than summed, so it does
    /// not drift.
    pub fn sim_time_ms(&self) -> f64 {
        self.step_counter as f64 * self.fixed_timestep_ms
    }

    pub fn fixed_timestep_ms(&self) -> f64 {
        self.fixed_timestep_ms
    }

    pub fn max_frame_delta_ms(&self) -> f64 {
        self.max_frame_delta_ms
    }
}

impl Default for LoopController {
    /// 60 Hz with a 250 ms clamp.
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: f64 = 1000.0 / 60.0;

    /// Records every callback it receives.
    #[derive(Default)]
    struct Probe {
        steps: Vec<f64>,
        renders: Vec<f64>,
        stop_after: Option<(usize, StopHandle)>,
        fail_on_step: Option<usize>,
    }

    impl Simulation for Probe {
        fn step(&mut self, dt_ms: f64) -> Result<(), EngineError> {
            if self.fail_on_step == Some(self.steps.len()) {
                return Err(EngineError::Stage {
                    stage: "probe",
                    reason: "scripted failure".to_owned(),
                });
            }
            self.steps.push(dt_ms);
            if let Some((n, handle)) = &self.stop_after {
                if self.steps.len() == *n {
                    handle.stop();
                }
            }
            Ok(())
        }

        fn render(&mut self, alpha: f64) -> Result<(), EngineError> {
            self.renders.push(alpha);
            Ok(())
        }
    }

    fn started() -> (LoopController, Probe) {
        let mut controller = LoopController::new(STEP, 250.0);
        let mut probe = Probe::default();
        controller.start(0.0, &mut probe).unwrap();
        (controller, probe)
    }

    // -- construction -------------------------------------------------------

    #[test]
    fn default_is_sixty_hertz() {
        let controller = LoopController::default();
        assert!((controller.fixed_timestep_ms() - STEP).abs() < f64::EPSILON);
        assert_eq!(controller.max_frame_delta_ms(), 250.0);
        assert!(!controller.is_running());
    }

    #[test]
    #[should_panic(expected = "fixed timestep must be positive")]
    fn zero_timestep_panics() {
        let _ = LoopController::new(0.0, 250.0);
    }

    #[test]
    #[should_panic(expected = "fixed timestep must be positive")]
    fn infinite_timestep_panics() {
        let _ = LoopController::new(f64::INFINITY, 250.0);
    }

    // -- start / stop -------------------------------------------------------

    #[test]
    fn start_renders_once_without_stepping() {
        let (controller, probe) = started();
        assert!(controller.is_running());
        assert!(probe.steps.is_empty());
        assert_eq!(probe.renders, vec![0.0]);
    }

    #[test]
    fn start_is_idempotent() {
        let (mut controller, mut probe) = started();
        assert_eq!(controller.start(500.0, &mut probe).unwrap(), None);
        // The second start must not have reset the clock.
        let report = controller.frame(40.0, &mut probe).unwrap().unwrap();
        assert_eq!(report.steps, 2);
    }

    #[test]
    fn frames_while_stopped_are_ignored() {
        let mut controller = LoopController::new(STEP, 250.0);
        let mut probe = Probe::default();
        assert_eq!(controller.frame(100.0, &mut probe).unwrap(), None);
        assert!(probe.renders.is_empty());

        controller.start(0.0, &mut probe).unwrap();
        controller.stop();
        assert_eq!(controller.frame(100.0, &mut probe).unwrap(), None);
        assert_eq!(controller.step_count(), 0);
    }

    #[test]
    fn stop_inside_a_step_finishes_the_frame() {
        let mut controller = LoopController::new(STEP, 250.0);
        let mut probe = Probe {
            stop_after: Some((1, controller.stop_handle())),
            ..Probe::default()
        };
        controller.start(0.0, &mut probe).unwrap();

        let report = controller.frame(60.0, &mut probe).unwrap().unwrap();
        assert_eq!(report.steps, 3, "remaining steps of the frame still run");
        assert!(!report.reschedule);
        assert_eq!(probe.renders.len(), 2, "render still happens");
        assert_eq!(controller.frame(70.0, &mut probe).unwrap(), None);
    }

    #[test]
    fn restart_resets_the_clock() {
        let (mut controller, mut probe) = started();
        controller.stop();
        controller.start(10_000.0, &mut probe).unwrap();
        let report = controller.frame(10_020.0, &mut probe).unwrap().unwrap();
        assert_eq!(report.steps, 1);
    }

    // -- accumulation -------------------------------------------------------

    #[test]
    fn forty_ms_frame_runs_two_steps() {
        let (mut controller, mut probe) = started();
        let report = controller.frame(40.0, &mut probe).unwrap().unwrap();

        assert_eq!(report.steps, 2);
        assert_eq!(probe.steps, vec![STEP, STEP]);
        assert!((controller.accumulator() - 20.0 / 3.0).abs() < 1e-9);
        assert!((report.alpha - 0.4).abs() < 1e-9);
        assert!((report.simulated_ms - 2.0 * STEP).abs() < 1e-9);
        assert!(report.reschedule);
    }

    #[test]
    fn long_stall_is_clamped() {
        let mut controller = LoopController::new(10.0, 250.0);
        let mut probe = Probe::default();
        controller.start(0.0, &mut probe).unwrap();
        let report = controller.frame(5_000.0, &mut probe).unwrap().unwrap();
        assert_eq!(report.steps, 25);
        assert_eq!(controller.accumulator(), 0.0);
    }

    #[test]
    fn negative_and_nan_deltas_count_as_zero() {
        let mut controller = LoopController::new(10.0, 250.0);
        let mut probe = Probe::default();
        controller.start(0.0, &mut probe).unwrap();
        controller.frame(100.0, &mut probe).unwrap();
        assert_eq!(controller.accumulator(), 0.0);

        let report = controller.frame(50.0, &mut probe).unwrap().unwrap();
        assert_eq!(report.steps, 0);
        let report = controller.frame(f64::NAN, &mut probe).unwrap().unwrap();
        assert_eq!(report.steps, 0);
        assert_eq!(controller.accumulator(), 0.0);

        // The clock survives the bad timestamp.
        let report = controller.frame(70.0, &mut probe).unwrap().unwrap();
        assert_eq!(report.steps, 2);
    }

    #[test]
    fn small_frames_accumulate_into_a_step() {
        let (mut controller, mut probe) = started();
        let mut total = 0;
        for i in 1..=4 {
            total += controller
                .frame(f64::from(i) * 5.0, &mut probe)
                .unwrap()
                .unwrap()
                .steps;
        }
        assert_eq!(total, 1, "20 ms in 5 ms slices is one step");
    }

    #[test]
    fn sim_time_is_steps_times_timestep() {
        let (mut controller, mut probe) = started();
        for i in 1..=600 {
            controller.frame(f64::from(i) * STEP, &mut probe).unwrap();
        }
        assert_eq!(
            controller.sim_time_ms(),
            controller.step_count() as f64 * STEP
        );
        assert!(controller.step_count() >= 599);
    }

    // -- errors -------------------------------------------------------------

    #[test]
    fn step_error_aborts_the_frame() {
        let mut controller = LoopController::new(STEP, 250.0);
        let mut probe = Probe {
            fail_on_step: Some(1),
            ..Probe::default()
        };
        controller.start(0.0, &mut probe).unwrap();

        let err = controller.frame(50.0, &mut probe).unwrap_err();
        assert!(matches!(err, EngineError::Stage { stage: "probe", .. }));
        assert_eq!(controller.step_count(), 1);
        assert_eq!(probe.renders.len(), 1, "no render after a failed step");
        assert!(controller.is_running());
    }
}
