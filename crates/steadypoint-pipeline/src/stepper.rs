//! Deterministic stepper
//!
//! Wraps a [`Pipeline`], owns the running step counter and the rolling
//! determinism hash, and exposes two entry points:
//!
//! - [`DeterministicStepper::fixed_step`]: one step per call, for replay
//!   and benchmarking. The only hash-bearing path.
//! - [`DeterministicStepper::step`]: wall-clock mode. Consumes host
//!   elapsed time into an accumulator and emits zero or more fixed steps,
//!   capped per frame so a stalled host cannot trigger an unbounded
//!   catch-up burst.

use crate::hash::DeterminismHash;
use crate::stage::Pipeline;
use steadypoint_schemas::{
    AssistiveConfig, EngineFrameResult, InputSample, MotorProfile, StepEvents, TargetInfo,
    TransformContext,
};

/// Stepper timing limits.
#[derive(Debug, Clone, Copy)]
pub struct StepperConfig {
    /// Fixed sample rate in Hz.
    pub sample_rate_hz: f32,
    /// Upper bound on fixed steps per wall-clock frame.
    pub max_steps_per_frame: u32,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: crate::SAMPLE_RATE_HZ,
            max_steps_per_frame: 4,
        }
    }
}

/// Pipeline driver owning step index, hash and the fixed-step accumulator.
#[derive(Debug, Clone)]
pub struct DeterministicStepper {
    pipeline: Pipeline,
    config: StepperConfig,
    step_index: u64,
    hash: DeterminismHash,
    accumulator_s: f64,
    last_host_ticks: u64,
    overruns: u64,
}

impl DeterministicStepper {
    /// Wrap a pipeline with default timing limits.
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self::with_config(pipeline, StepperConfig::default())
    }

    /// Wrap a pipeline with explicit timing limits.
    #[must_use]
    pub fn with_config(pipeline: Pipeline, config: StepperConfig) -> Self {
        Self {
            pipeline,
            config,
            step_index: 0,
            hash: DeterminismHash::new(),
            accumulator_s: 0.0,
            last_host_ticks: 0,
            overruns: 0,
        }
    }

    /// Fixed timestep in seconds.
    #[inline]
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.config.sample_rate_hz
    }

    /// Steps executed since construction or the last reset.
    #[must_use]
    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    /// Current rolling determinism hash.
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash.value()
    }

    /// Accumulator overruns observed (host stalled past the step cap).
    #[must_use]
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Immutable view of the wrapped pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Execute exactly one fixed step.
    ///
    /// Applies the pipeline, folds the transformed sample into the hash,
    /// and increments the step counter. The caller-provided context's
    /// targets/config/profile are used; the step index in the outgoing
    /// sample is overwritten with the stepper's own counter.
    pub fn fixed_step(&mut self, sample: InputSample, ctx: &TransformContext) -> EngineFrameResult {
        let mut raw = sample;
        raw.step_index = self.step_index;
        let mut transformed = raw;

        let events = self.pipeline.apply(&mut transformed, ctx);
        self.hash.write_sample(&transformed);

        let result = EngineFrameResult {
            step_index: self.step_index,
            sample: transformed,
            raw,
            events,
            hash: self.hash.value(),
            alpha: 0.0,
            steps_run: 1,
        };
        self.step_index += 1;
        result
    }

    /// Wall-clock entry point: accumulate host elapsed time and run zero
    /// or more fixed steps.
    ///
    /// The first emitted step carries the sample's deltas; catch-up steps
    /// within the same call run with zero delta at the same position. The
    /// first call only arms the host-clock sentinel and passes through.
    ///
    /// After the bounded catch-up loop, any residual beyond one fixed step
    /// is discarded and counted as an overrun.
    pub fn step(
        &mut self,
        sample: InputSample,
        targets: &[TargetInfo],
        host_now_ticks: u64,
        ticks_per_second: u64,
        config: Option<&AssistiveConfig>,
        profile: Option<&MotorProfile>,
    ) -> EngineFrameResult {
        if self.last_host_ticks == 0 {
            self.last_host_ticks = host_now_ticks;
            return self.passthrough_result(sample);
        }

        let elapsed_ticks = host_now_ticks.saturating_sub(self.last_host_ticks);
        self.last_host_ticks = host_now_ticks;
        if ticks_per_second > 0 {
            self.accumulator_s += elapsed_ticks as f64 / ticks_per_second as f64;
        }

        let dt = f64::from(self.fixed_dt());
        let mut steps_run: u32 = 0;
        let mut last_result: Option<EngineFrameResult> = None;

        while self.accumulator_s >= dt && steps_run < self.config.max_steps_per_frame {
            let step_sample = if steps_run == 0 {
                sample
            } else {
                // Catch-up steps: same position and buttons, zero delta
                let mut zero = sample;
                zero.dx = 0.0;
                zero.dy = 0.0;
                zero
            };
            let ctx = TransformContext {
                step_index: self.step_index,
                dt: self.fixed_dt(),
                targets,
                config,
                profile,
            };
            last_result = Some(self.fixed_step(step_sample, &ctx));
            self.accumulator_s -= dt;
            steps_run += 1;
        }

        if self.accumulator_s > dt {
            self.accumulator_s = dt;
            self.overruns += 1;
        }

        let alpha = (self.accumulator_s / dt).clamp(0.0, 1.0) as f32;
        match last_result {
            Some(mut result) => {
                result.alpha = alpha;
                result.steps_run = steps_run;
                result
            }
            None => {
                let mut result = self.passthrough_result(sample);
                result.alpha = alpha;
                result
            }
        }
    }

    /// Return step index and hash to their initial values, reset every
    /// stage, and clear the accumulator and host-clock sentinel.
    pub fn reset(&mut self) {
        self.step_index = 0;
        self.hash.reset();
        self.pipeline.reset();
        self.accumulator_s = 0.0;
        self.last_host_ticks = 0;
        self.overruns = 0;
    }

    fn passthrough_result(&self, sample: InputSample) -> EngineFrameResult {
        let mut raw = sample;
        raw.step_index = self.step_index;
        EngineFrameResult {
            step_index: self.step_index,
            sample: raw,
            raw,
            events: StepEvents::default(),
            hash: self.hash.value(),
            alpha: 0.0,
            steps_run: 0,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::hash::FNV_OFFSET_BASIS;
    use steadypoint_schemas::ProfileId;

    fn smoothing_config() -> AssistiveConfig {
        let mut cfg = AssistiveConfig::passthrough(ProfileId::new("step").unwrap());
        cfg.smoothing_strength = 0.6;
        cfg
    }

    #[test]
    fn test_fixed_step_increments_and_hashes() {
        let cfg = smoothing_config();
        let mut stepper = DeterministicStepper::new(Pipeline::canonical());

        let ctx = TransformContext::with_config(0, stepper.fixed_dt(), &cfg);
        let result = stepper.fixed_step(InputSample::new(1.0, 2.0, 1.0, 2.0), &ctx);

        assert_eq!(result.step_index, 0);
        assert_eq!(stepper.step_index(), 1);
        assert_ne!(result.hash, FNV_OFFSET_BASIS);
        assert_eq!(result.hash, stepper.hash());
    }

    #[test]
    fn test_first_wall_clock_call_is_passthrough() {
        let cfg = smoothing_config();
        let mut stepper = DeterministicStepper::new(Pipeline::canonical());

        let result = stepper.step(
            InputSample::new(5.0, 5.0, 1.0, 1.0),
            &[],
            1_000_000,
            1_000_000_000,
            Some(&cfg),
            None,
        );
        assert_eq!(result.steps_run, 0);
        assert_eq!(result.alpha, 0.0);
        assert_eq!(result.hash, FNV_OFFSET_BASIS);
        assert_eq!(stepper.step_index(), 0);
    }

    #[test]
    fn test_wall_clock_emits_fixed_steps() {
        let cfg = smoothing_config();
        let mut stepper = DeterministicStepper::new(Pipeline::canonical());
        let tps = 1_000_000_000u64;

        stepper.step(InputSample::default(), &[], tps, tps, Some(&cfg), None);

        // ~33.4 ms later: two 60 Hz steps
        let result = stepper.step(
            InputSample::new(1.0, 0.0, 1.0, 0.0),
            &[],
            tps + 33_400_000,
            tps,
            Some(&cfg),
            None,
        );
        assert_eq!(result.steps_run, 2);
        assert_eq!(stepper.step_index(), 2);
        assert!(result.alpha < 1.0);
    }

    #[test]
    fn test_step_cap_bounds_catch_up_and_counts_overrun() {
        let cfg = smoothing_config();
        let mut stepper = DeterministicStepper::with_config(
            Pipeline::canonical(),
            StepperConfig {
                sample_rate_hz: 60.0,
                max_steps_per_frame: 3,
            },
        );
        let tps = 1_000_000_000u64;

        stepper.step(InputSample::default(), &[], tps, tps, Some(&cfg), None);

        // 200 ms of host time at once: at most 3 steps, one overrun
        let result = stepper.step(
            InputSample::new(1.0, 0.0, 1.0, 0.0),
            &[],
            tps + 200_000_000,
            tps,
            Some(&cfg),
            None,
        );
        assert_eq!(result.steps_run, 3);
        assert_eq!(stepper.overruns(), 1);

        // The next normal ~17 ms frame drains the one retained step plus
        // the new elapsed time: at most two further steps.
        let result = stepper.step(
            InputSample::new(1.0, 0.0, 0.0, 0.0),
            &[],
            tps + 217_000_000,
            tps,
            Some(&cfg),
            None,
        );
        assert!(result.steps_run <= 2);
        assert_eq!(stepper.overruns(), 1);
    }

    #[test]
    fn test_backwards_host_clock_is_clamped() {
        let cfg = smoothing_config();
        let mut stepper = DeterministicStepper::new(Pipeline::canonical());
        let tps = 1_000_000u64;

        stepper.step(InputSample::default(), &[], 500_000, tps, Some(&cfg), None);
        let result = stepper.step(
            InputSample::default(),
            &[],
            400_000, // clock went backwards
            tps,
            Some(&cfg),
            None,
        );
        assert_eq!(result.steps_run, 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let cfg = smoothing_config();
        let mut stepper = DeterministicStepper::new(Pipeline::canonical());
        let ctx = TransformContext::with_config(0, stepper.fixed_dt(), &cfg);
        for i in 0..10 {
            let s = InputSample::new(i as f32, 0.0, 1.0, 0.0);
            stepper.fixed_step(s, &ctx);
        }
        assert_ne!(stepper.hash(), FNV_OFFSET_BASIS);

        stepper.reset();
        assert_eq!(stepper.step_index(), 0);
        assert_eq!(stepper.hash(), FNV_OFFSET_BASIS);
        assert_eq!(stepper.overruns(), 0);
    }

    #[test]
    fn test_reset_gives_fresh_run_hash() {
        let cfg = smoothing_config();
        let run = |stepper: &mut DeterministicStepper| {
            let dt = stepper.fixed_dt();
            for i in 0..50u64 {
                let x = (i % 9) as f32;
                let s = InputSample::new(x, 0.0, 1.0, 0.0);
                let ctx = TransformContext::with_config(i, dt, &cfg);
                stepper.fixed_step(s, &ctx);
            }
            stepper.hash()
        };

        let mut fresh = DeterministicStepper::new(Pipeline::canonical());
        let fresh_hash = run(&mut fresh);

        let mut reused = DeterministicStepper::new(Pipeline::canonical());
        run(&mut reused);
        reused.reset();
        let reused_hash = run(&mut reused);

        assert_eq!(fresh_hash, reused_hash);
    }
}
