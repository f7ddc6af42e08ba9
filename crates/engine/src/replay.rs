//! Deterministic replay
//!
//! Feeds a recorded event stream through a fresh pipeline in fixed-step
//! mode. The same events with the same config produce the same final hash
//! on every host; nothing here reads a clock or retries.

use crate::safety;
use steadypoint_pipeline::{DeterministicStepper, Pipeline};
use steadypoint_schemas::{
    AssistiveConfig, InputSample, RawInputEvent, TargetInfo, TransformContext,
};

/// Outcome of one replay run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayReport {
    /// Final determinism hash.
    pub final_hash: u64,
    /// Fixed steps executed (one per event).
    pub steps: u64,
    /// Raw position after integrating every event delta.
    pub raw_x: f32,
    /// Raw position after integrating every event delta.
    pub raw_y: f32,
    /// Transformed position after the final step.
    pub assisted_x: f32,
    /// Transformed position after the final step.
    pub assisted_y: f32,
}

/// Replay an ordered event stream against a config, one fixed step per
/// event, and report the final hash.
///
/// The config passes through the same runtime clamp as a live hot-swap, so
/// replay and live runs agree on the effective parameters.
#[must_use]
pub fn replay_events(events: &[RawInputEvent], config: &AssistiveConfig) -> ReplayReport {
    replay_events_with_targets(events, config, &[])
}

/// [`replay_events`] with a fixed target snapshot visible to every step.
#[must_use]
pub fn replay_events_with_targets(
    events: &[RawInputEvent],
    config: &AssistiveConfig,
    targets: &[TargetInfo],
) -> ReplayReport {
    let mut clamped = config.clone();
    safety::clamp_config(&mut clamped);

    let mut stepper = DeterministicStepper::new(Pipeline::canonical());
    let dt = stepper.fixed_dt();

    let mut raw_x = 0.0f32;
    let mut raw_y = 0.0f32;
    let mut assisted_x = 0.0f32;
    let mut assisted_y = 0.0f32;

    for event in events {
        raw_x += event.dx;
        raw_y += event.dy;
        let mut sample = InputSample::new(raw_x, raw_y, event.dx, event.dy);
        sample.primary_down = event.primary_down;
        sample.secondary_down = event.secondary_down;

        let ctx = TransformContext {
            step_index: stepper.step_index(),
            dt,
            targets,
            config: Some(&clamped),
            profile: None,
        };
        let result = stepper.fixed_step(sample, &ctx);
        assisted_x = result.sample.x;
        assisted_y = result.sample.y;
    }

    ReplayReport {
        final_hash: stepper.hash(),
        steps: stepper.step_index(),
        raw_x,
        raw_y,
        assisted_x,
        assisted_y,
    }
}
