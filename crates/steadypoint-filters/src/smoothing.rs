//! Velocity-Adaptive Smoothing (Single-Pole IIR)
//!
//! This module provides the smoothing stage: a low-pass filter whose pole
//! adapts to instantaneous velocity. Heavy smoothing at tremor speeds,
//! near pass-through at intentional speeds.
//!
//! The -3 dB cutoff of a single-pole IIR at sample rate `Fs` is
//! `f_c ~= alpha * Fs / (2*pi)`. At `Fs = 60` and `alpha = 0.25` that is
//! about 2.4 Hz; at `alpha = 0.9` about 8.6 Hz. The policy mapper places
//! `min_alpha` so the cutoff sits at half the measured tremor frequency.

use steadypoint_schemas::{InputSample, TransformContext};

/// Substitute pole at rest when the configured band is unusable.
const DEFAULT_MIN_ALPHA: f32 = 0.25;
/// Substitute pole at speed when the configured band is unusable.
const DEFAULT_MAX_ALPHA: f32 = 0.90;
/// Substitute lower velocity band edge, vpx/step.
const DEFAULT_VELOCITY_LOW: f32 = 0.5;
/// Substitute upper velocity band edge, vpx/step.
const DEFAULT_VELOCITY_HIGH: f32 = 10.0;

/// State for the velocity-adaptive smoothing stage.
///
/// Holds the smoothed position and, when the dual-pole refinement is
/// enabled, the second cascaded pole. The second pole shares the adaptive
/// coefficient of the first; with the flag off the stage is exactly the
/// single-pole contract.
///
/// # RT Safety
///
/// - `#[repr(C)]` for stable ABI
/// - No heap allocations
/// - O(1) time complexity
/// - Bounded execution time
#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct SmoothingState {
    /// Smoothed position x, vpx.
    pub smoothed_x: f32,
    /// Smoothed position y, vpx.
    pub smoothed_y: f32,
    /// Second-pole smoothed position x (dual-pole only), vpx.
    pub cascade_x: f32,
    /// Second-pole smoothed position y (dual-pole only), vpx.
    pub cascade_y: f32,
    /// Whether the smoothed position has been adopted.
    pub initialized: bool,
}

impl SmoothingState {
    /// Create a fresh smoothing state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn adopt(&mut self, sample: &InputSample) {
        self.smoothed_x = sample.x;
        self.smoothed_y = sample.y;
        self.cascade_x = sample.x;
        self.cascade_y = sample.y;
        self.initialized = true;
    }
}

/// Resolve the adaptive band from config, substituting defaults when a
/// field is out of range or the band inequalities fail.
#[inline]
fn resolve_band(config: &steadypoint_schemas::AssistiveConfig) -> (f32, f32, f32, f32) {
    let alpha_ok = |a: f32| a.is_finite() && (0.05..=1.0).contains(&a);
    let (min_alpha, max_alpha) = if alpha_ok(config.smoothing_min_alpha)
        && alpha_ok(config.smoothing_max_alpha)
        && config.smoothing_min_alpha <= config.smoothing_max_alpha
    {
        (config.smoothing_min_alpha, config.smoothing_max_alpha)
    } else {
        (DEFAULT_MIN_ALPHA, DEFAULT_MAX_ALPHA)
    };

    let (v_low, v_high) = if config.smoothing_velocity_low.is_finite()
        && config.smoothing_velocity_high.is_finite()
        && config.smoothing_velocity_low >= 0.0
        && config.smoothing_velocity_high > config.smoothing_velocity_low
    {
        (config.smoothing_velocity_low, config.smoothing_velocity_high)
    } else {
        (DEFAULT_VELOCITY_LOW, DEFAULT_VELOCITY_HIGH)
    };

    (min_alpha, max_alpha, v_low, v_high)
}

/// Velocity-adaptive smoothing stage - single-pole IIR with adaptive pole.
///
/// The pole interpolates between `min_alpha` (at or below `v_low`) and
/// `max_alpha` (at or above `v_high`) along a Hermite smoothstep, then the
/// master strength biases it toward pass-through:
/// `alpha = 1 + strength * (alpha_base - 1)`. At strength 1 the full
/// adaptive range is active; at strength 0.5 the pole sits halfway to 1.
///
/// # RT Safety
///
/// - No heap allocations
/// - O(1) time complexity
/// - Bounded execution time
/// - No syscalls or I/O
///
/// # Arguments
///
/// * `sample` - The sample to process (modified in place)
/// * `state` - The stage state
/// * `ctx` - Per-step ambient inputs (config carries the band)
#[inline]
pub fn smoothing_filter(sample: &mut InputSample, state: &mut SmoothingState, ctx: &TransformContext) {
    let Some(config) = ctx.config else {
        state.adopt(sample);
        return;
    };
    if config.smoothing_strength <= 0.0 {
        state.adopt(sample);
        return;
    }
    if !state.initialized {
        state.adopt(sample);
        return;
    }

    let velocity = (sample.dx * sample.dx + sample.dy * sample.dy).sqrt();
    let (min_alpha, max_alpha, v_low, v_high) = resolve_band(config);

    let alpha_base = if velocity <= v_low {
        min_alpha
    } else if velocity >= v_high {
        max_alpha
    } else {
        let t = (velocity - v_low) / (v_high - v_low);
        let smooth = t * t * (3.0 - 2.0 * t);
        min_alpha + (max_alpha - min_alpha) * smooth
    };

    let alpha = (1.0 + config.smoothing_strength * (alpha_base - 1.0)).clamp(0.05, 1.0);

    state.smoothed_x += alpha * (sample.x - state.smoothed_x);
    state.smoothed_y += alpha * (sample.y - state.smoothed_y);

    if config.dual_pole {
        state.cascade_x += alpha * (state.smoothed_x - state.cascade_x);
        state.cascade_y += alpha * (state.smoothed_y - state.cascade_y);
        sample.x = state.cascade_x;
        sample.y = state.cascade_y;
    } else {
        sample.x = state.smoothed_x;
        sample.y = state.smoothed_y;
    }
}
