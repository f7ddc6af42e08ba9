//! Directional-Intent Boost (Hysteretic)
//!
//! This module provides the intent stage. Sustained intentional motion is
//! detected by the cosine coherence of successive velocity vectors; the
//! coherence is low-pass filtered and, once the filtered value crosses the
//! engage threshold, the cursor is advanced slightly along the motion
//! direction. The engage/disengage band prevents flicker at the boundary.

use steadypoint_schemas::{InputSample, TransformContext};

/// Pole of the coherence EMA.
const COHERENCE_EMA_BETA: f32 = 0.15;
/// Boost factor applied to the ramped strength.
const BOOST_FACTOR: f32 = 0.3;
/// Velocities below this floor contribute zero coherence, vpx/step.
const COHERENCE_VELOCITY_FLOOR: f32 = 0.1;
/// Minimum velocity for the boost to apply, vpx/step.
const MIN_BOOST_VELOCITY: f32 = 0.5;

/// State for the directional-intent stage.
///
/// # RT Safety
///
/// - `#[repr(C)]` for stable ABI
/// - No heap allocations
/// - O(1) time complexity
/// - Bounded execution time
#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct IntentState {
    /// Previous step's delta x, vpx/step.
    pub prev_dx: f32,
    /// Previous step's delta y, vpx/step.
    pub prev_dy: f32,
    /// Low-pass filtered coherence in [-1, 1].
    pub coherence_ema: f32,
    /// Whether the boost is currently engaged.
    pub engaged: bool,
    /// Whether a previous delta has been recorded.
    pub initialized: bool,
}

impl IntentState {
    /// Create a fresh intent state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Directional-intent boost stage.
///
/// Coherence of the current and previous velocity vectors updates an EMA
/// (`beta = 0.15`). Engagement is hysteretic: engage above the coherence
/// threshold, disengage below the (lower) disengage threshold. While
/// engaged and moving faster than 0.5 vpx/step, the position advances by
/// `ramp * strength * 0.3` of the current delta along the unit motion
/// direction. Deltas are unchanged.
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
/// * `ctx` - Per-step ambient inputs (config carries strength/thresholds)
#[inline]
pub fn intent_filter(sample: &mut InputSample, state: &mut IntentState, ctx: &TransformContext) {
    let store = |state: &mut IntentState, sample: &InputSample| {
        state.prev_dx = sample.dx;
        state.prev_dy = sample.dy;
        state.initialized = true;
    };

    let Some(config) = ctx.config else {
        store(state, sample);
        return;
    };
    if config.intent_boost_strength <= 0.0 || !state.initialized {
        store(state, sample);
        return;
    }

    let v_cur = (sample.dx * sample.dx + sample.dy * sample.dy).sqrt();
    let v_prev = (state.prev_dx * state.prev_dx + state.prev_dy * state.prev_dy).sqrt();

    let coherence = if v_cur > COHERENCE_VELOCITY_FLOOR && v_prev > COHERENCE_VELOCITY_FLOOR {
        (sample.dx * state.prev_dx + sample.dy * state.prev_dy) / (v_cur * v_prev)
    } else {
        0.0
    };
    state.coherence_ema += COHERENCE_EMA_BETA * (coherence - state.coherence_ema);

    store(state, sample);

    let engage = config.intent_coherence_threshold;
    let disengage = config.intent_disengage_threshold;
    if state.engaged {
        if state.coherence_ema < disengage {
            state.engaged = false;
        }
    } else if state.coherence_ema > engage {
        state.engaged = true;
    }

    if state.engaged && v_cur > MIN_BOOST_VELOCITY {
        let ramp = ((state.coherence_ema - engage) / (1.0 - engage)).clamp(0.0, 1.0);
        let boost = ramp * config.intent_boost_strength * BOOST_FACTOR;
        let nx = sample.dx / v_cur;
        let ny = sample.dy / v_cur;
        sample.x += nx * boost * v_cur;
        sample.y += ny * boost * v_cur;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;
    use steadypoint_schemas::{AssistiveConfig, ProfileId};

    fn config(strength: f32) -> AssistiveConfig {
        let mut cfg = AssistiveConfig::passthrough(ProfileId::new("in").unwrap());
        cfg.intent_boost_strength = strength;
        cfg.intent_coherence_threshold = 0.80;
        cfg.intent_disengage_threshold = 0.65;
        cfg
    }

    fn ctx(config: &AssistiveConfig) -> TransformContext<'_> {
        TransformContext::with_config(0, crate::FIXED_DT, config)
    }

    #[test]
    fn test_zero_strength_passes_through_but_tracks_delta() {
        let cfg = config(0.0);
        let mut state = IntentState::new();
        let mut sample = InputSample::new(0.0, 0.0, 5.0, 0.0);
        intent_filter(&mut sample, &mut state, &ctx(&cfg));

        assert_eq!(sample.x, 0.0);
        assert_eq!(state.prev_dx, 5.0);
    }

    #[test]
    fn test_constant_direction_engages_and_boosts() {
        let cfg = config(0.8);
        let mut state = IntentState::new();

        let mut x = 0.0f32;
        let mut out_x = 0.0f32;
        for step in 0..40 {
            x += 5.0;
            let mut sample = InputSample::new(x, 0.0, 5.0, 0.0);
            sample.step_index = step;
            intent_filter(&mut sample, &mut state, &ctx(&cfg));
            out_x = sample.x;
        }

        assert!(state.engaged, "constant direction must engage");
        assert!(
            out_x > x,
            "boosted output ({out_x}) must lead cumulative raw x ({x})"
        );
    }

    #[test]
    fn test_alternating_motion_never_engages() {
        let cfg = config(0.8);
        let mut state = IntentState::new();

        let mut x = 0.0f32;
        let mut max_deviation = 0.0f32;
        for step in 0..40 {
            let dx = if step % 2 == 0 { 5.0 } else { -5.0 };
            x += dx;
            let mut sample = InputSample::new(x, 0.0, dx, 0.0);
            intent_filter(&mut sample, &mut state, &ctx(&cfg));
            max_deviation = max_deviation.max((sample.x - x).abs());
        }

        assert!(!state.engaged);
        assert!(
            max_deviation < 0.1,
            "alternating motion must pass through (deviation {max_deviation})"
        );
    }

    #[test]
    fn test_hysteresis_band_prevents_flicker() {
        let cfg = config(0.8);
        let mut state = IntentState::new();

        // Drive coherence up with constant-direction motion
        for _ in 0..60 {
            let mut sample = InputSample::new(0.0, 0.0, 5.0, 0.0);
            intent_filter(&mut sample, &mut state, &ctx(&cfg));
        }
        assert!(state.engaged);

        // Mildly incoherent motion decays the EMA below the engage level
        // but not below disengage immediately; engagement must persist.
        let mut still_engaged_below_engage = false;
        for step in 0..200 {
            let dx = if step % 4 == 0 { 0.05 } else { 5.0 };
            let mut sample = InputSample::new(0.0, 0.0, dx, 0.0);
            intent_filter(&mut sample, &mut state, &ctx(&cfg));
            if state.engaged && state.coherence_ema < 0.80 && state.coherence_ema >= 0.65 {
                still_engaged_below_engage = true;
            }
        }
        assert!(still_engaged_below_engage);
    }

    #[test]
    fn test_disengages_below_disengage_threshold() {
        let cfg = config(0.8);
        let mut state = IntentState::new();

        for _ in 0..60 {
            let mut sample = InputSample::new(0.0, 0.0, 5.0, 0.0);
            intent_filter(&mut sample, &mut state, &ctx(&cfg));
        }
        assert!(state.engaged);

        // Reversals drive coherence negative
        for step in 0..60 {
            let dx = if step % 2 == 0 { 5.0 } else { -5.0 };
            let mut sample = InputSample::new(0.0, 0.0, dx, 0.0);
            intent_filter(&mut sample, &mut state, &ctx(&cfg));
        }
        assert!(!state.engaged);
    }

    #[test]
    fn test_no_boost_below_velocity_floor() {
        let cfg = config(0.8);
        let mut state = IntentState::new();

        for _ in 0..60 {
            let mut sample = InputSample::new(0.0, 0.0, 5.0, 0.0);
            intent_filter(&mut sample, &mut state, &ctx(&cfg));
        }
        assert!(state.engaged);

        // Engaged but creeping: 0.3 vpx/step is under the boost floor
        let mut sample = InputSample::new(7.0, 0.0, 0.3, 0.0);
        intent_filter(&mut sample, &mut state, &ctx(&cfg));
        assert_eq!(sample.x, 7.0);
    }

    #[test]
    fn test_slow_motion_contributes_zero_coherence() {
        let cfg = config(0.8);
        let mut state = IntentState::new();

        // Sub-floor velocities: coherence stays at zero
        for _ in 0..40 {
            let mut sample = InputSample::new(0.0, 0.0, 0.05, 0.0);
            intent_filter(&mut sample, &mut state, &ctx(&cfg));
        }
        assert!(state.coherence_ema.abs() < 1e-6);
        assert!(!state.engaged);
    }

    #[test]
    fn test_reset_clears_state() {
        let cfg = config(0.8);
        let mut state = IntentState::new();
        for _ in 0..60 {
            let mut sample = InputSample::new(0.0, 0.0, 5.0, 0.0);
            intent_filter(&mut sample, &mut state, &ctx(&cfg));
        }
        state.reset();
        assert!(!state.engaged);
        assert!(!state.initialized);
        assert_eq!(state.coherence_ema, 0.0);
    }
}
