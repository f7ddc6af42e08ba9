//! Phase Compensation (Feed-Forward Projection)
//!
//! This module provides the stateless phase compensation stage. A
//! single-pole low-pass introduces a group delay of roughly
//! `(1 - alpha) / (alpha * Fs)` seconds; this stage offsets that lag by
//! projecting the position forward along the current velocity, attenuated
//! at high velocity so rapid moves do not overshoot.

use crate::SAMPLE_RATE_HZ;
use steadypoint_schemas::{InputSample, TransformContext};

/// Velocity at which the effective gain is halved, vpx/step.
const SATURATION_VELOCITY: f32 = 15.0;

/// Phase compensation stage - projects position forward against filter lag.
///
/// With gain `g` seconds and velocity `v` vpx/step, the effective gain is
/// `g / (1 + v / 15)` and the position shifts by `g_eff * delta * Fs`.
/// Deltas are unchanged. The stage is stateless; reset is a no-op.
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
/// * `ctx` - Per-step ambient inputs (config carries the gain)
#[inline]
pub fn phase_compensation_filter(sample: &mut InputSample, ctx: &TransformContext) {
    let gain_s = ctx.config.map(|c| c.phase_compensation_gain_s).unwrap_or(0.0);
    if gain_s <= 0.0 {
        return;
    }

    let velocity = (sample.dx * sample.dx + sample.dy * sample.dy).sqrt();
    let effective_gain = gain_s / (1.0 + velocity / SATURATION_VELOCITY);

    sample.x += effective_gain * sample.dx * SAMPLE_RATE_HZ;
    sample.y += effective_gain * sample.dy * SAMPLE_RATE_HZ;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;
    use steadypoint_schemas::{AssistiveConfig, ProfileId};

    fn config(gain_s: f32) -> AssistiveConfig {
        let mut cfg = AssistiveConfig::passthrough(ProfileId::new("pc").unwrap());
        cfg.phase_compensation_gain_s = gain_s;
        cfg
    }

    fn ctx(config: &AssistiveConfig) -> TransformContext<'_> {
        TransformContext::with_config(0, crate::FIXED_DT, config)
    }

    #[test]
    fn test_zero_gain_passes_through() {
        let cfg = config(0.0);
        let mut sample = InputSample::new(10.0, 20.0, 1.0, 3.0);
        phase_compensation_filter(&mut sample, &ctx(&cfg));

        assert_eq!(sample.x, 10.0);
        assert_eq!(sample.y, 20.0);
    }

    #[test]
    fn test_no_config_passes_through() {
        let ctx = TransformContext {
            step_index: 0,
            dt: crate::FIXED_DT,
            targets: &[],
            config: None,
            profile: None,
        };
        let mut sample = InputSample::new(1.0, 2.0, 5.0, 5.0);
        phase_compensation_filter(&mut sample, &ctx);
        assert_eq!(sample.x, 1.0);
    }

    #[test]
    fn test_velocity_saturation() {
        // gain 0.02, delta (1, 3) at (10, 20):
        // v = sqrt(10), g_eff = 0.02 / (1 + sqrt(10)/15)
        let cfg = config(0.02);
        let mut sample = InputSample::new(10.0, 20.0, 1.0, 3.0);
        phase_compensation_filter(&mut sample, &ctx(&cfg));

        let v = 10.0f32.sqrt();
        let g_eff = 0.02 / (1.0 + v / 15.0);
        assert!((sample.x - (10.0 + g_eff * 1.0 * 60.0)).abs() < 1e-5);
        assert!((sample.y - (20.0 + g_eff * 3.0 * 60.0)).abs() < 1e-5);
        // Deltas untouched
        assert_eq!(sample.dx, 1.0);
        assert_eq!(sample.dy, 3.0);
    }

    #[test]
    fn test_projection_shrinks_with_velocity() {
        let cfg = config(0.05);

        let lead = |v: f32| {
            let mut sample = InputSample::new(0.0, 0.0, v, 0.0);
            phase_compensation_filter(&mut sample, &ctx(&cfg));
            sample.x / v
        };

        // Per-delta lead factor must fall as velocity grows
        assert!(lead(1.0) > lead(5.0));
        assert!(lead(5.0) > lead(30.0));
    }

    #[test]
    fn test_at_saturation_velocity_gain_is_halved() {
        let cfg = config(0.04);
        let mut sample = InputSample::new(0.0, 0.0, 15.0, 0.0);
        phase_compensation_filter(&mut sample, &ctx(&cfg));

        let expected = 0.04 / 2.0 * 15.0 * 60.0;
        assert!((sample.x - expected).abs() < 1e-4);
    }

    #[test]
    fn test_zero_delta_no_shift() {
        let cfg = config(0.1);
        let mut sample = InputSample::new(3.0, 4.0, 0.0, 0.0);
        phase_compensation_filter(&mut sample, &ctx(&cfg));
        assert_eq!(sample.x, 3.0);
        assert_eq!(sample.y, 4.0);
    }
}
