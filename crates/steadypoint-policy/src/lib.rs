//! Policy mapper: motor profile to assistive config
//!
//! A pure, total function from measured motor characteristics to pipeline
//! parameters. Every formula is closed-form DSP: the smoothing pole is
//! placed from the measured tremor frequency, the deadzone radius follows
//! a power law in frequency, phase compensation is sized from the expected
//! filter lag, and magnetism is sized from the path-efficiency deficit.
//!
//! The mapping is deterministic and invariant under repeated calls:
//! `map_profile(p) == map_profile(p)` bit-exactly. There is no state, no
//! I/O and no clock anywhere in this crate.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]

use std::f32::consts::TAU;
use steadypoint_schemas::{AssistiveConfig, MotorProfile};

/// Version of the canonical closed-form policy, embedded in every output.
pub const POLICY_VERSION: u32 = 4;

/// Fixed pipeline sample rate the pole formulas assume, Hz.
const SAMPLE_RATE_HZ: f32 = 60.0;

/// Intent engage threshold shared by every mapped config.
const INTENT_ENGAGE_THRESHOLD: f32 = 0.80;

/// How far below the engage threshold intent disengages.
const INTENT_HYSTERESIS_BAND: f32 = 0.15;

#[inline]
fn clamp01(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Pole at rest, placing the -3 dB cutoff of the single-pole IIR at half
/// the tremor frequency: `alpha = 2*pi * (F/2) / Fs`, bounded to keep the
/// filter responsive at the extremes.
fn min_alpha(amplitude: f32, frequency_hz: f32) -> f32 {
    if frequency_hz > 0.0 {
        (TAU * 0.5 / SAMPLE_RATE_HZ * frequency_hz).clamp(0.20, 0.40)
    } else {
        (0.35 - 0.015 * amplitude).max(0.20)
    }
}

/// Deadzone radius. The power-law exponent 0.65 lies between square-root
/// and linear: suppression relaxes at low tremor frequency and tightens at
/// high frequency.
fn deadzone_radius(amplitude: f32, frequency_hz: f32) -> f32 {
    if amplitude <= 0.5 {
        return 0.0;
    }
    let base = 0.8 * amplitude;
    let radius = if frequency_hz > 0.0 {
        base * (frequency_hz / 8.0).powf(0.65)
    } else {
        base
    };
    radius.clamp(0.2, 3.0)
}

/// Phase-compensation gain in seconds, sized from the mean EMA group delay
/// `(1 - alpha) / (alpha * Fs)` and attenuated toward zero as `min_alpha`
/// rises: high-frequency tremor already has little lag to compensate.
fn phase_gain_s(strength: f32, min_alpha: f32, max_alpha: f32) -> f32 {
    if strength < 0.1 {
        return 0.0;
    }
    let mean_alpha = (min_alpha + max_alpha) / 2.0;
    let lag_s = (1.0 - mean_alpha) / (mean_alpha * SAMPLE_RATE_HZ);
    let attenuation = 1.0 - clamp01((min_alpha - 0.30) / 0.10);
    0.7 * lag_s * attenuation
}

/// Map a measured motor profile to pipeline parameters.
///
/// Total and deterministic; depends only on the profile's tremor
/// amplitude/frequency, path efficiency and overshoot rate. The policy
/// version is embedded in the output.
#[must_use]
pub fn map_profile(profile: &MotorProfile) -> AssistiveConfig {
    let amplitude = profile.tremor_amplitude_vpx;
    let frequency = profile.tremor_frequency_hz;
    let efficiency = profile.path_efficiency;
    let overshoot = profile.overshoot_rate;

    let smoothing_strength = clamp01(amplitude / 10.0);
    let smoothing_min_alpha = min_alpha(amplitude, frequency);
    let smoothing_max_alpha = (0.85 + 0.10 * efficiency).min(0.95);

    let velocity_low = (0.5 + 0.1 * amplitude).max(0.3);
    let velocity_high = (10.0 - 0.5 * amplitude).max(velocity_low + 1.0);

    let deficit = clamp01(1.0 - efficiency);
    let magnetism_radius = 30.0 + 120.0 * deficit;

    let intent_boost_strength = if efficiency > 0.6 {
        clamp01(efficiency - 0.4)
    } else {
        0.0
    };

    AssistiveConfig {
        smoothing_strength,
        smoothing_min_alpha,
        smoothing_max_alpha,
        smoothing_velocity_low: velocity_low,
        smoothing_velocity_high: velocity_high,
        adaptive_frequency: frequency > 0.0,
        dual_pole: amplitude > 4.0,
        deadzone_radius: deadzone_radius(amplitude, frequency),
        phase_compensation_gain_s: phase_gain_s(
            smoothing_strength,
            smoothing_min_alpha,
            smoothing_max_alpha,
        ),
        intent_boost_strength,
        intent_coherence_threshold: INTENT_ENGAGE_THRESHOLD,
        intent_disengage_threshold: (INTENT_ENGAGE_THRESHOLD - INTENT_HYSTERESIS_BAND).max(0.50),
        magnetism_radius,
        magnetism_strength: clamp01(0.5 * smoothing_strength + 0.5 * deficit),
        magnetism_hysteresis: 0.15 * magnetism_radius,
        magnetism_snap_radius: if amplitude > 3.0 { 5.0 } else { 0.0 },
        edge_resistance: clamp01(0.3 * overshoot),
        prediction_horizon_s: clamp01(0.05 - 0.01 * overshoot),
        source_profile_id: profile.profile_id.clone(),
        policy_version: POLICY_VERSION,
        schema_version: steadypoint_schemas::CONFIG_SCHEMA_VERSION,
    }
}
