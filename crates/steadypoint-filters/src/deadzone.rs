//! Soft Deadzone (Magnitude-Domain Compression)
//!
//! This module provides the soft deadzone stage, which compresses small
//! per-step deltas while passing large ones nearly intact. Tremor is
//! suppressed in the magnitude domain, so the stage adds no phase lag.

use steadypoint_schemas::{InputSample, TransformContext};

/// Deltas below this magnitude are treated as zero.
const MIN_DELTA: f32 = 1e-6;

/// State for the soft deadzone stage.
///
/// The stage integrates compressed deltas into its own output position, so
/// it owns the authoritative cursor position for everything downstream of
/// it. The radius is read from the active config each step.
///
/// # RT Safety
///
/// - `#[repr(C)]` for stable ABI
/// - No heap allocations
/// - O(1) time complexity
/// - Bounded execution time
#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct DeadzoneState {
    /// Previous output position x, vpx.
    pub prev_x: f32,
    /// Previous output position y, vpx.
    pub prev_y: f32,
    /// Whether a previous output position has been adopted.
    pub initialized: bool,
}

impl DeadzoneState {
    /// Create a fresh deadzone state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Soft deadzone stage - compresses small deltas, passes large ones.
///
/// The compression curve is `scale = r / (r + D)` where `r` is the delta
/// magnitude and `D` the configured radius. The output magnitude is
/// `r' = r^2 / (r + D)`: continuous and differentiable at the origin,
/// monotone in `r`, with `r'/r -> 0` as `r -> 0` and `r'/r -> 1` as
/// `r -> inf`. At the knee `r = D` exactly half the delta passes.
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
/// * `ctx` - Per-step ambient inputs (config carries the radius)
#[inline]
pub fn deadzone_filter(sample: &mut InputSample, state: &mut DeadzoneState, ctx: &TransformContext) {
    let radius = ctx.config.map(|c| c.deadzone_radius).unwrap_or(0.0);

    if radius <= 0.0 {
        state.prev_x = sample.x;
        state.prev_y = sample.y;
        state.initialized = true;
        return;
    }

    if !state.initialized {
        state.prev_x = sample.x;
        state.prev_y = sample.y;
        state.initialized = true;
        return;
    }

    let r = (sample.dx * sample.dx + sample.dy * sample.dy).sqrt();
    if r < MIN_DELTA {
        sample.x = state.prev_x;
        sample.y = state.prev_y;
        sample.dx = 0.0;
        sample.dy = 0.0;
        return;
    }

    let scale = r / (r + radius);
    let out_dx = sample.dx * scale;
    let out_dy = sample.dy * scale;

    state.prev_x += out_dx;
    state.prev_y += out_dy;

    sample.x = state.prev_x;
    sample.y = state.prev_y;
    sample.dx = out_dx;
    sample.dy = out_dy;
}
