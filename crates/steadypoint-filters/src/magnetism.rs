//! Target Magnetism (Hysteretic Snap)
//!
//! This module provides the magnetism stage: attraction toward the center
//! of the nearest UI target inside an activation radius, a hard snap when
//! very close, and a hysteresis band so a locked target does not release
//! the instant the cursor crosses back over the radius.

use steadypoint_schemas::{InputSample, TargetInfo, TransformContext};

/// State for the target magnetism stage.
///
/// The lock id buffer is reused across engagements; it only grows when a
/// longer target id is locked for the first time, so steady-state steps
/// are allocation-free.
///
/// # RT Safety
///
/// - No heap allocations in steady state
/// - O(targets) time complexity per step
/// - Bounded execution time
#[derive(Clone, Debug, Default)]
pub struct MagnetismState {
    /// Whether a target is currently locked.
    pub engaged: bool,
    /// Id of the locked target; meaningful only while engaged.
    pub locked_id: String,
}

impl MagnetismState {
    /// Create a fresh magnetism state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear engagement. The id buffer keeps its capacity.
    pub fn reset(&mut self) {
        self.engaged = false;
        self.locked_id.clear();
    }

    fn lock(&mut self, id: &str) {
        self.engaged = true;
        self.locked_id.clear();
        self.locked_id.push_str(id);
    }

    fn release(&mut self) {
        self.engaged = false;
        self.locked_id.clear();
    }
}

fn nearest_target<'a>(targets: &'a [TargetInfo], x: f32, y: f32) -> Option<(&'a TargetInfo, f32)> {
    let mut best: Option<(&TargetInfo, f32)> = None;
    for target in targets {
        let d = target.center_distance(x, y);
        match best {
            Some((_, best_d)) if best_d <= d => {}
            _ => best = Some((target, d)),
        }
    }
    best
}

/// Target magnetism stage.
///
/// The nearest target by center distance is the only candidate each step.
/// A locked target releases only beyond `radius + hysteresis`; an unlocked
/// (or differently-locked) candidate engages at `radius`. While engaged,
/// output is pulled toward the center with quadratic proximity falloff
/// `(1 - d/radius)^2`, or snapped to the center inside the snap radius.
/// Deltas are unchanged.
///
/// # RT Safety
///
/// - No heap allocations in steady state
/// - O(targets) time complexity
/// - Bounded execution time
/// - No syscalls or I/O
///
/// # Arguments
///
/// * `sample` - The sample to process (modified in place)
/// * `state` - The stage state
/// * `ctx` - Per-step ambient inputs (targets snapshot and config)
#[inline]
pub fn magnetism_filter(sample: &mut InputSample, state: &mut MagnetismState, ctx: &TransformContext) {
    let Some(config) = ctx.config else {
        state.release();
        return;
    };
    if config.magnetism_strength <= 0.0 || config.magnetism_radius <= 0.0 || ctx.targets.is_empty()
    {
        state.release();
        return;
    }

    let Some((target, distance)) = nearest_target(ctx.targets, sample.x, sample.y) else {
        state.release();
        return;
    };

    if state.engaged && state.locked_id == target.id {
        if distance > config.magnetism_radius + config.magnetism_hysteresis {
            state.release();
        }
    } else if distance <= config.magnetism_radius {
        state.lock(&target.id);
    } else {
        state.release();
    }

    if !state.engaged {
        return;
    }

    if config.magnetism_snap_radius > 0.0 && distance <= config.magnetism_snap_radius {
        sample.x = target.center_x;
        sample.y = target.center_y;
        return;
    }

    let proximity = {
        let p = 1.0 - distance / config.magnetism_radius;
        p * p
    };
    let effective_strength = config.magnetism_strength * proximity;
    sample.x += (target.center_x - sample.x) * effective_strength;
    sample.y += (target.center_y - sample.y) * effective_strength;
}
