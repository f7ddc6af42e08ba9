//! Pipeline stages as a tagged sum
//!
//! Each stage owns its state exclusively and inline: the pipeline is a
//! vector of enum variants, matched once per stage per step. No trait
//! objects, no v-table dispatch, no aliased state. Reset is a concrete
//! operation per variant through the unique ownership path.

use steadypoint_filters::prelude::*;
use steadypoint_schemas::{InputSample, StepEvents, TransformContext};

/// One transform stage with its state held inline.
#[derive(Debug, Clone)]
pub enum Stage {
    /// Soft deadzone (magnitude-domain compression).
    Deadzone(DeadzoneState),
    /// Velocity-adaptive single-pole IIR smoothing.
    Smoothing(SmoothingState),
    /// Stateless feed-forward phase compensation.
    PhaseCompensation,
    /// Hysteretic directional-intent boost.
    Intent(IntentState),
    /// Hysteretic target magnetism.
    Magnetism(MagnetismState),
}

impl Stage {
    /// Apply this stage to a sample in place.
    #[inline]
    pub fn apply(&mut self, sample: &mut InputSample, ctx: &TransformContext) {
        match self {
            Stage::Deadzone(state) => deadzone_filter(sample, state, ctx),
            Stage::Smoothing(state) => smoothing_filter(sample, state, ctx),
            Stage::PhaseCompensation => phase_compensation_filter(sample, ctx),
            Stage::Intent(state) => intent_filter(sample, state, ctx),
            Stage::Magnetism(state) => magnetism_filter(sample, state, ctx),
        }
    }

    /// Clear this stage's state.
    pub fn reset(&mut self) {
        match self {
            Stage::Deadzone(state) => state.reset(),
            Stage::Smoothing(state) => state.reset(),
            Stage::PhaseCompensation => {}
            Stage::Intent(state) => state.reset(),
            Stage::Magnetism(state) => state.reset(),
        }
    }

    /// Stable stage name for logs and diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Deadzone(_) => "deadzone",
            Stage::Smoothing(_) => "smoothing",
            Stage::PhaseCompensation => "phase_compensation",
            Stage::Intent(_) => "intent",
            Stage::Magnetism(_) => "magnetism",
        }
    }
}

/// Ordered composition of transform stages.
///
/// Created once; `reset` clears every stage's state together. The engine
/// thread holds the pipeline by value.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::canonical()
    }
}

impl Pipeline {
    /// The canonical stage order: deadzone -> smoothing -> phase
    /// compensation -> intent -> magnetism.
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            stages: vec![
                Stage::Deadzone(DeadzoneState::new()),
                Stage::Smoothing(SmoothingState::new()),
                Stage::PhaseCompensation,
                Stage::Intent(IntentState::new()),
                Stage::Magnetism(MagnetismState::new()),
            ],
        }
    }

    /// Build a pipeline from an explicit stage sequence.
    #[must_use]
    pub fn from_stages(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True when the pipeline has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Apply every stage in order to a sample in place, reporting the
    /// engagement transitions observed during the step.
    ///
    /// # RT Safety
    ///
    /// No heap allocations; O(stages) with each stage O(1)
    /// (magnetism O(targets)).
    #[inline]
    pub fn apply(&mut self, sample: &mut InputSample, ctx: &TransformContext) -> StepEvents {
        let intent_before = self.intent_engaged();
        let magnetism_before = self.magnetism_engaged();

        for stage in &mut self.stages {
            stage.apply(sample, ctx);
        }

        let intent_after = self.intent_engaged();
        let magnetism_after = self.magnetism_engaged();
        StepEvents {
            intent_engaged: intent_after && !intent_before,
            intent_disengaged: !intent_after && intent_before,
            magnetism_locked: magnetism_after && !magnetism_before,
            magnetism_released: !magnetism_after && magnetism_before,
        }
    }

    /// Clear every stage's state.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    /// Whether the intent stage is currently engaged.
    #[must_use]
    pub fn intent_engaged(&self) -> bool {
        self.stages
            .iter()
            .any(|s| matches!(s, Stage::Intent(state) if state.engaged))
    }

    /// Whether the magnetism stage currently holds a target lock.
    #[must_use]
    pub fn magnetism_engaged(&self) -> bool {
        self.stages
            .iter()
            .any(|s| matches!(s, Stage::Magnetism(state) if state.engaged))
    }
}
