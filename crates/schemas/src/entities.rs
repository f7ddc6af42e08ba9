//! Value objects flowing through the assistive pipeline
//!
//! Samples and configs are value-typed, copied by value and never aliased:
//! a config presented to the pipeline is immutable for the duration of a
//! step, and the engine replaces it wholesale at frame boundaries rather
//! than mutating in place.

use crate::domain::ProfileId;
use serde::{Deserialize, Serialize};

/// One sampled pointer state, produced per fixed step by the stepper.
///
/// `x`/`y` are authoritative for downstream stages; `dx`/`dy` are
/// informational. Stateful stages may reshape absolute position (the
/// deadzone integrates compressed deltas), so `x + dx` of one step does not
/// need to equal the next step's `x`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputSample {
    /// Cursor position, virtual pixels.
    pub x: f32,
    /// Cursor position, virtual pixels.
    pub y: f32,
    /// Per-step delta, vpx/step.
    pub dx: f32,
    /// Per-step delta, vpx/step.
    pub dy: f32,
    /// Primary button held.
    pub primary_down: bool,
    /// Secondary button held.
    pub secondary_down: bool,
    /// Fixed-step index this sample belongs to.
    pub step_index: u64,
}

impl InputSample {
    /// Sample at a position with a per-step delta and no buttons held.
    pub fn new(x: f32, y: f32, dx: f32, dy: f32) -> Self {
        Self {
            x,
            y,
            dx,
            dy,
            primary_down: false,
            secondary_down: false,
            step_index: 0,
        }
    }

    /// Delta magnitude in vpx/step.
    #[inline]
    pub fn velocity(&self) -> f32 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }
}

impl Default for InputSample {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// Candidate UI target, supplied per step by the host's target discovery.
///
/// Snapshot semantics: the list handed to a step describes the UI at that
/// step; the pipeline never caches targets across steps except for the
/// magnetism lock id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetInfo {
    /// Stable identifier, unique within one snapshot.
    pub id: String,
    /// Target center, vpx.
    pub center_x: f32,
    /// Target center, vpx.
    pub center_y: f32,
    /// Bounding width, vpx.
    pub width: f32,
    /// Bounding height, vpx.
    pub height: f32,
}

impl TargetInfo {
    /// Construct a target from its center and extents.
    pub fn new(id: impl Into<String>, center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            center_x,
            center_y,
            width,
            height,
        }
    }

    /// Euclidean distance from a point to this target's center.
    #[inline]
    pub fn center_distance(&self, x: f32, y: f32) -> f32 {
        let ddx = self.center_x - x;
        let ddy = self.center_y - y;
        (ddx * ddx + ddy * ddy).sqrt()
    }
}

/// Measured user motor characteristics, produced by calibration/profiling.
///
/// Immutable once created. A frequency of 0 means "unmeasured"; the policy
/// mapper falls back to amplitude-only formulas in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorProfile {
    /// Stable profile identifier.
    pub profile_id: ProfileId,
    /// Dominant tremor frequency in Hz, 0 if unmeasured.
    pub tremor_frequency_hz: f32,
    /// Tremor amplitude in virtual pixels.
    pub tremor_amplitude_vpx: f32,
    /// Path efficiency in [0, 1]: net displacement over path length.
    pub path_efficiency: f32,
    /// Overshoot rate, >= 0: terminal direction reversals per acquisition.
    pub overshoot_rate: f32,
    /// Mean duration of a pointing movement, seconds.
    pub mean_movement_time_s: f32,
    /// Total measured input duration backing this profile, seconds.
    pub measurement_duration_s: f32,
    /// Schema format version for migration tracking.
    /// Old profiles without this field deserialize as 0.
    #[serde(default)]
    pub schema_version: u32,
}

impl MotorProfile {
    /// A neutral profile: no measured tremor, ideal paths.
    pub fn neutral(profile_id: ProfileId) -> Self {
        Self {
            profile_id,
            tremor_frequency_hz: 0.0,
            tremor_amplitude_vpx: 0.0,
            path_efficiency: 1.0,
            overshoot_rate: 0.0,
            mean_movement_time_s: 0.0,
            measurement_duration_s: 0.0,
            schema_version: crate::ingest::PROFILE_SCHEMA_VERSION,
        }
    }
}

/// Pipeline parameters, derived from a [`MotorProfile`] by the policy
/// mapper or ingested from a JSON document.
///
/// Immutable per config swap. Validation constraints live in
/// [`crate::validation::validate_config`]; the runtime layer additionally
/// clamps the safety-critical subset at ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistiveConfig {
    /// Master smoothing strength in [0, 1]. 0 disables the smoothing stage.
    pub smoothing_strength: f32,
    /// IIR pole at rest (strongest smoothing), in [0.05, 1].
    pub smoothing_min_alpha: f32,
    /// IIR pole at speed (weakest smoothing), in [0.05, 1].
    pub smoothing_max_alpha: f32,
    /// Lower edge of the velocity adaptation band, vpx/step.
    pub smoothing_velocity_low: f32,
    /// Upper edge of the velocity adaptation band, vpx/step.
    pub smoothing_velocity_high: f32,
    /// Track the measured tremor frequency at runtime.
    pub adaptive_frequency: bool,
    /// Cascade a second pole for steeper rolloff.
    pub dual_pole: bool,
    /// Soft deadzone radius in vpx, in [0, 3]. 0 disables the stage.
    pub deadzone_radius: f32,
    /// Feed-forward phase compensation gain in seconds, in [0, 0.1].
    pub phase_compensation_gain_s: f32,
    /// Directional intent boost strength in [0, 1]. 0 disables the stage.
    pub intent_boost_strength: f32,
    /// Filtered-coherence level at which intent engages, in [0.5, 1].
    pub intent_coherence_threshold: f32,
    /// Filtered-coherence level at which intent disengages, in [0.3, 1].
    pub intent_disengage_threshold: f32,
    /// Magnetism activation radius in vpx, >= 0. 0 disables the stage.
    pub magnetism_radius: f32,
    /// Magnetism pull strength in [0, 1]. 0 disables the stage.
    pub magnetism_strength: f32,
    /// Extra distance beyond the radius before a locked target releases.
    pub magnetism_hysteresis: f32,
    /// Distance at which output snaps to the target center; 0 disables snap.
    pub magnetism_snap_radius: f32,
    /// Edge resistance in [0, 1]. Preserved in the schema; no stage in the
    /// canonical pipeline consumes it yet.
    pub edge_resistance: f32,
    /// Prediction horizon in seconds. Reserved; no stage consumes it.
    pub prediction_horizon_s: f32,
    /// Id of the motor profile this config was derived from.
    pub source_profile_id: ProfileId,
    /// Version of the policy that produced this config.
    pub policy_version: u32,
    /// Config document schema version.
    #[serde(default = "crate::ingest::default_config_schema_version")]
    pub schema_version: u32,
}

impl AssistiveConfig {
    /// A valid pass-through config: every stage disabled, band fields at
    /// their documented defaults.
    pub fn passthrough(source_profile_id: ProfileId) -> Self {
        Self {
            smoothing_strength: 0.0,
            smoothing_min_alpha: 0.25,
            smoothing_max_alpha: 0.90,
            smoothing_velocity_low: 0.5,
            smoothing_velocity_high: 10.0,
            adaptive_frequency: false,
            dual_pole: false,
            deadzone_radius: 0.0,
            phase_compensation_gain_s: 0.0,
            intent_boost_strength: 0.0,
            intent_coherence_threshold: 0.80,
            intent_disengage_threshold: 0.65,
            magnetism_radius: 0.0,
            magnetism_strength: 0.0,
            magnetism_hysteresis: 0.0,
            magnetism_snap_radius: 0.0,
            edge_resistance: 0.0,
            prediction_horizon_s: 0.0,
            source_profile_id,
            policy_version: 0,
            schema_version: crate::ingest::CONFIG_SCHEMA_VERSION,
        }
    }
}

/// Per-step ambient inputs handed to every transform stage.
///
/// Ephemeral: one context per step, borrowing the target snapshot and the
/// active config for that step only.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    /// Fixed-step index.
    pub step_index: u64,
    /// Fixed timestep in seconds.
    pub dt: f32,
    /// Target snapshot for this step.
    pub targets: &'a [TargetInfo],
    /// Active config; `None` means every stage passes through.
    pub config: Option<&'a AssistiveConfig>,
    /// Source motor profile, if the caller has one.
    pub profile: Option<&'a MotorProfile>,
}

impl<'a> TransformContext<'a> {
    /// Context with a config and no targets.
    pub fn with_config(step_index: u64, dt: f32, config: &'a AssistiveConfig) -> Self {
        Self {
            step_index,
            dt,
            targets: &[],
            config: Some(config),
            profile: None,
        }
    }
}

/// Stage transitions observed during one fixed step.
///
/// A fixed-size flag set rather than an event vector: the hot path must not
/// allocate.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvents {
    /// Intent boost engaged this step.
    pub intent_engaged: bool,
    /// Intent boost disengaged this step.
    pub intent_disengaged: bool,
    /// Magnetism locked onto a target this step.
    pub magnetism_locked: bool,
    /// Magnetism released its target this step.
    pub magnetism_released: bool,
}

impl StepEvents {
    /// True if any transition fired this step.
    pub fn any(&self) -> bool {
        self.intent_engaged
            || self.intent_disengaged
            || self.magnetism_locked
            || self.magnetism_released
    }
}

/// Per-step output returned to the caller by the stepper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineFrameResult {
    /// Index of the fixed step that produced this result.
    pub step_index: u64,
    /// Sample after the full transform chain.
    pub sample: InputSample,
    /// Sample as it entered the chain.
    pub raw: InputSample,
    /// Stage transitions observed during the step.
    pub events: StepEvents,
    /// Running determinism hash after this step.
    pub hash: u64,
    /// Interpolation alpha in [0, 1): accumulator remainder over the fixed
    /// timestep. Always 0 in fixed-step mode.
    pub alpha: f32,
    /// Fixed steps executed for this call (wall-clock mode may run 0..cap).
    pub steps_run: u32,
}

/// Raw pointer event as delivered by the OS capture hook.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawInputEvent {
    /// Relative motion, vpx per host report.
    pub dx: f32,
    /// Relative motion, vpx per host report.
    pub dy: f32,
    /// Primary button held at this report.
    pub primary_down: bool,
    /// Secondary button held at this report.
    pub secondary_down: bool,
    /// Host monotonic clock at capture, in host ticks.
    pub host_ticks: u64,
}

/// Assisted relative motion emitted to the OS injection collaborator.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssistedDelta {
    /// Assisted motion, vpx.
    pub dx: f32,
    /// Assisted motion, vpx.
    pub dy: f32,
    /// Fixed step that produced this delta.
    pub step_index: u64,
}

/// Engine-owned virtual cursor.
///
/// Reset at `enable`; mutated only by the engine thread.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CursorState {
    /// Position, vpx.
    pub x: f32,
    /// Position, vpx.
    pub y: f32,
    /// Velocity, vpx/s.
    pub vx: f32,
    /// Velocity, vpx/s.
    pub vy: f32,
    /// Primary button held.
    pub primary_down: bool,
    /// Secondary button held.
    pub secondary_down: bool,
}

impl CursorState {
    /// Place the cursor at a position with zero velocity and buttons up.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }
}
