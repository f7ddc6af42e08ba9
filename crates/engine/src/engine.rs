//! Engine thread and control plane
//!
//! The engine thread is the only mutator of pipeline state, cursor state,
//! the active config and the echo ring. The control plane communicates
//! through atomic flags, the pending-config slot and the bounded queues;
//! every control method is safe to call from any thread concurrently with
//! the engine thread.

use crate::safety::{self, clamp_step_delta};
use crossbeam::atomic::AtomicCell;
use crossbeam::queue::ArrayQueue;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use steadypoint_atomic::{AtomicCounters, CounterSnapshot, EchoRing};
use steadypoint_pipeline::{DeterministicStepper, Pipeline, StepperConfig};
use steadypoint_schemas::{
    AssistedDelta, AssistiveConfig, CursorState, InputSample, MotorProfile, RawInputEvent,
    TargetInfo, TransformContext, ValidationIssue, validate_config,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Per-component threshold below which an assisted delta is not emitted.
const EMIT_THRESHOLD: f32 = 1e-3;

/// How long `disable` waits for the engine thread to exit.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors surfaced by the engine control plane.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A config failed schema validation; nothing was applied.
    #[error("config rejected: {}", format_issues(.0))]
    InvalidConfig(Vec<ValidationIssue>),

    /// `enable` was called while the engine thread is running.
    #[error("engine is already running")]
    AlreadyRunning,

    /// A control call required a running engine thread.
    #[error("engine is not running")]
    NotRunning,

    /// The engine thread did not exit within the shutdown timeout.
    #[error("engine thread did not stop within {0:?}")]
    ShutdownTimeout(Duration),
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ValidationIssue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Engine timing and capacity limits, fixed at `enable`.
#[derive(Debug, Clone)]
pub struct EngineRuntimeConfig {
    /// Fixed pipeline sample rate, Hz.
    pub sample_rate_hz: f32,
    /// Upper bound on fixed steps per polled frame.
    pub max_steps_per_frame: u32,
    /// Per-component bound on one step's assisted delta, vpx.
    pub max_delta_per_step: f32,
    /// Bounded input queue capacity; overflow drops events.
    pub input_queue_capacity: usize,
    /// Bounded injection queue capacity; overflow drops deltas.
    pub injection_queue_capacity: usize,
    /// Engine loop poll interval.
    pub poll_interval: Duration,
}

impl Default for EngineRuntimeConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: steadypoint_pipeline::SAMPLE_RATE_HZ,
            max_steps_per_frame: 4,
            max_delta_per_step: safety::MAX_DELTA_PER_STEP,
            input_queue_capacity: 1024,
            injection_queue_capacity: 256,
            poll_interval: Duration::from_millis(1),
        }
    }
}

/// Telemetry snapshot returned by [`Engine::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Fixed steps executed.
    pub steps: u64,
    /// Accumulator overruns.
    pub overruns: u64,
    /// Raw input events dropped on queue overflow.
    pub dropped_input_events: u64,
    /// Assisted deltas enqueued for injection.
    pub injected_deltas: u64,
    /// Assisted deltas dropped on injection queue overflow.
    pub dropped_injections: u64,
    /// Config swaps applied at frame boundaries.
    pub config_swaps: u64,
    /// Emergency stops triggered.
    pub emergency_stops: u64,
    /// Running determinism hash after the most recent step.
    pub hash: u64,
    /// Engine-owned virtual cursor as of the last frame.
    pub cursor: CursorState,
}

/// State shared between the control plane and the engine thread.
struct Shared {
    running: AtomicBool,
    emergency: AtomicBool,
    input_queue: ArrayQueue<RawInputEvent>,
    injection_queue: ArrayQueue<AssistedDelta>,
    pending_config: AtomicCell<Option<AssistiveConfig>>,
    pending_profile: AtomicCell<Option<MotorProfile>>,
    targets: Mutex<Vec<TargetInfo>>,
    echo: EchoRing,
    counters: AtomicCounters,
    cursor: AtomicCell<CursorState>,
    last_hash: AtomicU64,
}

/// The assistive runtime: control-plane handle plus the engine thread.
pub struct Engine {
    runtime_config: EngineRuntimeConfig,
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
    epoch: Instant,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("running", &self.is_running())
            .field("runtime_config", &self.runtime_config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine with the given limits. Queues and the echo ring
    /// are preallocated here; nothing allocates after `enable`.
    #[must_use]
    pub fn new(runtime_config: EngineRuntimeConfig) -> Self {
        let shared = Arc::new(Shared {
            running: AtomicBool::new(false),
            emergency: AtomicBool::new(false),
            input_queue: ArrayQueue::new(runtime_config.input_queue_capacity),
            injection_queue: ArrayQueue::new(runtime_config.injection_queue_capacity),
            pending_config: AtomicCell::new(None),
            pending_profile: AtomicCell::new(None),
            targets: Mutex::new(Vec::new()),
            echo: EchoRing::new(),
            counters: AtomicCounters::new(),
            cursor: AtomicCell::new(CursorState::default()),
            last_hash: AtomicU64::new(steadypoint_pipeline::FNV_OFFSET_BASIS),
        });
        Self {
            runtime_config,
            shared,
            thread: None,
            epoch: Instant::now(),
        }
    }

    /// Validate a config and start the engine thread with the cursor at
    /// the given origin.
    pub fn enable(
        &mut self,
        config: AssistiveConfig,
        origin_x: f32,
        origin_y: f32,
    ) -> Result<(), EngineError> {
        if self.is_running() {
            return Err(EngineError::AlreadyRunning);
        }
        validate_config(&config).map_err(EngineError::InvalidConfig)?;

        self.shared.emergency.store(false, Ordering::Release);
        self.shared.pending_config.store(Some(config));
        self.shared.cursor.store(CursorState::at(origin_x, origin_y));
        self.shared.running.store(true, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let runtime_config = self.runtime_config.clone();
        let epoch = self.epoch;
        self.thread = Some(std::thread::spawn(move || {
            engine_thread_main(&shared, &runtime_config, epoch);
        }));
        info!(origin_x, origin_y, "engine enabled");
        Ok(())
    }

    /// Request a cooperative stop and join the engine thread.
    pub fn disable(&mut self) -> Result<(), EngineError> {
        let Some(handle) = self.thread.take() else {
            return Err(EngineError::NotRunning);
        };
        self.shared.running.store(false, Ordering::Release);

        let deadline = Instant::now() + SHUTDOWN_TIMEOUT;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                self.thread = Some(handle);
                return Err(EngineError::ShutdownTimeout(SHUTDOWN_TIMEOUT));
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        let _joined = handle.join();
        info!("engine disabled");
        Ok(())
    }

    /// Halt the loop, drain both queues, reset pipeline and cursor state,
    /// clear the echo ring and drop active and pending config.
    ///
    /// Safe to call from any thread; acted on at the next loop iteration.
    pub fn emergency_stop(&self) {
        warn!("emergency stop requested");
        self.shared.counters.inc_emergency_stop();
        self.shared.emergency.store(true, Ordering::Release);
        self.shared.running.store(false, Ordering::Release);
    }

    /// Validate and stage a config; the engine thread swaps it in at the
    /// next frame boundary.
    pub fn update_config(&self, config: AssistiveConfig) -> Result<(), EngineError> {
        validate_config(&config).map_err(EngineError::InvalidConfig)?;
        self.shared.pending_config.store(Some(config));
        Ok(())
    }

    /// Stage a motor profile for the pipeline context.
    pub fn update_profile(&self, profile: MotorProfile) {
        self.shared.pending_profile.store(Some(profile));
    }

    /// Replace the target snapshot used by the magnetism stage.
    pub fn update_targets(&self, targets: Vec<TargetInfo>) {
        *self.shared.targets.lock() = targets;
    }

    /// Capture-side entry point: push one raw input event.
    ///
    /// Never blocks. Returns `false` when the queue is full and the event
    /// was dropped (counted, preferable to unbounded growth).
    pub fn push_raw_input(&self, event: RawInputEvent) -> bool {
        if self.shared.input_queue.push(event).is_err() {
            self.shared.counters.inc_dropped_input();
            return false;
        }
        true
    }

    /// Injection-side entry point: pop the next assisted delta, FIFO.
    pub fn pop_assisted(&self) -> Option<AssistedDelta> {
        self.shared.injection_queue.pop()
    }

    /// Capture-side echo query: true iff the engine recently injected a
    /// matching delta (see the echo ring contract).
    #[must_use]
    pub fn was_recently_injected(&self, dx: f32, dy: f32, now_ns: u64) -> bool {
        self.shared.echo.was_recently_injected(dx, dy, now_ns)
    }

    /// Monotonic nanoseconds since engine creation, for echo queries.
    #[must_use]
    pub fn now_ns(&self) -> u64 {
        monotonic_ns_since(self.epoch, Instant::now())
    }

    /// Whether the engine thread is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
            && self.shared.running.load(Ordering::Acquire)
    }

    /// Telemetry snapshot.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        let CounterSnapshot {
            steps,
            overruns,
            dropped_input_events,
            injected_deltas,
            dropped_injections,
            config_swaps,
            emergency_stops,
        } = self.shared.counters.snapshot();
        EngineStats {
            steps,
            overruns,
            dropped_input_events,
            injected_deltas,
            dropped_injections,
            config_swaps,
            emergency_stops,
            hash: self.shared.last_hash.load(Ordering::Relaxed),
            cursor: self.shared.cursor.load(),
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _stopped = self.disable();
        }
    }
}

fn monotonic_ns_since(epoch: Instant, now: Instant) -> u64 {
    now.saturating_duration_since(epoch).as_nanos() as u64
}

/// Aggregate of one frame's drained input.
#[derive(Debug, Clone, Copy, Default)]
struct FrameInput {
    dx: f32,
    dy: f32,
    primary_down: bool,
    secondary_down: bool,
}

/// Drain the input queue: deltas sum, button state is last-wins.
fn drain_input(queue: &ArrayQueue<RawInputEvent>, previous: &CursorState) -> FrameInput {
    let mut frame = FrameInput {
        primary_down: previous.primary_down,
        secondary_down: previous.secondary_down,
        ..FrameInput::default()
    };
    while let Some(event) = queue.pop() {
        frame.dx += event.dx;
        frame.dy += event.dy;
        frame.primary_down = event.primary_down;
        frame.secondary_down = event.secondary_down;
    }
    frame
}

fn engine_thread_main(shared: &Shared, runtime_config: &EngineRuntimeConfig, epoch: Instant) {
    info!("engine thread started");

    let stepper_config = StepperConfig {
        sample_rate_hz: runtime_config.sample_rate_hz,
        max_steps_per_frame: runtime_config.max_steps_per_frame,
    };
    let mut stepper = DeterministicStepper::with_config(Pipeline::canonical(), stepper_config);
    let dt = f64::from(stepper.fixed_dt());

    let mut active_config: Option<AssistiveConfig> = None;
    let mut active_profile: Option<MotorProfile> = None;
    let mut cursor = shared.cursor.load();
    // Raw position integrates raw deltas; the pipeline reads it as
    // authoritative input while the cursor tracks clamped output.
    let mut raw_x = cursor.x;
    let mut raw_y = cursor.y;
    let mut accumulator_s = 0.0f64;
    let mut targets_snapshot: Vec<TargetInfo> = Vec::new();
    let mut last_instant = Instant::now();

    while shared.running.load(Ordering::Acquire) {
        std::thread::sleep(runtime_config.poll_interval);

        let now = Instant::now();
        accumulator_s += now.duration_since(last_instant).as_secs_f64();
        last_instant = now;

        // Frame boundary: swap pending config through the runtime clamp.
        if let Some(mut config) = shared.pending_config.take() {
            safety::clamp_config(&mut config);
            debug!(policy_version = config.policy_version, "config swapped");
            active_config = Some(config);
            shared.counters.inc_config_swap();
        }
        if let Some(profile) = shared.pending_profile.take() {
            active_profile = Some(profile);
        }

        // Refresh the target snapshot without blocking the control plane.
        if let Some(targets) = shared.targets.try_lock() {
            targets_snapshot.clone_from(&targets);
        }

        let frame = drain_input(&shared.input_queue, &cursor);
        cursor.primary_down = frame.primary_down;
        cursor.secondary_down = frame.secondary_down;

        let mut steps_this_frame: u32 = 0;
        while accumulator_s >= dt && steps_this_frame < runtime_config.max_steps_per_frame {
            // The aggregated delta rides the first step of the frame only.
            let (dx, dy) = if steps_this_frame == 0 {
                (frame.dx, frame.dy)
            } else {
                (0.0, 0.0)
            };
            raw_x += dx;
            raw_y += dy;

            let mut sample = InputSample::new(raw_x, raw_y, dx, dy);
            sample.primary_down = frame.primary_down;
            sample.secondary_down = frame.secondary_down;

            let ctx = TransformContext {
                step_index: stepper.step_index(),
                dt: stepper.fixed_dt(),
                targets: &targets_snapshot,
                config: active_config.as_ref(),
                profile: active_profile.as_ref(),
            };
            let result = stepper.fixed_step(sample, &ctx);
            shared.counters.inc_step();
            shared.last_hash.store(result.hash, Ordering::Relaxed);

            let dx_assist = clamp_step_delta(
                result.sample.x - cursor.x,
                runtime_config.max_delta_per_step,
            );
            let dy_assist = clamp_step_delta(
                result.sample.y - cursor.y,
                runtime_config.max_delta_per_step,
            );
            cursor.x += dx_assist;
            cursor.y += dy_assist;
            cursor.vx = dx_assist * runtime_config.sample_rate_hz;
            cursor.vy = dy_assist * runtime_config.sample_rate_hz;

            if dx_assist.abs() > EMIT_THRESHOLD || dy_assist.abs() > EMIT_THRESHOLD {
                let delta = AssistedDelta {
                    dx: dx_assist,
                    dy: dy_assist,
                    step_index: result.step_index,
                };
                shared.echo.record(dx_assist, dy_assist, monotonic_ns_since(epoch, now));
                if shared.injection_queue.push(delta).is_err() {
                    shared.counters.inc_dropped_injection();
                } else {
                    shared.counters.inc_injected();
                }
            }

            accumulator_s -= dt;
            steps_this_frame += 1;
        }

        if accumulator_s > dt {
            accumulator_s = dt;
            shared.counters.inc_overrun();
        }

        shared.cursor.store(cursor);
    }

    if shared.emergency.swap(false, Ordering::AcqRel) {
        // Emergency teardown: nothing survives into the next enable.
        while shared.input_queue.pop().is_some() {}
        while shared.injection_queue.pop().is_some() {}
        stepper.reset();
        shared.echo.clear();
        shared.pending_config.store(None);
        shared.pending_profile.store(None);
        shared.cursor.store(CursorState::default());
        shared.last_hash.store(steadypoint_pipeline::FNV_OFFSET_BASIS, Ordering::Relaxed);
        warn!("engine thread stopped by emergency stop");
    } else {
        info!("engine thread stopped");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;
    use steadypoint_schemas::ProfileId;

    fn passthrough() -> AssistiveConfig {
        AssistiveConfig::passthrough(ProfileId::new("engine-test").unwrap())
    }

    #[test]
    fn test_enable_rejects_invalid_config() {
        let mut engine = Engine::new(EngineRuntimeConfig::default());
        let mut config = passthrough();
        config.deadzone_radius = 99.0;

        match engine.enable(config, 0.0, 0.0) {
            Err(EngineError::InvalidConfig(issues)) => {
                assert!(issues.iter().any(|i| i.field == "deadzone_radius"));
            }
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
        assert!(!engine.is_running());
    }

    #[test]
    fn test_disable_without_enable_errors() {
        let mut engine = Engine::new(EngineRuntimeConfig::default());
        assert!(matches!(engine.disable(), Err(EngineError::NotRunning)));
    }

    #[test]
    fn test_push_raw_input_drops_on_overflow() {
        let engine = Engine::new(EngineRuntimeConfig {
            input_queue_capacity: 2,
            ..EngineRuntimeConfig::default()
        });
        let event = RawInputEvent {
            dx: 1.0,
            dy: 0.0,
            primary_down: false,
            secondary_down: false,
            host_ticks: 1,
        };
        assert!(engine.push_raw_input(event));
        assert!(engine.push_raw_input(event));
        assert!(!engine.push_raw_input(event));
        assert_eq!(engine.stats().dropped_input_events, 1);
    }

    #[test]
    fn test_drain_input_sums_deltas_last_wins_buttons() {
        let queue = ArrayQueue::new(8);
        let mk = |dx: f32, primary: bool| RawInputEvent {
            dx,
            dy: dx * 2.0,
            primary_down: primary,
            secondary_down: !primary,
            host_ticks: 0,
        };
        queue.push(mk(1.0, true)).unwrap();
        queue.push(mk(2.0, false)).unwrap();
        queue.push(mk(3.0, true)).unwrap();

        let frame = drain_input(&queue, &CursorState::default());
        assert!((frame.dx - 6.0).abs() < 1e-6);
        assert!((frame.dy - 12.0).abs() < 1e-6);
        assert!(frame.primary_down, "button state must be last-wins");
        assert!(!frame.secondary_down);
    }

    #[test]
    fn test_drain_input_empty_keeps_previous_buttons() {
        let queue: ArrayQueue<RawInputEvent> = ArrayQueue::new(4);
        let previous = CursorState {
            primary_down: true,
            ..CursorState::default()
        };

        let frame = drain_input(&queue, &previous);
        assert!(frame.primary_down);
        assert_eq!(frame.dx, 0.0);
    }

    #[test]
    fn test_update_config_rejects_invalid() {
        let engine = Engine::new(EngineRuntimeConfig::default());
        let mut config = passthrough();
        config.smoothing_strength = 2.0;
        assert!(matches!(
            engine.update_config(config),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_stats_start_clean() {
        let engine = Engine::new(EngineRuntimeConfig::default());
        let stats = engine.stats();
        assert_eq!(stats.steps, 0);
        assert_eq!(stats.hash, steadypoint_pipeline::FNV_OFFSET_BASIS);
        assert_eq!(stats.cursor, CursorState::default());
    }
}
