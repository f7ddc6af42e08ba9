//! SteadyPoint runtime engine
//!
//! Bridges OS pointer input to assisted pipeline output at a fixed 60 Hz
//! cadence. The engine owns the only thread that mutates pipeline state,
//! cursor state and the active config; everything else talks to it through
//! lock-free queues, atomic flags and a single pending-config slot.
//!
//! # Thread model
//!
//! - **Capture thread** (OS-owned): pushes [`RawInputEvent`]s into the
//!   bounded input queue and consults the echo ring; never blocks.
//! - **Engine thread** (owned here): a ~1 ms sleep-polled loop that drains
//!   input, swaps pending config at the frame boundary, runs at most
//!   `max_steps_per_frame` fixed steps, clamps the per-step output and
//!   enqueues assisted deltas.
//! - **Injection thread** (OS-owned): drains the injection queue and emits
//!   tagged synthetic pointer moves.
//! - **Control plane** (any thread): config/profile updates, enable,
//!   disable, emergency stop, stats.
//!
//! [`RawInputEvent`]: steadypoint_schemas::RawInputEvent

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]

pub mod engine;
pub mod prelude;
pub mod replay;
pub mod safety;

pub use engine::{Engine, EngineError, EngineRuntimeConfig, EngineStats};
pub use replay::{ReplayReport, replay_events, replay_events_with_targets};
pub use safety::{INJECTION_TAG, clamp_config, clamp_step_delta};
