//! Assistive pipeline composition and deterministic stepping
//!
//! This crate composes the transform stages into the canonical pipeline
//! (deadzone -> smoothing -> phase compensation -> intent -> magnetism) and
//! wraps it in the deterministic stepper that owns the step counter and the
//! rolling determinism hash.
//!
//! # Determinism
//!
//! The stepper's fixed-step entry point is the only hash-bearing path.
//! Every transformed sample feeds the 64-bit FNV-1a digest as the
//! little-endian IEEE-754 single encodings of `x` and `y` followed by one
//! byte per button. Two replays of the same input stream with the same
//! config yield the same final hash on every host.
//!
//! # RT Safety
//!
//! - Stage state lives inline in the pipeline (tagged sum, no v-table)
//! - No heap allocations in `fixed_step` / `step`
//! - Bounded catch-up: the wall-clock accumulator runs at most
//!   `max_steps_per_frame` fixed steps per call

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod hash;
pub mod prelude;
pub mod stage;
pub mod stepper;

pub use hash::{DeterminismHash, FNV_OFFSET_BASIS, FNV_PRIME};
pub use stage::{Pipeline, Stage};
pub use stepper::{DeterministicStepper, StepperConfig};

pub use steadypoint_filters::{FIXED_DT, SAMPLE_RATE_HZ};
