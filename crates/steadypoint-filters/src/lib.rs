//! RT-Safe Transform Stages for SteadyPoint
//!
//! This crate provides the real-time safe transform stages of the assistive
//! cursor pipeline. All stages operate at the 60 Hz fixed step rate with
//! strict timing requirements.
//!
//! # Overview
//!
//! The stage set, in canonical pipeline order:
//! - **Deadzone**: soft magnitude-domain compression of small deltas
//! - **Smoothing**: velocity-adaptive single-pole IIR low-pass
//! - **Phase Compensation**: feed-forward projection against filter lag
//! - **Intent**: hysteretic directional-intent boost from velocity coherence
//! - **Magnetism**: hysteretic attraction toward the nearest UI target
//!
//! # RT Safety Guarantees
//!
//! All stage implementations are RT-safe:
//! - No heap allocations in stage hot paths (the magnetism lock id reuses
//!   a preallocated buffer; growth only on first lock of a longer id)
//! - O(1) time complexity per stage (magnetism is O(targets))
//! - Bounded execution time
//! - No syscalls or I/O in stage functions
//! - All scalar state types are `#[repr(C)]` for stable ABI
//!
//! # Determinism
//!
//! Stage math is 32-bit IEEE-754 throughout; no wall-clock reads, no RNG,
//! no platform-dependent math. The same input stream through the same
//! stages yields bit-identical output on every host.
//!
//! # Example
//!
//! ```
//! use steadypoint_filters::prelude::*;
//! use steadypoint_schemas::prelude::*;
//!
//! let pid = ProfileId::new("demo").unwrap();
//! let config = AssistiveConfig::passthrough(pid);
//! let ctx = TransformContext::with_config(0, 1.0 / 60.0, &config);
//!
//! let mut state = DeadzoneState::default();
//! let mut sample = InputSample::new(100.0, 100.0, 1.0, 0.0);
//!
//! // In the fixed-step loop (60 Hz):
//! deadzone_filter(&mut sample, &mut state, &ctx);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod deadzone;
pub mod intent;
pub mod magnetism;
pub mod phase;
pub mod prelude;
pub mod smoothing;

pub use deadzone::{DeadzoneState, deadzone_filter};
pub use intent::{IntentState, intent_filter};
pub use magnetism::{MagnetismState, magnetism_filter};
pub use phase::phase_compensation_filter;
pub use smoothing::{SmoothingState, smoothing_filter};

/// Fixed pipeline sample rate in Hz.
pub const SAMPLE_RATE_HZ: f32 = 60.0;

/// Fixed timestep in seconds (one pipeline step).
pub const FIXED_DT: f32 = 1.0 / SAMPLE_RATE_HZ;
