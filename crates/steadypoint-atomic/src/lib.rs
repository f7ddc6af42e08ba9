//! Lock-free primitives for the SteadyPoint engine hot path
//!
//! This crate provides the atomic building blocks shared between the
//! engine thread and its collaborators:
//!
//! - [`AtomicCounters`]: relaxed `AtomicU64` telemetry counters that can be
//!   incremented from the hot path without allocation or blocking.
//! - [`EchoRing`]: a fixed-size ring of recently injected deltas, readable
//!   from the OS capture thread without taking a lock, used to discard
//!   engine output that echoes back through the input hook.
//!
//! # RT Safety
//!
//! Every operation here is a handful of atomic instructions: no heap
//! allocation, no syscalls, no blocking, bounded execution time.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod counters;
pub mod echo;
pub mod prelude;

pub use counters::{AtomicCounters, CounterSnapshot};
pub use echo::{ECHO_RING_CAPACITY, ECHO_WINDOW_NS, EchoRing};
