//! Prelude for the atomic primitives
//!
//! ```
//! use steadypoint_atomic::prelude::*;
//! ```

pub use crate::counters::{AtomicCounters, CounterSnapshot};
pub use crate::echo::{ECHO_RING_CAPACITY, ECHO_WINDOW_NS, EchoRing};
