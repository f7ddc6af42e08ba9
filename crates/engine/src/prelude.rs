//! Prelude for engine consumers
//!
//! ```
//! use steadypoint_engine::prelude::*;
//! ```

pub use crate::engine::{Engine, EngineError, EngineRuntimeConfig, EngineStats};
pub use crate::replay::{ReplayReport, replay_events, replay_events_with_targets};
pub use crate::safety::{INJECTION_TAG, clamp_config, clamp_step_delta};
