//! Prelude for pipeline consumers
//!
//! ```
//! use steadypoint_pipeline::prelude::*;
//! ```

pub use crate::hash::{DeterminismHash, FNV_OFFSET_BASIS, FNV_PRIME};
pub use crate::stage::{Pipeline, Stage};
pub use crate::stepper::{DeterministicStepper, StepperConfig};
pub use crate::{FIXED_DT, SAMPLE_RATE_HZ};
