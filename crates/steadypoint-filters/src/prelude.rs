//! Prelude for convenient stage imports
//!
//! ```
//! use steadypoint_filters::prelude::*;
//! ```

pub use crate::deadzone::{DeadzoneState, deadzone_filter};
pub use crate::intent::{IntentState, intent_filter};
pub use crate::magnetism::{MagnetismState, magnetism_filter};
pub use crate::phase::phase_compensation_filter;
pub use crate::smoothing::{SmoothingState, smoothing_filter};
pub use crate::{FIXED_DT, SAMPLE_RATE_HZ};
