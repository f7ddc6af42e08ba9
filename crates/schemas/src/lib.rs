//! Domain schemas for the SteadyPoint assistive cursor pipeline
//!
//! This crate contains the value objects shared by every layer of the
//! system: motor profiles, assistive configs, input samples, targets and
//! per-step results. These are pure domain objects with no dependencies on
//! infrastructure concerns.
//!
//! All numeric fields are 32-bit IEEE-754 floats. This is a compatibility
//! requirement: the determinism hash is computed over the little-endian
//! single-precision encodings of transformed samples, so widening any field
//! would change replay hashes across hosts.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(unused_must_use)]

pub mod domain;
pub mod entities;
pub mod ingest;
pub mod validation;

pub use domain::{DomainError, ProfileId};
pub use entities::{
    AssistedDelta, AssistiveConfig, CursorState, EngineFrameResult, InputSample, MotorProfile,
    RawInputEvent, StepEvents, TargetInfo, TransformContext,
};
pub use ingest::{CONFIG_SCHEMA_VERSION, IngestError, PROFILE_SCHEMA_VERSION, config_from_json,
    config_to_json, profile_from_json, profile_to_json};
pub use validation::{ValidationIssue, validate_config};

/// Commonly used types, glob-importable by downstream crates.
pub mod prelude {
    pub use crate::domain::{DomainError, ProfileId};
    pub use crate::entities::{
        AssistedDelta, AssistiveConfig, CursorState, EngineFrameResult, InputSample, MotorProfile,
        RawInputEvent, StepEvents, TargetInfo, TransformContext,
    };
    pub use crate::ingest::{config_from_json, config_to_json};
    pub use crate::validation::{ValidationIssue, validate_config};
}
