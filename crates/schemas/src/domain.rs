//! Core domain types and value objects
//!
//! Pure domain types that enforce business rules at the type level. Anything
//! that crosses a serialization boundary with an invariant attached gets a
//! validated constructor here.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Domain errors for value object validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Profile identifier was empty or contained non-identifier characters.
    #[error("Invalid profile ID: {0:?} (must be non-empty, alphanumeric with '-' or '_')")]
    InvalidProfileId(String),

    /// A numeric field was outside its documented range.
    #[error("Invalid {field}: {value} (must be in [{min}, {max}])")]
    OutOfRange {
        /// Field name as it appears in the config schema.
        field: &'static str,
        /// Offending value.
        value: f32,
        /// Inclusive lower bound.
        min: f32,
        /// Inclusive upper bound.
        max: f32,
    },
}

/// Stable identifier for a motor profile.
///
/// Profile ids travel through config documents (`source_profile_id`), trace
/// headers and CLI flags, so the character set is restricted to things that
/// survive filenames and JSON unescaped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Create a profile id with validation.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(ProfileId(id))
        } else {
            Err(DomainError::InvalidProfileId(id))
        }
    }

    /// Borrow the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Clamp a value to the unit interval, mapping non-finite input to zero.
#[inline]
pub fn clamp01(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
