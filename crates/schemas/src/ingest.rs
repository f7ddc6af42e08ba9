//! Versioned JSON ingest for config and profile documents
//!
//! Config documents carry an explicit `schema_version`. Ingest is
//! multi-version: every supported version is upgraded to the current shape
//! before deserialization, then validated. A document that fails any
//! constraint is rejected whole with its diagnostics (never partially
//! applied).

use crate::entities::{AssistiveConfig, MotorProfile};
use crate::validation::{ValidationIssue, validate_config};
use thiserror::Error;

/// Current config document schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 2;

/// Current motor profile document schema version.
pub const PROFILE_SCHEMA_VERSION: u32 = 1;

/// Disengage threshold assumed for v1 documents that predate the field.
const V1_DEFAULT_DISENGAGE_THRESHOLD: f64 = 0.65;

pub(crate) fn default_config_schema_version() -> u32 {
    CONFIG_SCHEMA_VERSION
}

/// Errors surfaced by document ingest.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Document was not parseable JSON or did not match the schema shape.
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Document declared a schema version this build cannot ingest.
    #[error("unsupported schema version {found} (supported: 1..={supported})")]
    UnsupportedVersion {
        /// Version declared by the document.
        found: u32,
        /// Newest version this build understands.
        supported: u32,
    },

    /// Document parsed but violated validation constraints.
    #[error("invalid config: {}", format_issues(.0))]
    Invalid(Vec<ValidationIssue>),
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ValidationIssue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse, upgrade and validate an [`AssistiveConfig`] JSON document.
pub fn config_from_json(json: &str) -> Result<AssistiveConfig, IngestError> {
    let mut doc: serde_json::Value = serde_json::from_str(json)?;

    let version = doc
        .get("schema_version")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(u64::from(CONFIG_SCHEMA_VERSION)) as u32;

    if version == 0 || version > CONFIG_SCHEMA_VERSION {
        return Err(IngestError::UnsupportedVersion {
            found: version,
            supported: CONFIG_SCHEMA_VERSION,
        });
    }

    if version < 2
        && let Some(obj) = doc.as_object_mut()
        && !obj.contains_key("intent_disengage_threshold")
    {
        obj.insert(
            "intent_disengage_threshold".to_string(),
            serde_json::Value::from(V1_DEFAULT_DISENGAGE_THRESHOLD),
        );
    }

    let mut config: AssistiveConfig = serde_json::from_value(doc)?;
    config.schema_version = CONFIG_SCHEMA_VERSION;

    validate_config(&config).map_err(IngestError::Invalid)?;
    Ok(config)
}

/// Serialize a config to its current-version JSON document.
pub fn config_to_json(config: &AssistiveConfig) -> Result<String, IngestError> {
    Ok(serde_json::to_string_pretty(config)?)
}

/// Parse a [`MotorProfile`] JSON document.
pub fn profile_from_json(json: &str) -> Result<MotorProfile, IngestError> {
    let profile: MotorProfile = serde_json::from_str(json)?;
    if profile.schema_version > PROFILE_SCHEMA_VERSION {
        return Err(IngestError::UnsupportedVersion {
            found: profile.schema_version,
            supported: PROFILE_SCHEMA_VERSION,
        });
    }
    Ok(profile)
}

/// Serialize a profile to its current-version JSON document.
pub fn profile_to_json(profile: &MotorProfile) -> Result<String, IngestError> {
    Ok(serde_json::to_string_pretty(profile)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::domain::ProfileId;

    fn valid_config() -> AssistiveConfig {
        let pid = match ProfileId::new("ingest-test") {
            Ok(p) => p,
            Err(e) => panic!("bad id: {e:?}"),
        };
        AssistiveConfig::passthrough(pid)
    }

    #[test]
    fn round_trips_current_version() {
        let cfg = valid_config();
        let json = config_to_json(&cfg).unwrap();
        let back = config_from_json(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn v1_document_defaults_disengage_threshold() {
        let mut doc = serde_json::to_value(valid_config()).unwrap();
        let obj = doc.as_object_mut().unwrap();
        obj.insert("schema_version".into(), 1u32.into());
        obj.remove("intent_disengage_threshold");

        let cfg = config_from_json(&doc.to_string()).unwrap();
        assert!((cfg.intent_disengage_threshold - 0.65).abs() < 1e-6);
        assert_eq!(cfg.schema_version, CONFIG_SCHEMA_VERSION);
    }

    #[test]
    fn v2_document_requires_disengage_threshold() {
        let mut doc = serde_json::to_value(valid_config()).unwrap();
        doc.as_object_mut()
            .unwrap()
            .remove("intent_disengage_threshold");

        assert!(matches!(
            config_from_json(&doc.to_string()),
            Err(IngestError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_future_version() {
        let mut doc = serde_json::to_value(valid_config()).unwrap();
        doc.as_object_mut()
            .unwrap()
            .insert("schema_version".into(), 99u32.into());

        assert!(matches!(
            config_from_json(&doc.to_string()),
            Err(IngestError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn rejects_invalid_values_with_diagnostics() {
        let mut doc = serde_json::to_value(valid_config()).unwrap();
        doc.as_object_mut()
            .unwrap()
            .insert("deadzone_radius".into(), serde_json::Value::from(9.0));

        match config_from_json(&doc.to_string()) {
            Err(IngestError::Invalid(issues)) => {
                assert!(issues.iter().any(|i| i.field == "deadzone_radius"));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            config_from_json("not json at all"),
            Err(IngestError::Malformed(_))
        ));
    }

    #[test]
    fn profile_round_trip() {
        let pid = ProfileId::new("p1").unwrap();
        let profile = MotorProfile {
            tremor_amplitude_vpx: 4.5,
            tremor_frequency_hz: 6.0,
            path_efficiency: 0.72,
            overshoot_rate: 1.2,
            ..MotorProfile::neutral(pid)
        };
        let json = profile_to_json(&profile).unwrap();
        let back = profile_from_json(&json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn profile_without_version_field_deserializes_as_zero() {
        let json = r#"{
            "profile_id": "legacy",
            "tremor_frequency_hz": 0.0,
            "tremor_amplitude_vpx": 0.0,
            "path_efficiency": 1.0,
            "overshoot_rate": 0.0,
            "mean_movement_time_s": 0.0,
            "measurement_duration_s": 0.0
        }"#;
        let profile = profile_from_json(json).unwrap();
        assert_eq!(profile.schema_version, 0);
    }
}
