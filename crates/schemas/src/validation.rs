//! Config validation at schema boundaries
//!
//! Validation rejects a config wholesale: a document either satisfies every
//! constraint or is refused with the full list of field-scoped diagnostics.
//! Partial application never happens. The runtime layer keeps its own
//! narrower clamp as defense in depth for anything that bypasses this
//! boundary.

use crate::entities::AssistiveConfig;
use std::fmt;

/// One field-scoped validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Config schema key the diagnostic applies to.
    pub field: &'static str,
    /// Human-readable constraint violation.
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn require_range(
    issues: &mut Vec<ValidationIssue>,
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
) {
    if !value.is_finite() || value < min || value > max {
        issues.push(ValidationIssue {
            field,
            message: format!("{value} outside [{min}, {max}]"),
        });
    }
}

fn require_at_least(issues: &mut Vec<ValidationIssue>, field: &'static str, value: f32, min: f32) {
    if !value.is_finite() || value < min {
        issues.push(ValidationIssue {
            field,
            message: format!("{value} must be >= {min}"),
        });
    }
}

/// Validate every constraint of the config schema.
///
/// Returns all diagnostics at once so a caller can surface the complete
/// problem set in one round trip.
pub fn validate_config(config: &AssistiveConfig) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    require_range(&mut issues, "smoothing_strength", config.smoothing_strength, 0.0, 1.0);
    require_range(&mut issues, "smoothing_min_alpha", config.smoothing_min_alpha, 0.05, 1.0);
    require_range(&mut issues, "smoothing_max_alpha", config.smoothing_max_alpha, 0.05, 1.0);
    if config.smoothing_min_alpha > config.smoothing_max_alpha {
        issues.push(ValidationIssue {
            field: "smoothing_min_alpha",
            message: format!(
                "{} must be <= smoothing_max_alpha ({})",
                config.smoothing_min_alpha, config.smoothing_max_alpha
            ),
        });
    }

    require_at_least(&mut issues, "smoothing_velocity_low", config.smoothing_velocity_low, 0.0);
    if !config.smoothing_velocity_high.is_finite() || config.smoothing_velocity_high <= 0.0 {
        issues.push(ValidationIssue {
            field: "smoothing_velocity_high",
            message: format!("{} must be > 0", config.smoothing_velocity_high),
        });
    }
    if config.smoothing_velocity_low >= config.smoothing_velocity_high {
        issues.push(ValidationIssue {
            field: "smoothing_velocity_low",
            message: format!(
                "{} must be < smoothing_velocity_high ({})",
                config.smoothing_velocity_low, config.smoothing_velocity_high
            ),
        });
    }

    require_range(&mut issues, "deadzone_radius", config.deadzone_radius, 0.0, 3.0);
    require_range(
        &mut issues,
        "phase_compensation_gain_s",
        config.phase_compensation_gain_s,
        0.0,
        0.1,
    );

    require_range(&mut issues, "intent_boost_strength", config.intent_boost_strength, 0.0, 1.0);
    require_range(
        &mut issues,
        "intent_coherence_threshold",
        config.intent_coherence_threshold,
        0.5,
        1.0,
    );
    require_range(
        &mut issues,
        "intent_disengage_threshold",
        config.intent_disengage_threshold,
        0.3,
        1.0,
    );
    if config.intent_disengage_threshold > config.intent_coherence_threshold {
        issues.push(ValidationIssue {
            field: "intent_disengage_threshold",
            message: format!(
                "{} must be <= intent_coherence_threshold ({})",
                config.intent_disengage_threshold, config.intent_coherence_threshold
            ),
        });
    }

    require_range(&mut issues, "magnetism_strength", config.magnetism_strength, 0.0, 1.0);
    require_at_least(&mut issues, "magnetism_radius", config.magnetism_radius, 0.0);
    require_at_least(&mut issues, "magnetism_hysteresis", config.magnetism_hysteresis, 0.0);
    require_at_least(&mut issues, "magnetism_snap_radius", config.magnetism_snap_radius, 0.0);

    require_range(&mut issues, "edge_resistance", config.edge_resistance, 0.0, 1.0);
    require_range(&mut issues, "prediction_horizon_s", config.prediction_horizon_s, 0.0, 1.0);

    if config.source_profile_id.as_str().is_empty() {
        issues.push(ValidationIssue {
            field: "source_profile_id",
            message: "must be non-empty".to_string(),
        });
    }

    if issues.is_empty() { Ok(()) } else { Err(issues) }
}
