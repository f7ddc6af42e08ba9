//! Trace ingest: estimate a motor profile from recorded pointer traffic
//!
//! A deliberately small estimator set — enough to drive the policy mapper
//! end to end. Tremor amplitude is the RMS residual around a short moving
//! average, tremor frequency comes from the residual's zero-crossing rate,
//! path efficiency is net displacement over path length, and the overshoot
//! rate counts velocity reversals per detected movement.

use anyhow::{Context, Result, bail};
use std::io::BufReader;
use std::path::Path;
use steadypoint_schemas::{MotorProfile, ProfileId, config_to_json, profile_to_json};
use steadypoint_trace::{Trace, TraceTick, read_trace};
use tracing::info;

/// Moving-average window for detrending deltas, in ticks.
const DETREND_WINDOW: usize = 5;

/// Speeds below this are treated as a pause between movements, vpx/step.
const PAUSE_SPEED: f32 = 0.1;

/// Estimated metrics, before being stamped into a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TraceMetrics {
    tremor_amplitude_vpx: f32,
    tremor_frequency_hz: f32,
    path_efficiency: f32,
    overshoot_rate: f32,
    mean_movement_time_s: f32,
    measurement_duration_s: f32,
}

fn moving_average(values: &[f32], index: usize) -> f32 {
    let start = index.saturating_sub(DETREND_WINDOW / 2);
    let end = (index + DETREND_WINDOW / 2 + 1).min(values.len());
    let span = &values[start..end];
    span.iter().sum::<f32>() / span.len() as f32
}

fn estimate(ticks: &[TraceTick], sample_rate_hz: f32) -> TraceMetrics {
    let dx: Vec<f32> = ticks.iter().map(|t| t.dx).collect();
    let dy: Vec<f32> = ticks.iter().map(|t| t.dy).collect();
    let n = ticks.len();

    // Residual around the local trend carries the tremor component.
    let mut residual_sq_sum = 0.0f32;
    let mut residual_x = Vec::with_capacity(n);
    for i in 0..n {
        let rx = dx[i] - moving_average(&dx, i);
        let ry = dy[i] - moving_average(&dy, i);
        residual_sq_sum += rx * rx + ry * ry;
        residual_x.push(rx);
    }
    let tremor_amplitude_vpx = (residual_sq_sum / n.max(1) as f32).sqrt();

    // Zero-crossing rate of the residual approximates the dominant
    // oscillation frequency: one full cycle per two crossings.
    let mut crossings = 0u32;
    for pair in residual_x.windows(2) {
        if pair[0] != 0.0 && pair[1] != 0.0 && (pair[0] < 0.0) != (pair[1] < 0.0) {
            crossings += 1;
        }
    }
    let duration_s = n as f32 / sample_rate_hz;
    let tremor_frequency_hz = if duration_s > 0.0 && tremor_amplitude_vpx > 0.05 {
        crossings as f32 / 2.0 / duration_s
    } else {
        0.0
    };

    // Path efficiency: net displacement over traveled length.
    let mut path_length = 0.0f32;
    let mut net_x = 0.0f32;
    let mut net_y = 0.0f32;
    for i in 0..n {
        path_length += (dx[i] * dx[i] + dy[i] * dy[i]).sqrt();
        net_x += dx[i];
        net_y += dy[i];
    }
    let net = (net_x * net_x + net_y * net_y).sqrt();
    let path_efficiency = if path_length > 0.0 {
        (net / path_length).clamp(0.0, 1.0)
    } else {
        1.0
    };

    // Movement segmentation by pause detection, reversal counting within.
    let mut movements = 0u32;
    let mut moving = false;
    let mut reversals = 0u32;
    for i in 0..n {
        let speed = (dx[i] * dx[i] + dy[i] * dy[i]).sqrt();
        if speed > PAUSE_SPEED {
            if !moving {
                movements += 1;
                moving = true;
            }
            if i > 0 {
                let dot = dx[i] * dx[i - 1] + dy[i] * dy[i - 1];
                if dot < 0.0 {
                    reversals += 1;
                }
            }
        } else {
            moving = false;
        }
    }
    let movements = movements.max(1);
    let overshoot_rate = reversals as f32 / movements as f32;
    let mean_movement_time_s = duration_s / movements as f32;

    TraceMetrics {
        tremor_amplitude_vpx,
        tremor_frequency_hz,
        path_efficiency,
        overshoot_rate,
        mean_movement_time_s,
        measurement_duration_s: duration_s,
    }
}

fn build_profile(metrics: TraceMetrics, profile_id: ProfileId) -> MotorProfile {
    MotorProfile {
        profile_id,
        tremor_frequency_hz: metrics.tremor_frequency_hz,
        tremor_amplitude_vpx: metrics.tremor_amplitude_vpx,
        path_efficiency: metrics.path_efficiency,
        overshoot_rate: metrics.overshoot_rate,
        mean_movement_time_s: metrics.mean_movement_time_s,
        measurement_duration_s: metrics.measurement_duration_s,
        schema_version: steadypoint_schemas::PROFILE_SCHEMA_VERSION,
    }
}

/// Run trace ingest.
pub fn ingest(
    trace_path: &Path,
    out: Option<&Path>,
    emit_config: Option<&Path>,
    profile_id: &str,
) -> Result<()> {
    let file = std::fs::File::open(trace_path)
        .with_context(|| format!("opening trace {}", trace_path.display()))?;
    let trace: Trace = read_trace(BufReader::new(file))
        .with_context(|| format!("reading trace {}", trace_path.display()))?;
    if trace.ticks.is_empty() {
        bail!("trace {} has no tick records", trace_path.display());
    }
    if trace.skipped_lines > 0 {
        info!(skipped = trace.skipped_lines, "skipped malformed trace lines");
    }

    let profile_id = ProfileId::new(profile_id)
        .with_context(|| format!("invalid profile id {profile_id:?}"))?;
    let metrics = estimate(&trace.ticks, trace.header.sample_rate_hz as f32);
    let profile = build_profile(metrics, profile_id);
    info!(
        amplitude = profile.tremor_amplitude_vpx,
        frequency = profile.tremor_frequency_hz,
        efficiency = profile.path_efficiency,
        "profile estimated"
    );

    let profile_json = profile_to_json(&profile).context("encoding profile")?;
    match out {
        Some(path) => std::fs::write(path, &profile_json)
            .with_context(|| format!("writing profile {}", path.display()))?,
        None => println!("{profile_json}"),
    }

    if let Some(config_path) = emit_config {
        let config = steadypoint_policy::map_profile(&profile);
        let config_json = config_to_json(&config).context("encoding config")?;
        std::fs::write(config_path, config_json)
            .with_context(|| format!("writing config {}", config_path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn tick(index: u32, dx: f32, dy: f32) -> TraceTick {
        TraceTick {
            tick: index,
            x: 0.0,
            y: 0.0,
            dx,
            dy,
            buttons: 0,
        }
    }

    #[test]
    fn test_straight_line_is_fully_efficient() {
        let ticks: Vec<TraceTick> = (0..120).map(|i| tick(i, 2.0, 0.0)).collect();
        let metrics = estimate(&ticks, 60.0);
        assert!((metrics.path_efficiency - 1.0).abs() < 1e-4);
        assert!(metrics.tremor_amplitude_vpx < 0.1);
        assert_eq!(metrics.tremor_frequency_hz, 0.0);
    }

    #[test]
    fn test_sinusoidal_tremor_is_detected_near_its_frequency() {
        // 2 vpx/step drift plus an 8 Hz oscillation at 60 Hz sampling
        let ticks: Vec<TraceTick> = (0..600)
            .map(|i| {
                let t = i as f32 / 60.0;
                let tremor = 3.0 * (TAU * 8.0 * t).sin();
                tick(i, 2.0 + tremor, 0.0)
            })
            .collect();
        let metrics = estimate(&ticks, 60.0);
        assert!(metrics.tremor_amplitude_vpx > 0.5);
        assert!(
            (metrics.tremor_frequency_hz - 8.0).abs() < 2.0,
            "estimated {} Hz",
            metrics.tremor_frequency_hz
        );
        assert!(metrics.path_efficiency < 1.0);
    }

    #[test]
    fn test_back_and_forth_lowers_efficiency_and_counts_reversals() {
        let ticks: Vec<TraceTick> = (0..200)
            .map(|i| tick(i, if (i / 20) % 2 == 0 { 3.0 } else { -3.0 }, 0.0))
            .collect();
        let metrics = estimate(&ticks, 60.0);
        assert!(metrics.path_efficiency < 0.2);
        assert!(metrics.overshoot_rate > 0.0);
    }

    #[test]
    fn test_duration_and_movement_time() {
        let ticks: Vec<TraceTick> = (0..300).map(|i| tick(i, 1.0, 0.0)).collect();
        let metrics = estimate(&ticks, 60.0);
        assert!((metrics.measurement_duration_s - 5.0).abs() < 1e-4);
        // One continuous movement
        assert!((metrics.mean_movement_time_s - 5.0).abs() < 1e-4);
    }
}
