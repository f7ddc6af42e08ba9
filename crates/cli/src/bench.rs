//! Deterministic pointing benchmark
//!
//! Synthesizes seeded pointer streams toward each target in a layout file,
//! replays them through the assistive pipeline, and reports per-trial step
//! counts, path metrics and the determinism hash. The same layout, config
//! and seed produce a byte-identical report on every host.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use steadypoint_engine::replay_events_with_targets;
use steadypoint_schemas::{
    AssistiveConfig, ProfileId, RawInputEvent, TargetInfo, config_from_json, profile_from_json,
};
use tracing::info;

/// Arguments for the bench subcommand.
pub struct BenchArgs {
    pub layout: PathBuf,
    pub profile: Option<PathBuf>,
    pub assist: Option<PathBuf>,
    pub trials: u32,
    pub seed: String,
    pub output: Option<PathBuf>,
}

/// Target layout document.
#[derive(Debug, Deserialize)]
struct LayoutFile {
    targets: Vec<TargetInfo>,
}

/// Per-trial benchmark result.
#[derive(Debug, Serialize)]
struct TrialReport {
    trial: u32,
    steps: u64,
    final_hash_hex: String,
    raw_path_length: f32,
    raw_path_efficiency: f32,
}

/// Full benchmark report.
#[derive(Debug, Serialize)]
struct BenchReport {
    layout: String,
    config_source: String,
    seed_hex: String,
    trials: Vec<TrialReport>,
}

/// Deterministic PRNG for stream synthesis; never used by the pipeline.
struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    fn next_unit(&mut self) -> f32 {
        self.next_u32() as f32 / u32::MAX as f32
    }
}

fn parse_seed(seed: &str) -> Result<u32> {
    let trimmed = seed.trim().trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(trimmed, 16).with_context(|| format!("invalid hex seed {seed:?}"))
}

fn load_config(args: &BenchArgs) -> Result<(AssistiveConfig, String)> {
    if let Some(path) = &args.assist {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config =
            config_from_json(&text).with_context(|| format!("parsing config {}", path.display()))?;
        return Ok((config, path.display().to_string()));
    }
    if let Some(path) = &args.profile {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading profile {}", path.display()))?;
        let profile = profile_from_json(&text)
            .with_context(|| format!("parsing profile {}", path.display()))?;
        let config = steadypoint_policy::map_profile(&profile);
        return Ok((config, format!("mapped from {}", path.display())));
    }
    let pid = ProfileId::new("benchmark-passthrough")
        .context("constructing fallback profile id")?;
    Ok((AssistiveConfig::passthrough(pid), "passthrough".to_string()))
}

/// Synthesize one acquisition stream: noisy pointing motion from the
/// current position to each target center in layout order.
fn synthesize_trial(rng: &mut XorShift32, targets: &[TargetInfo]) -> Vec<RawInputEvent> {
    const MAX_STEPS_PER_TARGET: u32 = 240;
    const ARRIVAL_RADIUS: f32 = 2.0;

    let mut events = Vec::new();
    let mut x = 0.0f32;
    let mut y = 0.0f32;
    let mut ticks = 0u64;

    for target in targets {
        for _ in 0..MAX_STEPS_PER_TARGET {
            let to_x = target.center_x - x;
            let to_y = target.center_y - y;
            let distance = (to_x * to_x + to_y * to_y).sqrt();
            if distance <= ARRIVAL_RADIUS {
                break;
            }
            let speed = (distance * 0.2).min(8.0);
            let jitter_x = rng.next_unit() * 2.0 - 1.0;
            let jitter_y = rng.next_unit() * 2.0 - 1.0;
            let dx = to_x / distance * speed + jitter_x;
            let dy = to_y / distance * speed + jitter_y;
            x += dx;
            y += dy;
            ticks += 1;
            events.push(RawInputEvent {
                dx,
                dy,
                primary_down: false,
                secondary_down: false,
                host_ticks: ticks,
            });
        }
    }
    events
}

fn path_metrics(events: &[RawInputEvent]) -> (f32, f32) {
    let mut path_length = 0.0f32;
    let mut net_x = 0.0f32;
    let mut net_y = 0.0f32;
    for event in events {
        path_length += (event.dx * event.dx + event.dy * event.dy).sqrt();
        net_x += event.dx;
        net_y += event.dy;
    }
    let net = (net_x * net_x + net_y * net_y).sqrt();
    let efficiency = if path_length > 0.0 {
        (net / path_length).clamp(0.0, 1.0)
    } else {
        1.0
    };
    (path_length, efficiency)
}

/// Run the benchmark.
pub fn run(args: &BenchArgs) -> Result<()> {
    let layout_text = std::fs::read_to_string(&args.layout)
        .with_context(|| format!("reading layout {}", args.layout.display()))?;
    let layout: LayoutFile = serde_json::from_str(&layout_text)
        .with_context(|| format!("parsing layout {}", args.layout.display()))?;
    if layout.targets.is_empty() {
        bail!("layout {} contains no targets", args.layout.display());
    }
    if args.trials == 0 {
        bail!("--trials must be at least 1");
    }

    let seed = parse_seed(&args.seed)?;
    let (config, config_source) = load_config(args)?;
    info!(targets = layout.targets.len(), trials = args.trials, "benchmark starting");

    let mut trials = Vec::with_capacity(args.trials as usize);
    for trial in 0..args.trials {
        // Decorrelate trials while keeping the run reproducible.
        let mut rng = XorShift32::new(seed ^ (trial.wrapping_mul(0x9E37_79B9)));
        let events = synthesize_trial(&mut rng, &layout.targets);
        let (raw_path_length, raw_path_efficiency) = path_metrics(&events);

        let report = replay_events_with_targets(&events, &config, &layout.targets);
        trials.push(TrialReport {
            trial,
            steps: report.steps,
            final_hash_hex: format!("{:016x}", report.final_hash),
            raw_path_length,
            raw_path_efficiency,
        });
    }

    let report = BenchReport {
        layout: args.layout.display().to_string(),
        config_source,
        seed_hex: format!("{seed:08x}"),
        trials,
    };
    let json = serde_json::to_string_pretty(&report).context("encoding report")?;

    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("writing report {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
