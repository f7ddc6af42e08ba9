//! Criterion benchmarks for the transform stages
//!
//! The full chain must stay far under the 60 Hz step interval; these
//! benches track per-stage cost and the composed chain.

#![allow(clippy::expect_used)]

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use steadypoint_filters::prelude::*;
use steadypoint_schemas::prelude::*;

fn bench_config() -> AssistiveConfig {
    let pid = ProfileId::new("bench").expect("static id");
    let mut cfg = AssistiveConfig::passthrough(pid);
    cfg.smoothing_strength = 0.7;
    cfg.deadzone_radius = 1.2;
    cfg.phase_compensation_gain_s = 0.02;
    cfg.intent_boost_strength = 0.5;
    cfg.magnetism_radius = 40.0;
    cfg.magnetism_strength = 0.6;
    cfg
}

fn bench_stages(c: &mut Criterion) {
    let cfg = bench_config();
    let targets = [
        TargetInfo::new("a", 50.0, 50.0, 10.0, 10.0),
        TargetInfo::new("b", 150.0, 80.0, 10.0, 10.0),
        TargetInfo::new("c", 20.0, 200.0, 10.0, 10.0),
    ];

    c.bench_function("smoothing_step", |b| {
        let mut state = SmoothingState::new();
        let ctx = TransformContext::with_config(0, FIXED_DT, &cfg);
        b.iter(|| {
            let mut sample = InputSample::new(10.0, 10.0, 2.0, 1.0);
            smoothing_filter(black_box(&mut sample), &mut state, &ctx);
            sample
        });
    });

    c.bench_function("full_chain_step", |b| {
        let mut deadzone = DeadzoneState::new();
        let mut smoothing = SmoothingState::new();
        let mut intent = IntentState::new();
        let mut magnetism = MagnetismState::new();
        let ctx = TransformContext {
            step_index: 0,
            dt: FIXED_DT,
            targets: &targets,
            config: Some(&cfg),
            profile: None,
        };
        b.iter(|| {
            let mut sample = InputSample::new(48.0, 52.0, 2.0, -1.0);
            deadzone_filter(black_box(&mut sample), &mut deadzone, &ctx);
            smoothing_filter(&mut sample, &mut smoothing, &ctx);
            phase_compensation_filter(&mut sample, &ctx);
            intent_filter(&mut sample, &mut intent, &ctx);
            magnetism_filter(&mut sample, &mut magnetism, &ctx);
            sample
        });
    });
}

criterion_group!(benches, bench_stages);
criterion_main!(benches);
