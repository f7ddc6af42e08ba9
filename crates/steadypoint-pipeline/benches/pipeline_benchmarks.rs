//! Criterion benchmarks for the deterministic stepper
//!
//! Tracks the cost of one fully-enabled fixed step including hashing.

#![allow(clippy::expect_used)]

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use steadypoint_pipeline::prelude::*;
use steadypoint_schemas::prelude::*;

fn bench_fixed_step(c: &mut Criterion) {
    let pid = ProfileId::new("bench").expect("static id");
    let mut cfg = AssistiveConfig::passthrough(pid);
    cfg.smoothing_strength = 0.8;
    cfg.deadzone_radius = 1.5;
    cfg.phase_compensation_gain_s = 0.03;
    cfg.intent_boost_strength = 0.6;
    cfg.magnetism_radius = 60.0;
    cfg.magnetism_strength = 0.7;

    let targets = [
        TargetInfo::new("a", 50.0, 50.0, 10.0, 10.0),
        TargetInfo::new("b", 150.0, 80.0, 10.0, 10.0),
    ];

    c.bench_function("fixed_step_all_stages", |b| {
        let mut stepper = DeterministicStepper::new(Pipeline::canonical());
        let dt = stepper.fixed_dt();
        let mut x = 0.0f32;
        b.iter(|| {
            x += 1.5;
            let sample = InputSample::new(x, x * 0.5, 1.5, 0.75);
            let ctx = TransformContext {
                step_index: stepper.step_index(),
                dt,
                targets: &targets,
                config: Some(&cfg),
                profile: None,
            };
            black_box(stepper.fixed_step(sample, &ctx))
        });
    });
}

criterion_group!(benches, bench_fixed_step);
criterion_main!(benches);
