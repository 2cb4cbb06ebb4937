// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Criterion benchmarks of the process step and of a full scheduler tick

use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};

use rust_icsim::plant::{
    PointStore, ProcessImage, ProcessModel, RandomSource, Scheduler, StepObserver, StepOutcome,
};

struct NullObserver;

impl StepObserver for NullObserver {
    fn on_step(&mut self, _tick: u64, _outcome: &StepOutcome) {}
}

fn bench_step_running(c: &mut Criterion) {
    let mut model = ProcessModel::new(RandomSource::seeded(7));
    let image = ProcessImage {
        motor_running: true,
        valve_open: true,
        auto_mode: true,
        tank_level: 30000,
        ..ProcessImage::default()
    };
    c.bench_function("step_running", |b| b.iter(|| model.step(black_box(&image))));
}

fn bench_step_idle(c: &mut Criterion) {
    let mut model = ProcessModel::new(RandomSource::seeded(7));
    let image = ProcessImage {
        tank_level: 30000,
        tank_drain: 3,
        ..ProcessImage::default()
    };
    c.bench_function("step_idle", |b| b.iter(|| model.step(black_box(&image))));
}

fn bench_scheduler_tick(c: &mut Criterion) {
    let store = Arc::new(PointStore::default());
    let mut scheduler = Scheduler::new(
        store,
        ProcessModel::new(RandomSource::seeded(7)),
        Duration::from_millis(100),
    )
    .expect("non-zero period")
    .with_observer(NullObserver);
    c.bench_function("scheduler_tick", |b| b.iter(|| black_box(scheduler.tick())));
}

criterion_group!(
    benches,
    bench_step_running,
    bench_step_idle,
    bench_scheduler_tick
);
criterion_main!(benches);
