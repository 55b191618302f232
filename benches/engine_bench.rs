//! Benchmarks for note triggering and automation-timeline evaluation.
//!
//! Run with: cargo bench
//!
//! A trigger happens on the UI thread in response to a key press, so it must
//! stay comfortably below perceptible latency; timeline evaluation is the
//! hot path of the offline backend.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use monovox::backend::offline::OfflineBackend;
use monovox::{AudioBackend, Param, SynthEngine};

fn bench_play_tone(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/play_tone");

    let mut engine = SynthEngine::new(OfflineBackend::new()).unwrap();
    group.bench_function("single_trigger", |b| {
        b.iter(|| {
            engine.play_tone(black_box(440.0));
        })
    });

    // Retriggering over an in-flight envelope exercises cancellation.
    let mut engine = SynthEngine::new(OfflineBackend::new()).unwrap();
    engine.play_tone(440.0);
    group.bench_function("retrigger", |b| {
        b.iter(|| {
            engine.backend_mut().advance(0.01);
            engine.play_tone(black_box(220.0));
        })
    });

    group.finish();
}

fn bench_timeline_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("backend/value_at");

    for &triggers in &[1usize, 8, 64] {
        let mut engine = SynthEngine::new(OfflineBackend::new()).unwrap();
        for i in 0..triggers {
            engine.backend_mut().advance(0.05);
            engine.play_tone(220.0 + i as f32);
        }
        let volume = engine.volume_node();
        let now = engine.backend().current_time();

        group.bench_with_input(
            BenchmarkId::new("triggers", triggers),
            &triggers,
            |b, _| {
                b.iter(|| {
                    engine
                        .backend()
                        .value_at(volume, Param::Gain, black_box(now + 0.02))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_play_tone, bench_timeline_eval);
criterion_main!(benches);
