//! Benchmarks for signal arithmetic: static combinators vs boxed operators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lilt_dsp::{dsp::oscillator, engine::FrameClock, signal::mix, BoxedSignal, SignalExt, WaveTables};

use crate::{render, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_operators(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/operators");
    let tables = WaveTables::new();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Monomorphized: ring modulation plus offset
        let mut clock = FrameClock::new(SAMPLE_RATE);
        let mut ring = oscillator::sine(&tables, 440.0)
            .amplify(oscillator::sine(&tables, 30.0))
            .scale(0.5)
            .offset(0.1);
        group.bench_with_input(BenchmarkId::new("static_chain", size), &size, |b, _| {
            b.iter(|| render(&mut ring, &mut clock, black_box(&mut buffer)))
        });

        // Same graph through dynamic dispatch
        let mut clock = FrameClock::new(SAMPLE_RATE);
        let mut boxed = BoxedSignal::new(oscillator::sine(&tables, 440.0))
            * BoxedSignal::new(oscillator::sine(&tables, 30.0))
            * 0.5
            + 0.1;
        group.bench_with_input(BenchmarkId::new("boxed_chain", size), &size, |b, _| {
            b.iter(|| render(&mut boxed, &mut clock, black_box(&mut buffer)))
        });

        // Eight detuned saws summed
        let mut clock = FrameClock::new(SAMPLE_RATE);
        let mut stack = mix((0..8).map(|i| oscillator::saw(&tables, 110.0 + i as f32 * 0.7)));
        group.bench_with_input(BenchmarkId::new("mix_8", size), &size, |b, _| {
            b.iter(|| render(&mut stack, &mut clock, black_box(&mut buffer)))
        });
    }

    group.finish();
}
