//! Benchmarks for phase-accumulating oscillators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lilt_dsp::{
    dsp::oscillator::{self, Oscillator},
    engine::FrameClock,
    signal::Param,
    BoxedSignal, WaveTables,
};

use crate::{render, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let tables = WaveTables::new();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut clock = FrameClock::new(SAMPLE_RATE);
        let mut osc = oscillator::sine(&tables, 440.0);
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| render(&mut osc, &mut clock, black_box(&mut buffer)))
        });

        let mut clock = FrameClock::new(SAMPLE_RATE);
        let mut osc = oscillator::saw(&tables, 440.0);
        group.bench_with_input(BenchmarkId::new("saw", size), &size, |b, _| {
            b.iter(|| render(&mut osc, &mut clock, black_box(&mut buffer)))
        });

        let mut clock = FrameClock::new(SAMPLE_RATE);
        let mut osc = oscillator::square(&tables, 440.0);
        group.bench_with_input(BenchmarkId::new("square", size), &size, |b, _| {
            b.iter(|| render(&mut osc, &mut clock, black_box(&mut buffer)))
        });

        // Vibrato: the frequency input is itself an oscillator
        let mut clock = FrameClock::new(SAMPLE_RATE);
        let lfo = BoxedSignal::new(oscillator::sine(&tables, 5.0));
        let mut osc = Oscillator::new(tables.sine.clone(), Param::from(lfo * 6.0 + 440.0));
        group.bench_with_input(BenchmarkId::new("sine_vibrato", size), &size, |b, _| {
            b.iter(|| render(&mut osc, &mut clock, black_box(&mut buffer)))
        });
    }

    group.finish();
}
