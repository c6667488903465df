//! Benchmarks for wave lookups (no oscillator state).

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lilt_dsp::{wave, Wave, WaveTables};

use crate::BLOCK_SIZES;

pub fn bench_wavetable(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/wavetable");
    let tables = WaveTables::new();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let step = 1.0 / size as f32;

        // Nearest lookup into the 44.1k-entry sine table
        group.bench_with_input(BenchmarkId::new("sine_table", size), &size, |b, _| {
            b.iter(|| {
                for (i, out) in buffer.iter_mut().enumerate() {
                    *out = tables.sine.at(black_box(i as f32 * step));
                }
            })
        });

        // Analytic sin() for comparison
        group.bench_with_input(BenchmarkId::new("sine_analytic", size), &size, |b, _| {
            b.iter(|| {
                for (i, out) in buffer.iter_mut().enumerate() {
                    *out = wave::sine(black_box(i as f32 * step));
                }
            })
        });

        // Linear interpolation between 5 points
        group.bench_with_input(BenchmarkId::new("triangle_linear", size), &size, |b, _| {
            b.iter(|| {
                for (i, out) in buffer.iter_mut().enumerate() {
                    *out = tables.triangle.at(black_box(i as f32 * step));
                }
            })
        });
    }

    group.finish();
}
