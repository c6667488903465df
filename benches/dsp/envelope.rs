//! Benchmarks for the envelope state machine, one segment at a time.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lilt_dsp::{
    dsp::envelope::{Envelope, EnvelopeGenerator},
    engine::FrameClock,
    Signal,
};

use crate::{render, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let envelope = Envelope::adsr(0.5, 0.5, 0.7, 0.5).expect("valid envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Every iteration restarts at the trigger, so the block stays in attack
        let mut env = EnvelopeGenerator::new(envelope.clone());
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.reset();
                env.activate();
                render(&mut env, &mut FrameClock::new(SAMPLE_RATE), black_box(&mut buffer));
            })
        });

        // Sustain: 2 seconds in and the gate still high
        let mut env = EnvelopeGenerator::new(envelope.clone());
        env.activate();
        env.sample(0.0);
        let mut clock = FrameClock::new(SAMPLE_RATE);
        for _ in 0..2 * SAMPLE_RATE {
            clock.tick();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| render(&mut env, &mut clock, black_box(&mut buffer)))
        });

        // Release: gate drops at t = 0.1; every block renders from the
        // release instant again
        let mut env = EnvelopeGenerator::new(envelope.clone());
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.reset();
                env.activate();
                env.sample(0.0);
                env.sample(0.1);
                env.deactivate();
                let mut clock = FrameClock::new(SAMPLE_RATE);
                for slot in buffer.iter_mut() {
                    *slot = env.sample(0.1 + clock.tick());
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
