//! Benchmarks for the polyphonic synth at different voice loads.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lilt_dsp::{
    dsp::envelope::Envelope,
    engine::FrameClock,
    synth::{NoteEvent, PolySynth, SynthConfig, Voice, MAX_VOICES},
    Signal, WaveTables,
};

use crate::{render, BLOCK_SIZES, SAMPLE_RATE};

/// Long enough that no voice releases while being measured
const HOLD: f32 = 1.0e6;

fn loaded_synth(tables: &WaveTables, voices: usize) -> PolySynth {
    let envelope = Envelope::adsr(0.01, 0.1, 0.7, 0.3).expect("valid envelope");
    let (mut synth, mut handle) = PolySynth::new(
        SynthConfig::default().with_max_voices(MAX_VOICES),
        tables.saw.clone(),
        envelope,
    )
    .expect("valid config");

    handle
        .play_all((0..voices).map(|i| NoteEvent::new(110.0 * (1.0 + i as f32 / 8.0), HOLD)))
        .expect("queue has room");
    // start every note
    synth.sample(0.0);
    synth
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let tables = WaveTables::new();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // One bare voice, no synth bookkeeping
        let mut voice = Voice::new(
            tables.saw.clone(),
            Envelope::adsr(0.01, 0.1, 0.7, 0.3).expect("valid envelope"),
        );
        voice.play(NoteEvent::new(110.0, HOLD), 0.0);
        let mut clock = FrameClock::new(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("single_voice", size), &size, |b, _| {
            b.iter(|| render(&mut voice, &mut clock, black_box(&mut buffer)))
        });

        for voices in [1, 8, 32, 64] {
            let mut synth = loaded_synth(&tables, voices);
            let mut clock = FrameClock::new(SAMPLE_RATE);
            clock.tick();
            group.bench_with_input(
                BenchmarkId::new(format!("poly_{voices}"), size),
                &size,
                |b, _| b.iter(|| render(&mut synth, &mut clock, black_box(&mut buffer))),
            );
        }
    }

    group.finish();
}
