//! Benchmarks for the full pull path: engine → synth → interleaved stereo.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lilt_dsp::{
    dsp::envelope::Envelope,
    synth::{NoteEvent, PolySynth, SynthConfig},
    Engine, EngineConfig, SignalExt, WaveTables,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");
    let tables = WaveTables::new();

    for &size in BLOCK_SIZES {
        let (mut engine, mut engine_handle) =
            Engine::new(EngineConfig::default().with_sample_rate(SAMPLE_RATE))
                .expect("valid config");
        let (synth, mut synth_handle) = PolySynth::new(
            SynthConfig::default(),
            tables.sine.clone(),
            Envelope::adsr(0.01, 0.1, 0.7, 0.3).expect("valid envelope"),
        )
        .expect("valid config");
        engine_handle
            .set_output(synth.scale(0.2))
            .expect("queue has room");
        synth_handle
            .play_all((0..8).map(|i| NoteEvent::new(220.0 + 55.0 * i as f32, 1.0e6)))
            .expect("queue has room");

        // stereo: two slots per frame
        let mut buffer = vec![0.0f32; size * 2];
        group.bench_with_input(BenchmarkId::new("stereo_8_voices", size), &size, |b, _| {
            b.iter(|| engine.render_interleaved(black_box(&mut buffer)))
        });
    }

    group.finish();
}
