//! Render a chord progression offline and print the envelope of the mix.
//!
//! Run with: cargo run --example simple_poly

use lilt_dsp::{
    dsp::{envelope::Envelope, level::amplitude_to_db},
    engine::Scheduler,
    io::AudioOutput,
    synth::{NoteEvent, PolySynth, SynthConfig, SynthNotification},
    tuning::{Chord, Tuning},
    Engine, EngineConfig, SignalExt, WaveTables,
};

const SAMPLE_RATE: u32 = 22_050;
/// Frames rendered between control ticks
const BLOCK: usize = 441;

fn main() -> lilt_dsp::Result<()> {
    let tables = WaveTables::standard();
    let tuning = Tuning::default();

    let (mut engine, mut engine_handle) =
        Engine::new(EngineConfig::default().with_sample_rate(SAMPLE_RATE).with_channels(1))?;
    let (poly, mut synth) = PolySynth::new(
        SynthConfig::default().with_max_voices(8),
        tables.triangle.clone(),
        Envelope::adsr(0.02, 0.2, 0.5, 0.3)?,
    )?;
    engine_handle.set_output(poly.scale(0.25))?;

    // I - vi - IV - V around A3
    let mut scheduler = Scheduler::new();
    for (bar, (root, chord)) in [
        (-1.0, Chord::Major),
        (-2.0 + 9.0 / 12.0, Chord::Minor),
        (-1.0 + 5.0 / 12.0, Chord::Major),
        (-1.0 + 7.0 / 12.0, Chord::Major),
    ]
    .into_iter()
    .enumerate()
    {
        for pitch in chord.pitches(root) {
            let frequency = tuning.note_to_frequency(pitch) as f32;
            scheduler.enqueue(bar as f32 * 0.5, NoteEvent::new(frequency, 0.4));
        }
    }

    let mut output = AudioOutput::new(1, BLOCK);
    let mut block = 0;
    while !scheduler.is_empty() || synth.pending_count() > 0 {
        scheduler.dispatch_due(engine_handle.now(), &mut synth)?;
        engine.process_block(&mut output, BLOCK);

        let peak = output.buffers[0].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let bar = "#".repeat(((amplitude_to_db(peak) + 60.0).max(0.0) / 2.0) as usize);
        println!("{:6.2}s {:>7.1} dB {bar}", engine_handle.now(), amplitude_to_db(peak));

        for notification in synth.poll() {
            if let SynthNotification::Started { id, slot, lifetime } = notification {
                println!(
                    "        note {id} on voice {slot}, ends at {:.2}s",
                    lifetime.ends_at
                );
            }
        }
        block += 1;
    }

    println!("rendered {} frames", block * BLOCK);
    Ok(())
}
