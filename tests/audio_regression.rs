use lilt_dsp::{
    dsp::{
        envelope::{Envelope, EnvelopeGenerator},
        oscillator, SharedEnvelope,
    },
    engine::Scheduler,
    io::AudioOutput,
    synth::{NoteEvent, PolySynth, SynthConfig, SynthNotification},
    Engine, EngineConfig, SignalExt, WaveTables,
};

const SAMPLE_RATE: u32 = 8_000;

fn engine() -> (Engine, lilt_dsp::EngineHandle) {
    Engine::new(EngineConfig::default().with_sample_rate(SAMPLE_RATE)).expect("valid config")
}

fn render(engine: &mut Engine, seconds: f32) -> Vec<f32> {
    let frames = (seconds * SAMPLE_RATE as f32) as usize;
    let mut output = AudioOutput::new(1, frames);
    engine.process_block(&mut output, frames);
    output.buffers.remove(0)
}

#[test]
fn renders_silence_with_no_output() {
    let (mut engine, _handle) = engine();
    let mut output = AudioOutput::new(2, 256);
    engine.process_block(&mut output, 256);
    assert!(output.buffers.iter().flatten().all(|&s| s == 0.0));
}

#[test]
fn synth_note_sounds_then_decays_to_silence() {
    let tables = WaveTables::new();
    let (mut engine, mut engine_handle) = engine();
    let (synth, mut synth_handle) = PolySynth::new(
        SynthConfig::default(),
        tables.sine.clone(),
        Envelope::adsr(0.01, 0.05, 0.5, 0.1).expect("valid envelope"),
    )
    .expect("valid config");
    engine_handle.set_output(synth).expect("queued");

    let id = synth_handle
        .play(NoteEvent::new(440.0, 0.25))
        .expect("queued");

    // hold + release = 0.35s
    let sounding = render(&mut engine, 0.3);
    assert!(sounding.iter().any(|s| s.abs() > 0.3));
    assert!(sounding.iter().all(|s| s.abs() <= 1.0));

    let tail = render(&mut engine, 0.2);
    assert!(tail[tail.len() / 2..].iter().all(|&s| s == 0.0));

    let notifications = synth_handle.poll();
    assert!(matches!(
        notifications.first(),
        Some(SynthNotification::Started { id: started, .. }) if *started == id
    ));
    let finished_at = notifications.iter().find_map(|n| match n {
        SynthNotification::Finished { at, .. } => Some(*at),
        _ => None,
    });
    let finished_at = finished_at.expect("note finished");
    assert!((0.34..0.36).contains(&finished_at), "finished at {finished_at}");
    assert!(synth_handle.live_voices().is_empty());
}

#[test]
fn envelope_gate_is_driven_from_the_control_side() {
    let tables = WaveTables::new();
    let (mut engine, mut engine_handle) = engine();
    let (envelope, mut gate) =
        SharedEnvelope::new(EnvelopeGenerator::new(Envelope::ar(0.0, 0.05).expect("valid")));
    let voice = oscillator::square(&tables, 100.0).amplify(envelope);
    engine_handle.set_output(voice).expect("queued");

    assert!(render(&mut engine, 0.1).iter().all(|&s| s == 0.0));

    gate.activate().expect("queued");
    let open = render(&mut engine, 0.1);
    assert!(open.iter().skip(1).all(|s| s.abs() == 1.0));

    gate.deactivate().expect("queued");
    let released = render(&mut engine, 0.1);
    assert!(released[..10].iter().any(|&s| s != 0.0));
    assert!(released[released.len() - 10..].iter().all(|&s| s == 0.0));
}

#[test]
fn scheduled_notes_start_at_their_time() {
    let tables = WaveTables::new();
    let (mut engine, mut engine_handle) = engine();
    let (synth, mut synth_handle) = PolySynth::new(
        SynthConfig::default(),
        tables.saw.clone(),
        Envelope::ar(0.0, 0.0).expect("valid"),
    )
    .expect("valid config");
    engine_handle.set_output(synth).expect("queued");

    let mut scheduler = Scheduler::new();
    scheduler.enqueue(0.1, NoteEvent::new(200.0, 0.05));
    scheduler.enqueue(0.2, NoteEvent::new(300.0, 0.05));

    let mut started = Vec::new();
    // control loop ticking every 10ms of audio
    for _ in 0..30 {
        render(&mut engine, 0.01);
        scheduler
            .dispatch_due(engine_handle.now(), &mut synth_handle)
            .expect("dispatch");
        for notification in synth_handle.poll() {
            if let SynthNotification::Started { lifetime, .. } = notification {
                started.push(lifetime.triggered_at);
            }
        }
    }

    assert!(scheduler.is_empty());
    assert_eq!(started.len(), 2);
    // dispatched on the first tick after the due time, so at most one tick late
    assert!((0.1..0.12).contains(&started[0]), "{started:?}");
    assert!((0.2..0.22).contains(&started[1]), "{started:?}");
}
