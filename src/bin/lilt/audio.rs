//! Device setup: everything the cpal callback owns is built here.

use std::sync::Arc;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat,
};
use rtrb::Consumer;
use tracing::{error, info};

use lilt_dsp::{
    dsp::envelope::Envelope,
    signal::{Constant, Product, Tap, TapReading},
    synth::{PolySynth, SynthConfig, SynthHandle},
    wave::WaveShape,
    Engine, EngineConfig, EngineHandle, SignalExt, WaveTables,
};

/// Scope readings buffered between UI frames
const TAP_CAPACITY: usize = 16_384;
/// Headroom for a handful of overlapping voices
const MASTER_GAIN: f32 = 0.2;

/// Control-side ends of a running stream. Dropping `stream` stops audio.
pub struct Audio {
    pub stream: cpal::Stream,
    pub engine: EngineHandle,
    pub synth: SynthHandle,
    pub taps: Consumer<TapReading>,
    pub shape: WaveShape,
    tables: Arc<WaveTables>,
}

impl Audio {
    /// Swap in a fresh synth playing `shape`. Notes still sounding on the
    /// old synth are cut off.
    pub fn set_wave(&mut self, shape: WaveShape) -> EyreResult<()> {
        let (output, synth, taps) = build_synth(&self.tables, shape)?;
        self.engine
            .set_output(output)
            .wrap_err("failed to replace synth output")?;
        self.synth = synth;
        self.taps = taps;
        self.shape = shape;
        info!(shape = shape.name(), "wave switched");
        Ok(())
    }
}

type SynthOutput = Tap<Product<PolySynth, Constant>>;

fn build_synth(
    tables: &WaveTables,
    shape: WaveShape,
) -> EyreResult<(SynthOutput, SynthHandle, Consumer<TapReading>)> {
    let envelope = Envelope::adsr(0.01, 0.15, 0.6, 0.4).wrap_err("invalid envelope")?;
    let (synth, synth_handle) = PolySynth::new(SynthConfig::default(), tables.get(shape), envelope)
        .wrap_err("invalid synth configuration")?;
    let (tap, taps) = Tap::new(synth.scale(MASTER_GAIN), 1, TAP_CAPACITY);
    Ok((tap, synth_handle, taps))
}

pub fn start() -> EyreResult<Audio> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let supported = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;
    if supported.sample_format() != SampleFormat::F32 {
        return Err(eyre!(
            "default output format is {:?}, only f32 is supported",
            supported.sample_format()
        ));
    }

    let config = EngineConfig::default()
        .with_sample_rate(supported.sample_rate().0)
        .with_channels(supported.channels());
    let (mut engine, mut engine_handle) =
        Engine::new(config).wrap_err("invalid engine configuration")?;

    let tables = WaveTables::standard();
    let shape = WaveShape::default();
    let (tap, synth_handle, taps) = build_synth(&tables, shape)?;
    engine_handle
        .set_output(tap)
        .wrap_err("failed to install synth output")?;

    info!(
        sample_rate = config.sample_rate,
        channels = config.channels,
        "opening output stream"
    );

    let stream = device
        .build_output_stream(
            &supported.into(),
            move |data: &mut [f32], _| engine.render_interleaved(data),
            |err| error!("audio stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;
    stream.play().wrap_err("failed to start output stream")?;

    Ok(Audio {
        stream,
        engine: engine_handle,
        synth: synth_handle,
        taps,
        shape,
        tables,
    })
}
