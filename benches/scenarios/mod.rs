//! Scenario benchmarks: many voices through the synth and the engine.

mod engine;
mod voices;

pub use engine::bench_engine;
pub use voices::bench_voices;
