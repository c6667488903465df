//! Benchmarks for low-level signal primitives.

mod envelope;
mod operators;
mod oscillator;
mod wavetable;

pub use envelope::bench_envelope;
pub use operators::bench_operators;
pub use oscillator::bench_oscillator;
pub use wavetable::bench_wavetable;
