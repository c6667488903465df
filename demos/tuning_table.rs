//! Print the interval tables of a few tunings side by side.
//!
//! Run with: cargo run --example tuning_table

use lilt_dsp::tuning::{IntervalClass, Tuning};

fn cents(ratio: f64) -> f64 {
    1200.0 * ratio.log2()
}

fn main() -> lilt_dsp::Result<()> {
    let tempered = Tuning::equal_temperament(12, 440.0)?;
    let just = Tuning::prime_limited(5, 40, 440.0)?;

    println!("12-TET");
    for (step, interval) in tempered.intervals().iter().enumerate() {
        let name = IntervalClass::from_semitones(step as u32);
        let nearest_just = just.closest_note_in_tune(interval.log2());
        println!(
            "  {step:2}  {:>16}  {:8.2} cents  nearest 5-limit {:+6.2} cents",
            format!("{name:?}"),
            cents(*interval),
            1200.0 * nearest_just - cents(*interval),
        );
    }

    println!();
    println!("5-limit just intonation, numbers up to 40 ({} steps)", just.ratios().len());
    for (ratio, interval) in just.ratios().iter().zip(just.intervals()) {
        println!(
            "  {:>6}  {:8.2} cents  {:8.2} Hz",
            ratio.to_string(),
            cents(*interval),
            just.note_to_frequency(interval.log2()),
        );
    }
    Ok(())
}
