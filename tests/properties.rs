use lilt_dsp::{
    dsp::oscillator::Oscillator,
    signal::{from_fn, Constant, Quotient},
    tuning::{primes::prime_factors, prime_limited_ratios, Tuning},
    wave::{self, shared, LinearWavetable, Wavetable},
    BoxedSignal, Signal, Wave,
};
use proptest::prelude::*;

fn linear(a: f32, b: f32) -> BoxedSignal {
    BoxedSignal::new(from_fn(move |t| a * t + b))
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

proptest! {
    #[test]
    fn arithmetic_is_pointwise(
        a in -10.0f32..10.0, b in -10.0f32..10.0,
        c in -10.0f32..10.0, d in -10.0f32..10.0,
        t in 0.0f32..100.0,
    ) {
        let expected_a = a * t + b;
        let expected_b = c * t + d;

        let mut sum = linear(a, b) + linear(c, d);
        let mut difference = linear(a, b) - linear(c, d);
        let mut product = linear(a, b) * linear(c, d);

        prop_assert_eq!(sum.sample(t), expected_a + expected_b);
        prop_assert_eq!(difference.sample(t), expected_a - expected_b);
        prop_assert_eq!(product.sample(t), expected_a * expected_b);
    }

    #[test]
    fn division_by_zero_is_zero(numerator in -1.0e6f32..1.0e6, t in 0.0f32..100.0) {
        let mut quotient = Quotient::new(Constant(numerator), Constant(0.0));
        prop_assert_eq!(quotient.sample(t), 0.0);

        let mut boxed = BoxedSignal::constant(numerator) / 0.0;
        prop_assert_eq!(boxed.sample(t), 0.0);
    }

    #[test]
    fn oscillator_phase_advances_by_frequency_times_dt(
        frequency in 0.0f32..50.0,
        steps in proptest::collection::vec(0.0f32..0.01, 1..64),
    ) {
        // ramp_up reports the phase itself
        let mut osc = Oscillator::new(shared(wave::ramp_up), Constant(frequency));
        let mut time = 0.0f32;
        let mut previous = osc.sample(time);

        for dt in steps {
            let next_time = time + dt;
            let phase = osc.sample(next_time);
            prop_assert!((0.0..1.0).contains(&phase));

            let advanced = (phase - previous).rem_euclid(1.0);
            let expected = frequency * (next_time - time);
            let error = (advanced - expected).abs().min(1.0 - (advanced - expected).abs());
            prop_assert!(error < 1e-3, "advanced {} expected {}", advanced, expected);

            // going back in time never moves the phase
            prop_assert_eq!(osc.sample(time), phase);
            time = next_time;
            previous = phase;
        }
    }

    #[test]
    fn square_table_is_two_valued(phase in 0.0f32..1.0) {
        let square = Wavetable::new(vec![1.0f32, -1.0]);
        let expected = if phase < 0.5 { 1.0 } else { -1.0 };
        prop_assert_eq!(square.at(phase), expected);
    }

    #[test]
    fn linear_table_stays_between_neighbours(phase in 0.0f32..1.0) {
        let triangle = LinearWavetable::new(vec![0.0f32, 1.0, 0.0, -1.0, 0.0]);
        let value = triangle.at(phase);
        prop_assert!((-1.0..=1.0).contains(&value));
        // the triangle is |slope| 4 everywhere
        let expected = 1.0 - (4.0 * phase - 1.0).abs();
        let expected = if phase < 0.5 { expected } else { -(1.0 - (4.0 * phase - 3.0).abs()) };
        prop_assert!((value - expected).abs() < 1e-4, "{} vs {}", value, expected);
    }

    #[test]
    fn equal_temperament_doubles_per_octave(pitch in -4.0f64..4.0) {
        let tuning = Tuning::default();
        let low = tuning.note_to_frequency(pitch);
        let high = tuning.note_to_frequency(pitch + 1.0);
        prop_assert!((high / low - 2.0).abs() < 1e-9);
    }

    #[test]
    fn snapped_pitches_are_fixed_points(pitch in -4.0f64..4.0, limit in 2u64..8, max in 2u64..48) {
        let tuning = Tuning::prime_limited(limit, max, 440.0).expect("valid");
        let snapped = tuning.closest_note_in_tune(pitch);
        let again = tuning.closest_note_in_tune(snapped);
        prop_assert!((again - snapped).abs() < 1e-9);
    }

    #[test]
    fn prime_limited_ratios_are_reduced_and_smooth(limit in 2u64..12, max in 2u64..64) {
        for ratio in prime_limited_ratios(limit, max) {
            let (n, d) = (ratio.numerator(), ratio.denominator());
            prop_assert_eq!(gcd(n, d), 1);
            prop_assert!(d < n && n < 2 * d);
            for (p, _) in prime_factors(n as u64).into_iter().chain(prime_factors(d as u64)) {
                prop_assert!(p <= limit);
            }
        }
    }
}
