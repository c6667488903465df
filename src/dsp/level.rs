use crate::Amplitude;

/// Floor used when converting silence to decibels.
pub const SILENCE_DB: f32 = -200.0;

/// Linear gain to decibels: 1.0 → 0 dB, 0.5 → about -6.02 dB.
///
/// Zero and negative amplitudes map to [`SILENCE_DB`] rather than -inf.
#[inline]
pub fn amplitude_to_db(amplitude: Amplitude) -> f32 {
    if amplitude <= 0.0 {
        return SILENCE_DB;
    }
    (20.0 * amplitude.log10()).max(SILENCE_DB)
}

/// Decibels to linear gain: 0 dB → 1.0, -6.02 dB → about 0.5.
#[inline]
pub fn db_to_amplitude(db: f32) -> Amplitude {
    10.0_f32.powf(db / 20.0)
}
