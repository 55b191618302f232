//! Equal-temperament pitch math for the virtual keyboard layer.
//!
//! Twelve-tone equal temperament anchored at A4 = 440 Hz: each semitone
//! multiplies frequency by 2^(1/12), each octave doubles it. The engine
//! itself only ever sees a frequency in Hz; these helpers are how a keyboard
//! turns key positions into that frequency.

/// Concert pitch reference.
pub const A4_HZ: f32 = 440.0;

/// MIDI note number of A4.
pub const A4_MIDI: u8 = 69;

pub const SEMITONES_PER_OCTAVE: i32 = 12;

/// Frequency of a MIDI note number in twelve-tone equal temperament.
#[inline]
pub fn note_to_freq(note: u8) -> f32 {
    A4_HZ * 2.0_f32.powf((note as f32 - A4_MIDI as f32) / SEMITONES_PER_OCTAVE as f32)
}

/// Shift a frequency by a signed number of semitones.
#[inline]
pub fn transpose(frequency: f32, semitones: i32) -> f32 {
    frequency * 2.0_f32.powf(semitones as f32 / SEMITONES_PER_OCTAVE as f32)
}

/// Shift a frequency by whole octaves. Exact doubling/halving.
#[inline]
pub fn octave_shift(frequency: f32, octaves: i32) -> f32 {
    frequency * 2.0_f32.powi(octaves)
}
