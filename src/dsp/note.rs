/// Reference pitch: A4 = MIDI 69 = 440 Hz.
const A4_MIDI: f32 = 69.0;
const A4_HZ: f32 = 440.0;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Convert a frequency in Hz to a (fractional) MIDI note number.
///
/// Semitones are logarithmic: every doubling of frequency adds 12.
/// No validation is done here. A zero or negative frequency produces a
/// non-finite value, and callers filter those out before aggregating.
pub fn frequency_to_midi(frequency: f32) -> f32 {
    A4_MIDI + 12.0 * (frequency / A4_HZ).log2()
}

/// Convert a MIDI note number (fractional allowed) back to Hz.
pub fn midi_to_frequency(midi: f32) -> f32 {
    A4_HZ * 2.0_f32.powf((midi - A4_MIDI) / 12.0)
}

/// Name of the nearest equal-tempered note, e.g. 60.2 → "C4".
/// Returns None for non-finite input.
pub fn note_name(midi: f32) -> Option<String> {
    if !midi.is_finite() {
        return None;
    }

    let nearest = midi.round() as i32;
    let index = nearest.rem_euclid(12) as usize;
    // MIDI 60 is C4, so octave boundaries fall on multiples of 12.
    let octave = nearest.div_euclid(12) - 1;

    Some(format!("{}{}", NOTE_NAMES[index], octave))
}
