use std::f32::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::range::Grouping;
use crate::dsp::note::midi_to_frequency;

/// Melodic shape of every pattern, in semitones above its root.
const PATTERN_INTERVALS: [f32; 5] = [0.0, 2.0, 4.0, 2.0, 0.0];

/// Pattern roots around middle C.
const FEMININE_ROOTS: [f32; 4] = [60.0, 62.0, 65.0, 67.0];

/// Pattern roots an octave lower.
const MASCULINE_ROOTS: [f32; 4] = [48.0, 50.0, 53.0, 55.0];

/// The high pattern sits a fourth above the next root.
const HIGH_PATTERN_OFFSET: f32 = 5.0;

/// Number of distinct pattern sets per profile.
pub const PATTERN_VARIANT_COUNT: usize = 4;

/// Gain envelope: attack/release time, floor and sustain level.
const RAMP_SECS: f32 = 0.02;
const GAIN_FLOOR: f32 = 0.001;
const GAIN_SUSTAIN: f32 = 0.5;

/// Register the reference patterns are pitched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ToneProfile {
    Feminine,
    Masculine,
}

impl ToneProfile {
    /// Default profile for a grouping. Groupings that do not imply a
    /// register fall back to the feminine set, which sits in the middle of
    /// the combined range.
    pub fn for_grouping(grouping: Grouping) -> Self {
        match grouping {
            Grouping::Man => ToneProfile::Masculine,
            Grouping::Woman | Grouping::Nonbinary | Grouping::PreferNotToSay => {
                ToneProfile::Feminine
            }
        }
    }

    fn roots(self) -> &'static [f32; 4] {
        match self {
            ToneProfile::Feminine => &FEMININE_ROOTS,
            ToneProfile::Masculine => &MASCULINE_ROOTS,
        }
    }

    /// (label, description) for the low and the high pattern.
    fn meta(self) -> [(&'static str, &'static str); 2] {
        match self {
            ToneProfile::Feminine => [
                ("Glow low", "Gentle chest \"ma\" around middle C."),
                ("Float high", "Soft head mix to show your upper shimmer."),
            ],
            ToneProfile::Masculine => [
                ("Ground low", "Relaxed chest \"ma\" that sits comfortably."),
                ("Reach high", "Ease into your upper chest / mix without strain."),
            ],
        }
    }
}

impl fmt::Display for ToneProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToneProfile::Feminine => f.write_str("feminine"),
            ToneProfile::Masculine => f.write_str("masculine"),
        }
    }
}

/// A short call-and-response pattern the singer echoes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub id: String,
    pub label: String,
    pub description: String,
    pub frequencies: Vec<f32>,
}

fn build_pattern(
    id: String,
    (label, description): (&str, &str),
    root_midi: f32,
) -> PatternDefinition {
    PatternDefinition {
        id,
        label: label.into(),
        description: description.into(),
        frequencies: PATTERN_INTERVALS
            .iter()
            .map(|&interval| midi_to_frequency(root_midi + interval))
            .collect(),
    }
}

/// The low and high patterns for a profile and variant.
///
/// Variants cycle through four roots. The low pattern starts on the
/// variant's root; the high pattern starts a fourth above the following root.
pub fn pattern_set(profile: ToneProfile, variant: usize) -> [PatternDefinition; 2] {
    let roots = profile.roots();
    let root_index = variant % roots.len();
    let low_root = roots[root_index];
    let high_root = roots[(root_index + 1) % roots.len()] + HIGH_PATTERN_OFFSET;
    let [low_meta, high_meta] = profile.meta();

    [
        build_pattern(format!("{profile}-{variant}-low"), low_meta, low_root),
        build_pattern(format!("{profile}-{variant}-high"), high_meta, high_root),
    ]
}

/// Render a sine tone with a short exponential attack and release.
///
/// Gain rises from 0.001 to 0.5 over 20 ms, holds, and falls back to 0.001
/// over the last 20 ms, which avoids clicks at either end.
pub fn synthesize_tone(frequency: f32, duration_ms: u32, sample_rate: u32) -> Vec<f32> {
    let sr = sample_rate as f32;
    let num_samples = (duration_ms as f32 / 1000.0 * sr) as usize;
    let duration = num_samples as f32 / sr;
    let ramp = RAMP_SECS.min(duration / 2.0);

    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sr;
            let gain = if t < ramp {
                exponential_ramp(GAIN_FLOOR, GAIN_SUSTAIN, t / ramp)
            } else if t > duration - ramp {
                exponential_ramp(GAIN_SUSTAIN, GAIN_FLOOR, (t - (duration - ramp)) / ramp)
            } else {
                GAIN_SUSTAIN
            };
            gain * (2.0 * PI * frequency * t).sin()
        })
        .collect()
}

/// Render a whole pattern: one tone per note, separated by `gap_ms` of silence.
pub fn synthesize_pattern(
    pattern: &PatternDefinition,
    note_ms: u32,
    gap_ms: u32,
    sample_rate: u32,
) -> Vec<f32> {
    let gap = vec![0.0; (gap_ms as f32 / 1000.0 * sample_rate as f32) as usize];
    let mut samples = Vec::new();

    for (i, &frequency) in pattern.frequencies.iter().enumerate() {
        if i > 0 {
            samples.extend_from_slice(&gap);
        }
        samples.extend(synthesize_tone(frequency, note_ms, sample_rate));
    }

    samples
}

/// Exponential interpolation from `from` to `to` at `progress` in [0, 1].
fn exponential_ramp(from: f32, to: f32, progress: f32) -> f32 {
    from * (to / from).powf(progress.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::pitch;

    #[test]
    fn feminine_variant_zero() {
        let [low, high] = pattern_set(ToneProfile::Feminine, 0);
        assert_eq!(low.id, "feminine-0-low");
        assert_eq!(high.id, "feminine-0-high");
        assert_eq!(low.label, "Glow low");

        // Low pattern on C4, high pattern on D4 + a fourth = G4
        let expected_low: Vec<f32> = [60.0, 62.0, 64.0, 62.0, 60.0]
            .iter()
            .map(|&m| midi_to_frequency(m))
            .collect();
        assert_eq!(low.frequencies, expected_low);
        assert!((high.frequencies[0] - midi_to_frequency(67.0)).abs() < 1e-3);
    }

    #[test]
    fn variants_wrap_around() {
        let [low, high] = pattern_set(ToneProfile::Masculine, 3);
        // Root 55, next root wraps to 48 + 5
        assert!((low.frequencies[0] - midi_to_frequency(55.0)).abs() < 1e-3);
        assert!((high.frequencies[0] - midi_to_frequency(53.0)).abs() < 1e-3);

        let [again, _] = pattern_set(ToneProfile::Masculine, 3 + PATTERN_VARIANT_COUNT);
        assert_eq!(again.frequencies, low.frequencies);
    }

    #[test]
    fn patterns_rise_then_return() {
        let [low, _] = pattern_set(ToneProfile::Feminine, 2);
        assert_eq!(low.frequencies.len(), 5);
        assert_eq!(low.frequencies.first(), low.frequencies.last());
        assert!(low.frequencies[2] > low.frequencies[1]);
    }

    #[test]
    fn profile_follows_grouping() {
        assert_eq!(ToneProfile::for_grouping(Grouping::Man), ToneProfile::Masculine);
        assert_eq!(ToneProfile::for_grouping(Grouping::Woman), ToneProfile::Feminine);
    }

    #[test]
    fn tone_has_requested_length_and_gain() {
        let tone = synthesize_tone(440.0, 1500, 44100);
        assert_eq!(tone.len(), 66150);

        let peak = tone.iter().fold(0.0_f32, |m, &s| m.max(s.abs()));
        assert!(peak <= GAIN_SUSTAIN + 1e-6);
        assert!(peak > 0.45);

        // Edges start and end near the gain floor
        assert!(tone[0].abs() < 0.01);
        assert!(tone[tone.len() - 1].abs() < 0.01);
    }

    #[test]
    fn tone_is_detected_at_its_pitch() {
        let tone = synthesize_tone(261.63, 500, 44100);
        let middle = &tone[4096..8192];
        let f = pitch::detect_pitch(middle, 44100).unwrap();
        assert!((f - 261.63).abs() / 261.63 < 0.03, "got {f:.1} Hz");
    }

    #[test]
    fn pattern_includes_gaps() {
        let [low, _] = pattern_set(ToneProfile::Feminine, 0);
        let samples = synthesize_pattern(&low, 100, 50, 1000);
        // 5 tones of 100 samples + 4 gaps of 50
        assert_eq!(samples.len(), 5 * 100 + 4 * 50);
    }

    #[test]
    fn zero_length_tone_is_empty() {
        assert!(synthesize_tone(440.0, 0, 44100).is_empty());
    }
}
